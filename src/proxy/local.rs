//! In-process proxy roster used when no proxy bridge is configured, and by tests.

use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use futures::future::{BoxFuture, ready};
use tracing::debug;

use crate::{
    proxy::{PlayerHandle, ProxyHost, ProxyResult, ServerHandle},
    state::party::PlayerId,
};

/// Proxy host backed by concurrent maps instead of a live proxy.
///
/// Connection requests are applied immediately: the player is moved to the
/// target server and the request is kept in a per-player log.
#[derive(Clone, Default)]
pub struct LocalProxy {
    inner: Arc<LocalRoster>,
}

#[derive(Default)]
struct LocalRoster {
    servers: DashSet<String>,
    players: DashMap<PlayerId, Option<String>>,
    requests: DashMap<PlayerId, Vec<String>>,
}

impl LocalProxy {
    /// Create a proxy with no servers and no players.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a roster that already knows the given server aliases.
    pub fn with_servers<I, S>(aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let proxy = Self::new();
        for alias in aliases {
            proxy.register_server(alias);
        }
        proxy
    }

    /// Make `alias` known as a backend server.
    pub fn register_server(&self, alias: impl Into<String>) {
        self.inner.servers.insert(alias.into());
    }

    /// Mark a player as connected, optionally already placed on a server.
    pub fn connect_player(&self, id: PlayerId, server: Option<&str>) {
        self.inner.players.insert(id, server.map(str::to_owned));
    }

    /// Drop `id` from the connected players.
    pub fn disconnect_player(&self, id: PlayerId) {
        self.inner.players.remove(&id);
    }

    /// Server the player currently sits on, if connected and placed.
    pub fn current_server(&self, id: PlayerId) -> Option<String> {
        self.inner
            .players
            .get(&id)
            .and_then(|entry| entry.value().clone())
    }

    /// Target aliases of every connection request issued for `id`, oldest first.
    pub fn connection_requests(&self, id: PlayerId) -> Vec<String> {
        self.inner
            .requests
            .get(&id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Number of connection requests issued so far, across all players.
    pub fn total_requests(&self) -> usize {
        self.inner
            .requests
            .iter()
            .map(|entry| entry.value().len())
            .sum()
    }
}

impl ProxyHost for LocalProxy {
    fn find_server(&self, alias: &str) -> BoxFuture<'static, ProxyResult<Option<ServerHandle>>> {
        let found = self.inner.servers.contains(alias).then(|| ServerHandle {
            alias: alias.to_owned(),
        });
        Box::pin(ready(Ok(found)))
    }

    fn find_connected_player(
        &self,
        id: PlayerId,
    ) -> BoxFuture<'static, ProxyResult<Option<PlayerHandle>>> {
        let found = self.inner.players.get(&id).map(|entry| PlayerHandle {
            id,
            server: entry.value().clone(),
        });
        Box::pin(ready(Ok(found)))
    }

    fn request_connection(&self, player: &PlayerHandle, server: &ServerHandle) {
        debug!(player_id = %player.id, server = %server.alias, "local connection request");
        self.inner
            .requests
            .entry(player.id)
            .or_default()
            .push(server.alias.clone());
        if let Some(mut entry) = self.inner.players.get_mut(&player.id) {
            *entry = Some(server.alias.clone());
        }
    }

    fn health_check(&self) -> BoxFuture<'static, ProxyResult<()>> {
        Box::pin(ready(Ok(())))
    }
}
