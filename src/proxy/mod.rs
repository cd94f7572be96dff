//! Seam towards the network proxy that actually routes players between backend servers.

#[cfg(feature = "proxy-bridge")]
/// HTTP client for the proxy bridge.
pub mod bridge;
/// In-process proxy.
pub mod local;

use std::error::Error;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::state::party::PlayerId;

pub use self::local::LocalProxy;

/// Result alias for proxy host operations.
pub type ProxyResult<T> = Result<T, ProxyError>;

/// Error raised by proxy host implementations regardless of how they reach the proxy.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The proxy could not be reached or answered with garbage.
    #[error("proxy unavailable: {message}")]
    Unavailable {
        /// What was being attempted.
        message: String,
        /// Underlying transport failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl ProxyError {
    /// Construct an unavailable error from any transport failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        ProxyError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}

/// Backend server registered on the proxy, addressed by its alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerHandle {
    /// Alias the proxy knows the server by.
    pub alias: String,
}

/// Player currently connected to the proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerHandle {
    /// Player identifier.
    pub id: PlayerId,
    /// Alias of the backend server the player is on, when known.
    pub server: Option<String>,
}

/// Primitives the party service needs from the proxy.
pub trait ProxyHost: Send + Sync {
    /// Look up a backend server by alias; `None` when the proxy does not know it.
    fn find_server(&self, alias: &str) -> BoxFuture<'static, ProxyResult<Option<ServerHandle>>>;
    /// Look up a player that is connected right now; `None` when offline.
    fn find_connected_player(
        &self,
        id: PlayerId,
    ) -> BoxFuture<'static, ProxyResult<Option<PlayerHandle>>>;
    /// Ask the proxy to move `player` to `server` without waiting for the outcome.
    fn request_connection(&self, player: &PlayerHandle, server: &ServerHandle);
    fn health_check(&self) -> BoxFuture<'static, ProxyResult<()>>;
}
