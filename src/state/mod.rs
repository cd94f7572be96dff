/// Party entity and its membership rules.
pub mod party;
/// Registry of live parties.
pub mod registry;
mod sse;

use std::sync::Arc;

use tokio::sync::watch;

use crate::{config::AppConfig, proxy::ProxyHost, state::registry::PartyRegistry};

pub use self::sse::SseHub;

/// Handle to the application state shared by every request.
pub type SharedState = Arc<AppState>;

/// Central application state: the party registry, the proxy seam and the event hub.
pub struct AppState {
    registry: PartyRegistry,
    proxy: Arc<dyn ProxyHost>,
    events: SseHub,
    degraded: watch::Sender<bool>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts healthy; the proxy supervisor flips the degraded
    /// flag when the proxy stops answering.
    pub fn new(config: AppConfig, proxy: Arc<dyn ProxyHost>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(false);
        Arc::new(Self {
            registry: PartyRegistry::new(),
            events: SseHub::new(config.event_capacity()),
            proxy,
            degraded: degraded_tx,
            config,
        })
    }

    /// Registry of live parties.
    pub fn registry(&self) -> &PartyRegistry {
        &self.registry
    }

    /// Proxy host used for server lookups and player relocation.
    pub fn proxy(&self) -> &dyn ProxyHost {
        self.proxy.as_ref()
    }

    /// Broadcast hub used for the party SSE stream.
    pub fn events(&self) -> &SseHub {
        &self.events
    }

    /// Configuration the server was started with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update the degraded flag, returning whether the value changed.
    pub fn update_degraded(&self, value: bool) -> bool {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::LocalProxy;

    #[test]
    fn degraded_flag_reports_transitions_only() {
        let state = AppState::new(AppConfig::default(), Arc::new(LocalProxy::new()));
        let watcher = state.degraded_watcher();

        assert!(!state.is_degraded());
        assert!(!state.update_degraded(false));
        assert!(state.update_degraded(true));
        assert!(state.is_degraded());
        assert!(*watcher.borrow());
        assert!(!state.update_degraded(true));
    }
}
