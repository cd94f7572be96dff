//! Application-level configuration loading: known servers, relocation defaults and the proxy bridge.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "PARTY_MANAGER_CONFIG_PATH";
/// Capacity of the party event broadcast channel when not configured.
const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Connection settings for the HTTP bridge running next to the proxy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProxyBridgeConfig {
    /// Root URL of the bridge, e.g. `http://127.0.0.1:8765`.
    pub base_url: String,
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    default_server: Option<String>,
    servers: Vec<String>,
    proxy_bridge: Option<ProxyBridgeConfig>,
    event_capacity: usize,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        servers = app_config.servers.len(),
                        bridged = app_config.proxy_bridge.is_some(),
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a configuration document.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Use `alias` when a relocation request names no server.
    pub fn with_default_server(mut self, alias: impl Into<String>) -> Self {
        self.default_server = Some(alias.into());
        self
    }

    /// Server aliases the in-process proxy roster starts with.
    pub fn with_servers<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.servers = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Server used for relocations that name no alias.
    pub fn default_server(&self) -> Option<&str> {
        self.default_server.as_deref()
    }

    /// Server aliases announced in the configuration.
    pub fn servers(&self) -> &[String] {
        &self.servers
    }

    /// Bridge settings; `None` runs against the in-process proxy.
    pub fn proxy_bridge(&self) -> Option<&ProxyBridgeConfig> {
        self.proxy_bridge.as_ref()
    }

    /// Capacity of the party event broadcast channel.
    pub fn event_capacity(&self) -> usize {
        self.event_capacity
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_server: None,
            servers: Vec::new(),
            proxy_bridge: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    default_server: Option<String>,
    #[serde(default)]
    servers: Vec<String>,
    #[serde(default)]
    proxy_bridge: Option<ProxyBridgeConfig>,
    #[serde(default)]
    event_capacity: Option<usize>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let default_server = value
            .default_server
            .map(|alias| alias.trim().to_string())
            .filter(|alias| !alias.is_empty());
        Self {
            default_server,
            servers: value.servers,
            proxy_bridge: value
                .proxy_bridge
                .filter(|bridge| !bridge.base_url.trim().is_empty()),
            event_capacity: value
                .event_capacity
                .filter(|capacity| *capacity > 0)
                .unwrap_or(DEFAULT_EVENT_CAPACITY),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_document() {
        let config = AppConfig::from_json(
            r#"{
                "default_server": "lobby",
                "servers": ["lobby", "survival"],
                "proxy_bridge": { "base_url": "http://127.0.0.1:8081" },
                "event_capacity": 128
            }"#,
        )
        .unwrap();

        assert_eq!(config.default_server(), Some("lobby"));
        assert_eq!(config.servers(), ["lobby", "survival"]);
        assert_eq!(
            config.proxy_bridge().map(|bridge| bridge.base_url.as_str()),
            Some("http://127.0.0.1:8081")
        );
        assert_eq!(config.event_capacity(), 128);
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config = AppConfig::from_json("{}").unwrap();

        assert!(config.default_server().is_none());
        assert!(config.servers().is_empty());
        assert!(config.proxy_bridge().is_none());
        assert_eq!(config.event_capacity(), DEFAULT_EVENT_CAPACITY);
    }

    #[test]
    fn blank_values_are_ignored() {
        let config = AppConfig::from_json(
            r#"{ "default_server": "  ", "proxy_bridge": { "base_url": "" }, "event_capacity": 0 }"#,
        )
        .unwrap();

        assert!(config.default_server().is_none());
        assert!(config.proxy_bridge().is_none());
        assert_eq!(config.event_capacity(), DEFAULT_EVENT_CAPACITY);
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(AppConfig::from_json(r#"{ "servers": "lobby" }"#).is_err());
    }
}
