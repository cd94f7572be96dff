//! HTTP client for a proxy-side bridge plugin that exposes server lookup,
//! player presence and connection requests.

use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    config::ProxyBridgeConfig,
    proxy::{PlayerHandle, ProxyError, ProxyHost, ProxyResult, ServerHandle},
    state::party::PlayerId,
};

/// Convenient result alias returning [`BridgeError`] failures.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Failures that can occur while talking to the proxy bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The configured base URL cannot be used to address bridge endpoints.
    #[error("invalid proxy bridge base URL `{url}`: {reason}")]
    InvalidBaseUrl {
        /// Configured URL.
        url: String,
        /// Why it was refused.
        reason: String,
    },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build proxy bridge client")]
    ClientBuilder {
        /// Client builder error.
        #[source]
        source: reqwest::Error,
    },
    /// A request to a bridge endpoint could not be sent.
    #[error("failed to send proxy bridge request to `{path}`")]
    RequestSend {
        /// Endpoint path.
        path: String,
        /// Transport error.
        #[source]
        source: reqwest::Error,
    },
    /// The bridge returned an unexpected status code.
    #[error("unexpected proxy bridge response status {status} for `{path}`")]
    RequestStatus {
        /// Endpoint path.
        path: String,
        /// Status returned by the bridge.
        status: StatusCode,
    },
    /// Response payload could not be parsed into JSON.
    #[error("failed to decode proxy bridge response for `{path}`")]
    DecodeResponse {
        /// Endpoint path.
        path: String,
        /// Decoding error.
        #[source]
        source: reqwest::Error,
    },
}

impl From<BridgeError> for ProxyError {
    fn from(err: BridgeError) -> Self {
        ProxyError::unavailable(err.to_string(), err)
    }
}

#[derive(Debug, Deserialize)]
struct ServerDocument {
    alias: String,
}

#[derive(Debug, Deserialize)]
struct PlayerDocument {
    id: PlayerId,
    #[serde(default)]
    server: Option<String>,
}

#[derive(Debug, Serialize)]
struct ConnectRequest<'a> {
    server: &'a str,
}

/// [`ProxyHost`] that forwards every primitive to the bridge over HTTP.
#[derive(Clone)]
pub struct BridgeProxy {
    client: Client,
    base_url: Arc<Url>,
}

impl BridgeProxy {
    /// Build a bridge client; no request is sent until the first lookup.
    pub fn new(config: &ProxyBridgeConfig) -> BridgeResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| BridgeError::ClientBuilder { source })?;

        let raw = config.base_url.trim_end_matches('/');
        let base_url = Url::parse(raw).map_err(|err| BridgeError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: err.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(BridgeError::InvalidBaseUrl {
                url: raw.to_string(),
                reason: "URL cannot be used as a base".into(),
            });
        }

        Ok(Self {
            client,
            base_url: Arc::new(base_url),
        })
    }

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = (*self.base_url).clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_document<T>(&self, segments: &[&str]) -> BridgeResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments);
        let path = url.path().to_string();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| BridgeError::RequestSend {
                path: path.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json::<T>()
                .await
                .map(Some)
                .map_err(|source| BridgeError::DecodeResponse { path, source }),
            other => Err(BridgeError::RequestStatus {
                path,
                status: other,
            }),
        }
    }

    async fn post_connect(&self, player: PlayerId, server: &str) -> BridgeResult<()> {
        let player = player.to_string();
        let url = self.endpoint(&["players", &player, "connect"]);
        let path = url.path().to_string();
        let response = self
            .client
            .post(url)
            .json(&ConnectRequest { server })
            .send()
            .await
            .map_err(|source| BridgeError::RequestSend {
                path: path.clone(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(BridgeError::RequestStatus {
                path,
                status: response.status(),
            })
        }
    }
}

impl ProxyHost for BridgeProxy {
    fn find_server(&self, alias: &str) -> BoxFuture<'static, ProxyResult<Option<ServerHandle>>> {
        let bridge = self.clone();
        let alias = alias.to_owned();
        Box::pin(async move {
            let document = bridge
                .get_document::<ServerDocument>(&["servers", &alias])
                .await?;
            Ok(document.map(|doc| ServerHandle { alias: doc.alias }))
        })
    }

    fn find_connected_player(
        &self,
        id: PlayerId,
    ) -> BoxFuture<'static, ProxyResult<Option<PlayerHandle>>> {
        let bridge = self.clone();
        Box::pin(async move {
            let id = id.to_string();
            let document = bridge
                .get_document::<PlayerDocument>(&["players", &id])
                .await?;
            Ok(document.map(|doc| PlayerHandle {
                id: doc.id,
                server: doc.server,
            }))
        })
    }

    fn request_connection(&self, player: &PlayerHandle, server: &ServerHandle) {
        let bridge = self.clone();
        let player = player.id;
        let server = server.alias.clone();
        tokio::spawn(async move {
            match bridge.post_connect(player, &server).await {
                Ok(()) => debug!(player_id = %player, %server, "connection request accepted"),
                Err(err) => {
                    warn!(player_id = %player, %server, error = %err, "connection request failed")
                }
            }
        });
    }

    fn health_check(&self) -> BoxFuture<'static, ProxyResult<()>> {
        let bridge = self.clone();
        Box::pin(async move {
            let url = bridge.endpoint(&["health"]);
            let path = url.path().to_string();
            let response = bridge.client.get(url).send().await.map_err(|source| {
                BridgeError::RequestSend {
                    path: path.clone(),
                    source,
                }
            })?;

            if response.status().is_success() {
                Ok(())
            } else {
                Err(BridgeError::RequestStatus {
                    path,
                    status: response.status(),
                }
                .into())
            }
        })
    }
}
