use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Number of parties currently registered.
    pub parties: usize,
}

impl HealthResponse {
    /// Create a health response indicating the proxy is reachable.
    pub fn ok(parties: usize) -> Self {
        Self {
            status: "ok".to_string(),
            parties,
        }
    }

    /// Create a health response indicating the proxy cannot be reached.
    pub fn degraded(parties: usize) -> Self {
        Self {
            status: "degraded".to_string(),
            parties,
        }
    }
}
