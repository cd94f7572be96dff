use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report the live party count alongside the proxy connectivity status.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let parties = state.registry().party_count().await;

    if state.is_degraded() {
        warn!("proxy unavailable (degraded mode)");
        HealthResponse::degraded(parties)
    } else {
        HealthResponse::ok(parties)
    }
}
