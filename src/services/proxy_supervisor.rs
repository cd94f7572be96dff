use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{services::sse_events, state::SharedState};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Poll the proxy and keep the shared state in degraded mode while it is unreachable.
pub async fn run(state: SharedState) {
    let mut delay = INITIAL_DELAY;
    let mut attempt: u32 = 0;

    loop {
        if probe(&state).await {
            attempt = 0;
            delay = INITIAL_DELAY;
            sleep(HEALTH_POLL_INTERVAL).await;
        } else {
            attempt += 1;
            warn!(attempt, retry_in = ?delay, "proxy still unreachable");
            sleep(delay).await;
            delay = (delay * 2).min(MAX_DELAY);
        }
    }
}

/// Run one health check and apply its outcome to the degraded flag.
///
/// Returns whether the proxy answered.
async fn probe(state: &SharedState) -> bool {
    match state.proxy().health_check().await {
        Ok(()) => {
            if state.update_degraded(false) {
                info!("proxy healthy again; leaving degraded mode");
                sse_events::broadcast_system_status(state, false);
            }
            true
        }
        Err(err) => {
            if state.update_degraded(true) {
                warn!(error = %err, "proxy health check failed; entering degraded mode");
                sse_events::broadcast_system_status(state, true);
            }
            false
        }
    }
}
