use std::convert::Infallible;

use axum::{
    Router,
    extract::State,
    response::sse::{Event, Sse},
    routing::get,
};
use futures::Stream;

use crate::{services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/parties",
    tag = "sse",
    responses((status = 200, description = "Party event stream", content_type = "text/event-stream", body = String))
)]
/// Stream party lifecycle events to operator clients.
pub async fn party_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (receiver, greeting) = sse_service::subscribe(&state).await;
    sse_service::to_sse_stream(receiver, greeting)
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/parties", get(party_stream))
}
