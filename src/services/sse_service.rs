use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info};

use crate::{
    dto::sse::{Handshake, ServerEvent},
    state::SharedState,
};

const STREAM_NAME: &str = "parties";
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Subscribe to the party event stream and build the greeting sent first.
pub async fn subscribe(state: &SharedState) -> (broadcast::Receiver<ServerEvent>, ServerEvent) {
    let receiver = state.events().subscribe();
    let handshake = Handshake {
        stream: STREAM_NAME.into(),
        message: "subscribed to party events".into(),
        degraded: state.is_degraded(),
        parties: state.registry().party_count().await,
    };
    let greeting = ServerEvent::json(Some("info".to_string()), &handshake).unwrap_or_else(|_| {
        ServerEvent::new(Some("info".to_string()), handshake.message.clone())
    });

    info!(
        subscribers = state.events().subscriber_count(),
        "party SSE stream connected"
    );
    (receiver, greeting)
}

/// Convert a broadcast receiver into an SSE response, forwarding events until
/// the client disconnects.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<ServerEvent>,
    greeting: ServerEvent,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        if tx.send(Ok(to_event(greeting))).await.is_err() {
            return;
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            if tx.send(Ok(to_event(payload))).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(skipped)) => {
                            debug!(skipped, "party SSE subscriber lagged");
                            continue;
                        }
                    }
                }
            }
        }

        info!("party SSE stream disconnected");
    });

    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(KEEP_ALIVE_INTERVAL)
            .text("keep-alive"),
    )
}

fn to_event(payload: ServerEvent) -> Event {
    let event = Event::default().data(payload.data);
    match payload.event {
        Some(name) => event.event(name),
        None => event,
    }
}
