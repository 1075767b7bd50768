use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::info;

use crate::{
    error::ServiceError,
    state::{SharedState, ViewerKind},
};

/// Register an SSE viewer in the hub and stream its events until the client disconnects.
pub fn subscribe(
    state: &SharedState,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>> + use<>>, ServiceError> {
    let (event_tx, mut event_rx) = state.hub().viewer_channel();
    let viewer_id = state
        .hub()
        .connect(ViewerKind::Sse, event_tx)
        .ok_or_else(|| ServiceError::InvalidState("failed to register SSE viewer".into()))?;
    info!(viewer_id = %viewer_id, "SSE viewer connected");

    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    let state = state.clone();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                received = event_rx.recv() => {
                    let Some(payload) = received else { break };
                    let event = Event::default().event(payload.event).data(payload.data.as_ref());
                    if tx.send(Ok(event)).await.is_err() {
                        break;
                    }
                }
            }
        }

        state.hub().disconnect(&viewer_id);
        info!(viewer_id = %viewer_id, "SSE viewer disconnected");
    });

    // response stream reads from mpsc; when client disconnects axum drops this stream
    let stream = ReceiverStream::new(rx);
    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::memory_state;

    #[tokio::test]
    async fn subscribing_registers_a_viewer() {
        let state = memory_state().await;
        let _sse = subscribe(&state).unwrap();
        assert_eq!(state.hub().viewer_count(), 1);
    }
}
