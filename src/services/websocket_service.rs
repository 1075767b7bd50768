use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    dto::live::parse_viewer_message,
    services::live_events,
    state::{SharedState, ViewerKind},
};

const CONTROL_QUEUE_CAPACITY: usize = 8;

/// Handle the full lifecycle of a live viewer WebSocket.
///
/// The viewer receives every hub broadcast; text frames it sends are relayed to all viewers
/// as `message` events.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (event_tx, mut event_rx) = state.hub().viewer_channel();
    let (control_tx, mut control_rx) = mpsc::channel::<Message>(CONTROL_QUEUE_CAPACITY);

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        loop {
            let message = tokio::select! {
                biased;
                Some(control) = control_rx.recv() => control,
                event = event_rx.recv() => match event {
                    Some(event) => Message::Text(event.data.as_ref().into()),
                    // The hub dropped this viewer; close the socket so the reader ends too.
                    None => Message::Close(None),
                },
            };
            let closing = matches!(message, Message::Close(_));
            if sender.send(message).await.is_err() || closing {
                break;
            }
        }
    });

    let Some(viewer_id) = state.hub().connect(ViewerKind::WebSocket, event_tx) else {
        warn!("failed to register websocket viewer");
        finalize(writer_task, control_tx).await;
        return;
    };
    info!(viewer_id = %viewer_id, "websocket viewer connected");

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => match parse_viewer_message(text.as_str()) {
                Some(text) => live_events::broadcast_viewer_message(&state, viewer_id, text),
                None => debug!(viewer_id = %viewer_id, "ignoring empty or unsupported viewer frame"),
            },
            Ok(Message::Ping(payload)) => {
                let _ = control_tx.try_send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                info!(viewer_id = %viewer_id, "websocket viewer closed");
                let _ = control_tx.try_send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) | Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(viewer_id = %viewer_id, error = %err, "websocket error");
                break;
            }
        }
    }

    state.hub().disconnect(&viewer_id);
    info!(viewer_id = %viewer_id, "websocket viewer disconnected");

    finalize(writer_task, control_tx).await;
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, control_tx: mpsc::Sender<Message>) {
    drop(control_tx);
    let _ = writer_task.await;
}
