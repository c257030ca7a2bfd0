//! Device event stream.
//!
//! Every provision, discovery and transition is pushed to connected
//! WebSocket clients as a JSON text message.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;

use boneled_runtime::{DeviceEvent, DeviceHost};

use crate::state::GatewayState;

/// WebSocket upgrade handler for `GET /v1/events/ws`.
pub async fn events_handler<H>(
    ws: WebSocketUpgrade,
    State(state): State<Arc<GatewayState<H>>>,
) -> Response
where
    H: DeviceHost + 'static,
{
    // Subscribe before the upgrade so no event between the two is lost
    let events = state.host.subscribe();
    tracing::debug!("Event stream connection initiated");
    ws.on_upgrade(move |socket| stream_events(socket, events))
}

async fn stream_events(socket: WebSocket, mut events: Receiver<DeviceEvent>) {
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    tracing::trace!(device_id = %event.device_id(), "Forwarding device event");
                    let Some(message) = event_message(&event) else {
                        continue;
                    };
                    if let Err(e) = sink.send(message).await {
                        tracing::debug!(error = %e, "Event stream client went away");
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event stream client lagging, events dropped");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    tracing::debug!("Event stream ended");
}

/// Encode an event as a WebSocket text frame.
fn event_message(event: &DeviceEvent) -> Option<Message> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Message::Text(json)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode device event");
            None
        }
    }
}
