//! WebSocket stream of flow events.
//!
//! On connect (and after falling behind the broadcast) the client gets a
//! `sync` frame with the active interview's snapshot; afterwards every
//! [`FlowEvent`] is forwarded as a JSON text frame. Clients may also drive
//! the interview over the socket with [`ClientAction`] frames.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use super::routes::AppState;
use super::service::FlowService;
use crate::events::FlowEvent;
use crate::interview::session::InterviewSnapshot;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerFrame<'a> {
    Sync {
        interview: Option<InterviewSnapshot>,
    },
    #[serde(untagged)]
    Event(&'a FlowEvent),
}

/// Interview actions a client can send instead of calling the REST routes.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientAction {
    Send { text: String },
    ToggleVoice,
    Finish,
}

pub(super) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    info!("WebSocket client connecting");
    ws.on_upgrade(|socket| handle_socket(socket, state.flow))
}

async fn handle_socket(mut socket: WebSocket, flow: Arc<FlowService>) {
    info!("WebSocket client connected");

    // Subscribe before the sync so nothing emitted in between is lost.
    let mut rx = flow.events().subscribe();

    if send_sync(&mut socket, &flow).await.is_err() {
        warn!("Failed to send initial sync, client disconnected");
        return;
    }

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(event) => {
                        if send_frame(&mut socket, &ServerFrame::Event(&event)).await.is_err() {
                            debug!("Client disconnected during send");
                            break;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        warn!(missed = n, "WS client lagged behind broadcast");
                        if send_sync(&mut socket, &flow).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Closed) => {
                        debug!("Broadcast channel closed");
                        break;
                    }
                }
            }

            result = socket.recv() => {
                match result {
                    Some(Ok(Message::Text(text))) => {
                        handle_client_message(&text, &flow).await;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("WebSocket client disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "WebSocket error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    info!("WebSocket connection closed");
}

async fn send_sync(socket: &mut WebSocket, flow: &FlowService) -> Result<(), axum::Error> {
    let interview = flow.interview_state().await.ok();
    send_frame(socket, &ServerFrame::Sync { interview }).await
}

async fn send_frame(socket: &mut WebSocket, frame: &ServerFrame<'_>) -> Result<(), axum::Error> {
    match serde_json::to_string(frame) {
        Ok(json) => socket.send(Message::Text(json.into())).await,
        Err(e) => {
            warn!(error = %e, "Failed to serialize WS frame");
            Ok(())
        }
    }
}

/// Outcomes surface as events (toasts, appended messages), so failures here
/// are only logged.
async fn handle_client_message(text: &str, flow: &FlowService) {
    let action = match serde_json::from_str::<ClientAction>(text) {
        Ok(action) => action,
        Err(e) => {
            debug!(error = %e, text = text, "Unrecognized WS message from client");
            return;
        }
    };

    match action {
        ClientAction::Send { text } => {
            if let Err(e) = flow.send_message(&text).await {
                warn!(error = %e, "Send failed via WS");
            }
        }
        ClientAction::ToggleVoice => match flow.toggle_voice().await {
            Ok(listening) => debug!(listening, "Voice toggled via WS"),
            Err(e) => warn!(error = %e, "Voice toggle failed via WS"),
        },
        ClientAction::Finish => {
            if let Err(e) = flow.finish().await {
                warn!(error = %e, "Finish failed via WS");
            }
        }
    }
}
