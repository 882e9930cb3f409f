pub mod handlers;
mod host;
mod player;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::session::{PlayerSession, SessionEvent};
use crate::state::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    tracing::info!("WebSocket connection request");
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

fn encode(msg: &ServerMessage) -> Option<Message> {
    match serde_json::to_string(msg) {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            tracing::error!("Failed to serialize server message: {}", e);
            None
        }
    }
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    if let Some(welcome) = encode(&ServerMessage::welcome()) {
        if sender.send(welcome).await.is_err() {
            tracing::error!("Failed to send welcome message");
            return;
        }
    }

    // The seat this connection holds, if any
    let mut session: Option<PlayerSession> = None;

    loop {
        tokio::select! {
            // Room changes for the seated player
            event = async {
                match session.as_mut() {
                    Some(s) => s.next_event().await,
                    None => {
                        // No seat: wait forever
                        std::future::pending::<Option<SessionEvent>>().await
                    }
                }
            } => {
                let outgoing = match event {
                    Some(SessionEvent::Updated(view)) => ServerMessage::Room { view },
                    Some(SessionEvent::Closed) | None => {
                        session = None;
                        ServerMessage::RoomClosed
                    }
                    Some(SessionEvent::Removed) => {
                        session = None;
                        ServerMessage::Left
                    }
                };
                if let Some(msg) = encode(&outgoing) {
                    if sender.send(msg).await.is_err() {
                        break;
                    }
                }
            }

            // Handle client messages
            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!("Received message: {}", text);

                        let response = match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => {
                                handlers::handle_message(client_msg, &mut session, &state).await
                            }
                            Err(e) => {
                                tracing::warn!("Failed to parse client message: {}", e);
                                Some(ServerMessage::error(
                                    "PARSE_ERROR",
                                    format!("Invalid message format: {}", e),
                                ))
                            }
                        };

                        if let Some(msg) = response.as_ref().and_then(encode) {
                            if sender.send(msg).await.is_err() {
                                tracing::error!("Failed to send response");
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("WebSocket closed");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    // The seat stays in the room so the client can resume it
    match session {
        Some(s) => tracing::info!(
            "WebSocket connection closed for {} in {}",
            s.player_id(),
            s.code()
        ),
        None => tracing::info!("WebSocket connection closed"),
    }
}
