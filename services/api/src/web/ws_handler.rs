//! services/api/src/web/ws_handler.rs
//!
//! The presence channel. Each WebSocket connection gets a `ConnectionHandle`;
//! `join` events map a user id to it and closing the socket forgets it again.

use crate::web::{
    protocol::{ClientMessage, ServerMessage},
    state::{AppState, ConnectionHandle},
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use inspection_core::PresenceTracker;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(ws: WebSocketUpgrade, State(app_state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    let (mut ws_sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    let handle = ConnectionHandle::new(tx);
    info!(connection_id = %handle.id, "Presence connection established");

    // --- 1. Outbound pump: everything queued on the handle goes to the socket ---
    let outbound = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize server message: {}", e);
                    continue;
                }
            };
            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // --- 2. Main Message Loop ---
    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => handle_text_message(text.as_str(), &app_state.presence, &handle).await,
            Message::Close(_) => {
                info!("Client sent close message.");
                break;
            }
            _ => {}
        }
    }

    // --- 3. Cleanup ---
    app_state.presence.on_disconnect(&handle).await;
    outbound.abort();
    info!(connection_id = %handle.id, "Presence connection closed");
}

async fn handle_text_message(
    text: &str,
    presence: &PresenceTracker<ConnectionHandle>,
    handle: &ConnectionHandle,
) {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Join { user_id }) => {
            presence.join(&user_id, handle.clone()).await;
            handle.send(ServerMessage::Joined { user_id });
        }
        Err(e) => {
            warn!("Failed to deserialize client message: {}", e);
            handle.send(ServerMessage::Error {
                message: "Unrecognized message".to_string(),
            });
        }
    }
}
