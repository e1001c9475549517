//! Per-connection WebSocket loop.
//!
//! Bridges one upgraded socket to the session registry: inbound frames are
//! decoded into client events and handed to the registry; registry fan-out
//! arrives on this connection's channel and is written back out as JSON.
//!
//! # Cancellation
//!
//! Every exit path (client close frame, stream end, receive error, write
//! failure) falls through to a single `close()` call, and the registry makes
//! close idempotent, so a connection dying at any point triggers exactly one
//! leave notice.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use tokio::sync::mpsc;

use crate::events::ClientEvent;
use crate::registry::SessionRegistry;

/// Run the read/write loop for an admitted connection.
///
/// The identity has already been bound by the connection authorizer; the
/// registry is not consulted about the token again for the lifetime of the
/// socket.
pub async fn handle_socket(
    mut socket: WebSocket,
    username: String,
    registry: Arc<SessionRegistry>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel();

    let connection_id = match registry.admit(&username, tx) {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("failed to admit connection for '{username}': {e}");
            return;
        }
    };

    loop {
        tokio::select! {
            // Handle incoming WebSocket frames
            msg = socket.recv() => {
                let msg = match msg {
                    Some(Ok(msg)) => msg,
                    Some(Err(e)) => {
                        tracing::warn!("websocket receive error: {e}");
                        break;
                    }
                    None => {
                        tracing::debug!("client disconnected");
                        break;
                    }
                };

                match msg {
                    Message::Text(text) => {
                        // Decode the client event; undecodable frames are
                        // skipped, not fatal.
                        match serde_json::from_str::<ClientEvent>(text.as_str()) {
                            Ok(ClientEvent::SendMessage { message }) => {
                                if let Err(e) = registry.broadcast_message(connection_id, &message) {
                                    tracing::error!("broadcast failed: {e}");
                                    break;
                                }
                            }
                            Err(e) => {
                                tracing::warn!("failed to decode client event (ignoring): {e}");
                            }
                        }
                    }
                    Message::Binary(_) => {
                        tracing::debug!("received binary frame (ignoring)");
                    }
                    Message::Ping(data) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Message::Pong(_) => {}
                    Message::Close(_) => {
                        tracing::debug!("client sent close");
                        break;
                    }
                }
            }

            // Fan-out from the registry destined for this connection
            event = rx.recv() => {
                let Some(event) = event else {
                    // Registry side of the channel is gone; tear down.
                    break;
                };
                let frame = match serde_json::to_string(&event) {
                    Ok(frame) => frame,
                    Err(e) => {
                        tracing::error!("failed to encode server event: {e}");
                        continue;
                    }
                };
                if socket.send(Message::Text(frame.into())).await.is_err() {
                    tracing::debug!("client disconnected during fan-out");
                    break;
                }
            }
        }
    }

    if let Err(e) = registry.close(connection_id) {
        tracing::error!("failed to close connection {connection_id}: {e}");
    }
}
