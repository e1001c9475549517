//! Wire event types for the realtime channel.
//!
//! Events are JSON frames tagged by name: server-to-client events are
//! `user-connected`, `receive-message`, and `user-disconnected`; the only
//! client-to-server event is `send-message`. Presence events are
//! system-generated and carry `type: "system"`; relayed chat messages carry
//! `type: "user"` and a server-assigned timestamp.

use serde::{Deserialize, Serialize};

/// Who authored an event: the system (presence notices) or a user (chat).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderKind {
    System,
    User,
}

/// Events pushed from the server to connected clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// A participant joined the room. Sent to every connection except the
    /// joining one.
    UserConnected {
        username: String,
        message: String,
        #[serde(rename = "type")]
        kind: SenderKind,
    },
    /// A chat message relayed to every connection except its sender.
    ReceiveMessage {
        username: String,
        message: String,
        #[serde(rename = "type")]
        kind: SenderKind,
        /// Server-assigned local time of relay (`HH:MM:SS`).
        timestamp: String,
    },
    /// A participant left the room. Sent to every remaining connection.
    UserDisconnected {
        username: String,
        message: String,
        #[serde(rename = "type")]
        kind: SenderKind,
    },
}

impl ServerEvent {
    /// Build the join notice for `username`.
    #[must_use]
    pub fn user_connected(username: &str) -> Self {
        Self::UserConnected {
            username: username.to_string(),
            message: format!("{username} joined the conversation"),
            kind: SenderKind::System,
        }
    }

    /// Build a relayed chat message from `username`.
    #[must_use]
    pub fn receive_message(username: &str, message: &str, timestamp: String) -> Self {
        Self::ReceiveMessage {
            username: username.to_string(),
            message: message.to_string(),
            kind: SenderKind::User,
            timestamp,
        }
    }

    /// Build the leave notice for `username`.
    #[must_use]
    pub fn user_disconnected(username: &str) -> Self {
        Self::UserDisconnected {
            username: username.to_string(),
            message: format!("{username} left the convo"),
            kind: SenderKind::System,
        }
    }
}

/// Events sent from a client to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Author a chat message for broadcast to everyone else.
    SendMessage { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_connected_wire_shape() {
        let event = ServerEvent::user_connected("alice");
        let json = serde_json::to_value(&event).expect("serialize");

        assert_eq!(
            json,
            serde_json::json!({
                "event": "user-connected",
                "data": {
                    "username": "alice",
                    "message": "alice joined the conversation",
                    "type": "system",
                }
            })
        );
    }

    #[test]
    fn test_receive_message_wire_shape() {
        let event = ServerEvent::receive_message("alice", "hi", "12:34:56".to_string());
        let json = serde_json::to_value(&event).expect("serialize");

        assert_eq!(
            json,
            serde_json::json!({
                "event": "receive-message",
                "data": {
                    "username": "alice",
                    "message": "hi",
                    "type": "user",
                    "timestamp": "12:34:56",
                }
            })
        );
    }

    #[test]
    fn test_user_disconnected_wire_shape() {
        let event = ServerEvent::user_disconnected("bob");
        let json = serde_json::to_value(&event).expect("serialize");

        assert_eq!(
            json,
            serde_json::json!({
                "event": "user-disconnected",
                "data": {
                    "username": "bob",
                    "message": "bob left the convo",
                    "type": "system",
                }
            })
        );
    }

    #[test]
    fn test_parse_send_message() {
        let frame = r#"{"event":"send-message","data":{"message":"hello"}}"#;
        let event: ClientEvent = serde_json::from_str(frame).expect("parse");
        assert_eq!(
            event,
            ClientEvent::SendMessage {
                message: "hello".to_string()
            }
        );
    }

    #[test]
    fn test_parse_unknown_event_fails() {
        let frame = r#"{"event":"join-room","data":{"room":"general"}}"#;
        assert!(serde_json::from_str::<ClientEvent>(frame).is_err());
    }

    #[test]
    fn test_parse_empty_message_is_allowed() {
        // Empty payloads pass through unfiltered; rejection is a client
        // concern.
        let frame = r#"{"event":"send-message","data":{"message":""}}"#;
        let event: ClientEvent = serde_json::from_str(frame).expect("parse");
        assert_eq!(
            event,
            ClientEvent::SendMessage {
                message: String::new()
            }
        );
    }
}
