//! The full happy path: two users sign up, log in, chat, and part ways.

use super::helpers::TestServer;
use crate::events::{SenderKind, ServerEvent};

#[tokio::test]
async fn test_two_user_chat_session() {
    let server = TestServer::new();

    // Both users sign up and log in.
    server.register("alice", "wonderland").await;
    server.register("bob", "builder").await;
    let alice_token = server.login("alice", "wonderland").await;
    let bob_token = server.login("bob", "builder").await;

    // Alice connects first; an empty room means no events for her yet.
    let mut alice = server.connect(Some(&alice_token)).expect("alice connects");
    assert_eq!(alice.drain(), vec![]);

    // Bob connects; only alice is notified.
    let mut bob = server.connect(Some(&bob_token)).expect("bob connects");
    assert_eq!(alice.drain(), vec![ServerEvent::user_connected("bob")]);
    assert_eq!(bob.drain(), vec![]);

    // Alice says hi; bob receives it attributed to alice, alice hears
    // nothing back.
    server
        .registry
        .broadcast_message(alice.id, "hi")
        .expect("broadcast");
    let received = bob.drain();
    assert_eq!(received.len(), 1);
    match &received[0] {
        ServerEvent::ReceiveMessage {
            username,
            message,
            kind,
            timestamp,
        } => {
            assert_eq!(username, "alice");
            assert_eq!(message, "hi");
            assert_eq!(*kind, SenderKind::User);
            assert!(!timestamp.is_empty());
        }
        other => panic!("expected ReceiveMessage, got {other:?}"),
    }
    assert_eq!(alice.drain(), vec![]);

    // Bob disconnects; alice gets exactly one leave notice.
    server.registry.close(bob.id).expect("close");
    assert_eq!(alice.drain(), vec![ServerEvent::user_disconnected("bob")]);
    assert_eq!(server.registry.connection_count(), 1);
}
