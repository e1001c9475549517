use super::helpers::TestServer;
use crate::events::{SenderKind, ServerEvent};

#[tokio::test]
async fn test_message_delivered_to_everyone_but_sender() {
    let server = TestServer::new();
    let alice = server.join("alice", "secret1").await;
    let mut others = Vec::new();
    for name in ["bob", "carol", "dave"] {
        others.push(server.join(name, "secret1").await);
    }
    for peer in &mut others {
        peer.drain();
    }

    server
        .registry
        .broadcast_message(alice.id, "hello everyone")
        .expect("broadcast");

    // Exactly the three non-senders receive it.
    for peer in &mut others {
        let events = peer.drain();
        assert_eq!(events.len(), 1);
        match &events[0] {
            ServerEvent::ReceiveMessage {
                username,
                message,
                kind,
                timestamp,
            } => {
                assert_eq!(username, "alice");
                assert_eq!(message, "hello everyone");
                assert_eq!(*kind, SenderKind::User);
                assert!(!timestamp.is_empty());
            }
            other => panic!("expected ReceiveMessage, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_message_never_echoed_to_sender() {
    let server = TestServer::new();
    let mut alice = server.join("alice", "secret1").await;
    server.join("bob", "secret2").await;
    alice.drain();

    server
        .registry
        .broadcast_message(alice.id, "am I talking to myself")
        .expect("broadcast");

    assert_eq!(alice.drain(), vec![]);
}

#[tokio::test]
async fn test_empty_message_relayed_unfiltered() {
    let server = TestServer::new();
    let alice = server.join("alice", "secret1").await;
    let mut bob = server.join("bob", "secret2").await;
    bob.drain();

    server
        .registry
        .broadcast_message(alice.id, "")
        .expect("broadcast");

    let events = bob.drain();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        ServerEvent::ReceiveMessage { message, .. } if message.is_empty()
    ));
}

#[tokio::test]
async fn test_single_connection_broadcast_is_a_quiet_success() {
    let server = TestServer::new();
    let mut alice = server.join("alice", "secret1").await;

    server
        .registry
        .broadcast_message(alice.id, "echo?")
        .expect("broadcast");

    assert_eq!(alice.drain(), vec![]);
}

#[tokio::test]
async fn test_messages_attributed_to_token_identity_not_payload() {
    // The sender's identity comes from admission, never from the frame.
    let server = TestServer::new();
    let alice = server.join("alice", "secret1").await;
    let mut bob = server.join("bob", "secret2").await;
    bob.drain();

    server
        .registry
        .broadcast_message(alice.id, "I am definitely bob")
        .expect("broadcast");

    let events = bob.drain();
    assert!(matches!(
        &events[0],
        ServerEvent::ReceiveMessage { username, .. } if username == "alice"
    ));
}

#[tokio::test]
async fn test_interleaved_senders_each_keep_their_order() {
    let server = TestServer::new();
    let alice = server.join("alice", "secret1").await;
    let bob = server.join("bob", "secret2").await;
    let mut carol = server.join("carol", "secret3").await;
    carol.drain();

    server.registry.broadcast_message(alice.id, "a1").expect("broadcast");
    server.registry.broadcast_message(bob.id, "b1").expect("broadcast");
    server.registry.broadcast_message(alice.id, "a2").expect("broadcast");
    server.registry.broadcast_message(bob.id, "b2").expect("broadcast");

    let messages: Vec<(String, String)> = carol
        .drain()
        .into_iter()
        .map(|event| match event {
            ServerEvent::ReceiveMessage {
                username, message, ..
            } => (username, message),
            other => panic!("expected ReceiveMessage, got {other:?}"),
        })
        .collect();

    let from_alice: Vec<&str> = messages
        .iter()
        .filter(|(who, _)| who == "alice")
        .map(|(_, what)| what.as_str())
        .collect();
    let from_bob: Vec<&str> = messages
        .iter()
        .filter(|(who, _)| who == "bob")
        .map(|(_, what)| what.as_str())
        .collect();

    assert_eq!(from_alice, vec!["a1", "a2"]);
    assert_eq!(from_bob, vec!["b1", "b2"]);
}
