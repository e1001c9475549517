use super::helpers::TestServer;
use crate::events::ServerEvent;

#[tokio::test]
async fn test_join_notice_reaches_existing_connections_only() {
    let server = TestServer::new();
    let mut alice = server.join("alice", "secret1").await;
    let mut bob = server.join("bob", "secret2").await;

    assert_eq!(alice.drain(), vec![ServerEvent::user_connected("bob")]);
    // The joiner never sees its own notice.
    assert_eq!(bob.drain(), vec![]);
}

#[tokio::test]
async fn test_leave_notice_reaches_every_remaining_connection() {
    let server = TestServer::new();
    let mut alice = server.join("alice", "secret1").await;
    let bob = server.join("bob", "secret2").await;
    let mut carol = server.join("carol", "secret3").await;
    alice.drain();
    carol.drain();

    server.registry.close(bob.id).expect("close");

    // Exactly one leave notice per remaining connection.
    assert_eq!(alice.drain(), vec![ServerEvent::user_disconnected("bob")]);
    assert_eq!(carol.drain(), vec![ServerEvent::user_disconnected("bob")]);
}

#[tokio::test]
async fn test_close_emits_leave_notice_exactly_once() {
    let server = TestServer::new();
    let mut alice = server.join("alice", "secret1").await;
    let bob = server.join("bob", "secret2").await;
    alice.drain();

    server.registry.close(bob.id).expect("close");
    server.registry.close(bob.id).expect("close again");
    server.registry.close(bob.id).expect("and again");

    assert_eq!(alice.drain(), vec![ServerEvent::user_disconnected("bob")]);
}

#[tokio::test]
async fn test_nothing_delivered_after_close() {
    let server = TestServer::new();
    let alice = server.join("alice", "secret1").await;
    let mut bob = server.join("bob", "secret2").await;
    bob.drain();

    server.registry.close(bob.id).expect("close");

    server
        .registry
        .broadcast_message(alice.id, "too late")
        .expect("broadcast");
    server.join("carol", "secret3").await;

    assert_eq!(bob.drain(), vec![]);
}

#[tokio::test]
async fn test_duplicate_identity_presence_is_per_connection() {
    let server = TestServer::new();
    let mut first = server.join("alice", "secret1").await;
    let second = server.join("alice", "secret1").await;

    // Presence events fire per connection, not per identity.
    assert_eq!(first.drain(), vec![ServerEvent::user_connected("alice")]);

    server.registry.close(second.id).expect("close");
    assert_eq!(first.drain(), vec![ServerEvent::user_disconnected("alice")]);
    assert_eq!(server.registry.connection_count(), 1);
}

#[tokio::test]
async fn test_last_connection_leaving_empties_the_room() {
    let server = TestServer::new();
    let alice = server.join("alice", "secret1").await;

    server.registry.close(alice.id).expect("close");
    assert_eq!(server.registry.connection_count(), 0);

    // The room keeps working for whoever joins next.
    let mut bob = server.join("bob", "secret2").await;
    assert_eq!(bob.drain(), vec![]);
    assert_eq!(server.registry.connection_count(), 1);
}
