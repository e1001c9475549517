use super::helpers::TestServer;
use crate::auth::TOKEN_TTL_SECS;
use crate::testing::new_test_signer;

#[tokio::test]
async fn test_handshake_without_token_rejected() {
    let server = TestServer::new();

    assert!(server.connect(None).is_err());
    // No channel was established, no connection-level event fired.
    assert_eq!(server.registry.connection_count(), 0);
}

#[tokio::test]
async fn test_handshake_with_garbage_token_rejected() {
    let server = TestServer::new();
    assert!(server.connect(Some("garbage")).is_err());
    assert_eq!(server.registry.connection_count(), 0);
}

#[tokio::test]
async fn test_handshake_with_tampered_token_rejected() {
    let server = TestServer::new();
    server.register("alice", "secret1").await;
    let token = server.login("alice", "secret1").await;

    // Mutating one byte of a valid token invalidates it.
    let mut bytes = token.clone().into_bytes();
    let last = bytes.len() - 1;
    bytes[last] = if bytes[last] == b'A' { b'B' } else { b'A' };
    let tampered = String::from_utf8(bytes).expect("ascii token");

    assert!(server.connect(Some(&tampered)).is_err());

    // The untampered token still works.
    assert!(server.connect(Some(&token)).is_ok());
}

#[tokio::test]
async fn test_handshake_with_expired_token_rejected() {
    let server = TestServer::new();
    let issued_at = 1_000_000;
    let token = new_test_signer()
        .issue_at("alice", issued_at)
        .expect("issue");

    // Accepted strictly before the expiry instant.
    assert!(
        server
            .authorizer
            .authorize_at(Some(&token), issued_at + TOKEN_TTL_SECS - 1)
            .is_ok()
    );
    // Rejected from the expiry instant on.
    assert!(
        server
            .authorizer
            .authorize_at(Some(&token), issued_at + TOKEN_TTL_SECS)
            .is_err()
    );
}

#[tokio::test]
async fn test_handshake_binds_token_identity() {
    let server = TestServer::new();
    server.register("alice", "secret1").await;
    let token = server.login("alice", "secret1").await;

    let connection = server.connect(Some(&token)).expect("handshake");
    assert_eq!(connection.username, "alice");
}

#[tokio::test]
async fn test_admission_outlives_token_expiry() {
    // Once admitted, a connection stays trusted: mid-session expiry is not
    // re-checked, so messages keep flowing.
    let server = TestServer::new();
    let mut alice = server.join("alice", "secret1").await;
    let bob = server.join("bob", "secret2").await;
    alice.drain();

    // Long after every token has expired, the registry still delivers.
    server
        .registry
        .broadcast_message(bob.id, "still here")
        .expect("broadcast");
    assert_eq!(alice.drain().len(), 1);
}
