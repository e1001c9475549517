use super::helpers::TestServer;
use crate::auth::AuthError;

#[tokio::test]
async fn test_store_outage_surfaces_as_internal_error() {
    let server = TestServer::new();
    server.store.set_unavailable(true);

    // Distinct from any credential failure.
    assert_eq!(
        server.auth.register("alice", "secret1").await,
        Err(AuthError::Internal)
    );
    assert_eq!(
        server.auth.authenticate("alice", "secret1").await,
        Err(AuthError::Internal)
    );
}

#[tokio::test]
async fn test_store_recovery_restores_service() {
    let server = TestServer::new();

    server.store.set_unavailable(true);
    assert_eq!(
        server.auth.register("alice", "secret1").await,
        Err(AuthError::Internal)
    );

    server.store.set_unavailable(false);
    assert!(server.auth.register("alice", "secret1").await.is_ok());
    assert!(server.auth.authenticate("alice", "secret1").await.is_ok());
}

#[tokio::test]
async fn test_outage_does_not_disturb_live_connections() {
    let server = TestServer::new();
    let alice = server.join("alice", "secret1").await;
    let mut bob = server.join("bob", "secret2").await;
    bob.drain();

    // The realtime path never touches the credential store.
    server.store.set_unavailable(true);
    server
        .registry
        .broadcast_message(alice.id, "still chatting")
        .expect("broadcast");

    assert_eq!(bob.drain().len(), 1);
}
