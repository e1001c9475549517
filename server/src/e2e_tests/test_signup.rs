use super::helpers::TestServer;
use crate::auth::AuthError;

#[tokio::test]
async fn test_signup_succeeds_for_new_identity() {
    let server = TestServer::new();
    assert!(server.auth.register("alice", "secret1").await.is_ok());
}

#[tokio::test]
async fn test_signup_duplicate_identity_rejected() {
    let server = TestServer::new();
    server.register("alice", "secret1").await;

    // Duplicate regardless of password.
    assert_eq!(
        server.auth.register("alice", "secret1").await,
        Err(AuthError::DuplicateIdentity)
    );
    assert_eq!(
        server.auth.register("alice", "completely-different").await,
        Err(AuthError::DuplicateIdentity)
    );
}

#[tokio::test]
async fn test_signup_missing_fields_rejected() {
    let server = TestServer::new();

    assert_eq!(
        server.auth.register("", "secret1").await,
        Err(AuthError::InvalidInput)
    );
    assert_eq!(
        server.auth.register("alice", "").await,
        Err(AuthError::InvalidInput)
    );
}

#[tokio::test]
async fn test_signup_usernames_are_case_sensitive() {
    let server = TestServer::new();
    server.register("Alice", "secret1").await;

    // A different casing is a different identity.
    assert!(server.auth.register("alice", "secret1").await.is_ok());
}
