use super::helpers::TestServer;
use crate::auth::AuthError;
use crate::testing::new_test_signer;

#[tokio::test]
async fn test_register_then_login_round_trip() {
    let server = TestServer::new();
    server.register("alice", "secret1").await;

    let token = server.login("alice", "secret1").await;

    // The token's embedded identity equals the username.
    let subject = new_test_signer().verify(&token).expect("verify");
    assert_eq!(subject, "alice");
}

#[tokio::test]
async fn test_wrong_password_and_unknown_user_yield_identical_errors() {
    let server = TestServer::new();
    server.register("alice", "secret1").await;

    let wrong_password = server.auth.authenticate("alice", "wrong").await;
    let unknown_user = server.auth.authenticate("mallory", "whatever").await;

    assert_eq!(wrong_password, Err(AuthError::InvalidCredentials));
    assert_eq!(unknown_user, Err(AuthError::InvalidCredentials));
    // Indistinguishable by design.
    assert_eq!(wrong_password, unknown_user);
}

#[tokio::test]
async fn test_login_missing_fields_rejected() {
    let server = TestServer::new();

    assert_eq!(
        server.auth.authenticate("", "secret1").await,
        Err(AuthError::InvalidInput)
    );
    assert_eq!(
        server.auth.authenticate("alice", "").await,
        Err(AuthError::InvalidInput)
    );
}

#[tokio::test]
async fn test_each_login_issues_a_usable_token() {
    let server = TestServer::new();
    server.register("alice", "secret1").await;

    let first = server.login("alice", "secret1").await;
    let second = server.login("alice", "secret1").await;

    // Concurrent logins are permitted; both tokens authorize handshakes.
    assert!(server.connect(Some(&first)).is_ok());
    assert!(server.connect(Some(&second)).is_ok());
    assert_eq!(server.registry.connection_count(), 2);
}
