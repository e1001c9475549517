//! Authentication service: signup and login against the credential store.
//!
//! # Failure semantics
//!
//! Store-access failures surface as [`AuthError::Internal`], distinct from
//! authentication failures, so clients can distinguish "try again" from "bad
//! credentials". The detail of a store failure is logged server-side and
//! never sent to the client.

use std::sync::Arc;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::TokenSigner;
use crate::store::{CredentialRecord, CredentialStore, InsertOutcome};

/// Errors produced by [`AuthService`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// Username or secret is empty.
    InvalidInput,
    /// Signup collision: the username is already registered.
    DuplicateIdentity,
    /// Unknown username or wrong secret; deliberately a single
    /// undifferentiated signal so neither case leaks.
    InvalidCredentials,
    /// Store or signing infrastructure failure.
    Internal,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput => write!(f, "username and password are required"),
            Self::DuplicateIdentity => write!(f, "user already exists"),
            Self::InvalidCredentials => write!(f, "invalid username or password"),
            Self::Internal => write!(f, "internal error"),
        }
    }
}

impl std::error::Error for AuthError {}

/// Validates signup/login requests and issues bearer tokens.
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    signer: Arc<TokenSigner>,
}

impl AuthService {
    /// Create an authentication service over a credential store and token
    /// signer.
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>, signer: Arc<TokenSigner>) -> Self {
        Self { store, signer }
    }

    /// Register a new identity.
    ///
    /// The secret is hashed with a fresh random salt before persistence;
    /// plaintext never reaches the store or the logs.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the username or secret is empty
    /// - `DuplicateIdentity` if the username is already registered
    /// - `Internal` on store or hashing failure
    pub async fn register(&self, username: &str, secret: &str) -> Result<(), AuthError> {
        if username.is_empty() || secret.is_empty() {
            return Err(AuthError::InvalidInput);
        }

        let password_hash = hash_password(secret).map_err(|e| {
            tracing::error!("password hashing failed: {e}");
            AuthError::Internal
        })?;

        let record = CredentialRecord {
            username: username.to_string(),
            password_hash,
        };

        let outcome = self.store.insert(record).await.map_err(|e| {
            tracing::error!("credential store insert failed: {e}");
            AuthError::Internal
        })?;

        match outcome {
            InsertOutcome::Inserted => {
                tracing::info!("registered new identity '{username}'");
                Ok(())
            }
            InsertOutcome::AlreadyExists => Err(AuthError::DuplicateIdentity),
        }
    }

    /// Authenticate an identity and issue a bearer token.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the username or secret is empty
    /// - `InvalidCredentials` if the username is unknown or the secret is
    ///   wrong (indistinguishable)
    /// - `Internal` on store or signing failure
    pub async fn authenticate(&self, username: &str, secret: &str) -> Result<String, AuthError> {
        if username.is_empty() || secret.is_empty() {
            return Err(AuthError::InvalidInput);
        }

        let record = self.store.get(username).await.map_err(|e| {
            tracing::error!("credential store lookup failed: {e}");
            AuthError::Internal
        })?;

        let Some(record) = record else {
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(secret, &record.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.signer.issue(username).map_err(|e| {
            tracing::error!("token issuance failed: {e}");
            AuthError::Internal
        })?;

        tracing::debug!("issued token for '{username}'");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::testing::new_test_signer;

    fn service_with_store(store: Arc<MemoryStore>) -> AuthService {
        AuthService::new(store, Arc::new(new_test_signer()))
    }

    fn service() -> AuthService {
        service_with_store(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_register_then_authenticate() {
        let service = service();

        service.register("alice", "secret1").await.expect("register");
        let token = service
            .authenticate("alice", "secret1")
            .await
            .expect("authenticate");
        assert!(!token.is_empty());
    }

    #[tokio::test]
    async fn test_register_empty_fields_rejected() {
        let service = service();

        assert_eq!(
            service.register("", "secret1").await,
            Err(AuthError::InvalidInput)
        );
        assert_eq!(
            service.register("alice", "").await,
            Err(AuthError::InvalidInput)
        );
        assert_eq!(service.register("", "").await, Err(AuthError::InvalidInput));
    }

    #[tokio::test]
    async fn test_register_duplicate_rejected_regardless_of_password() {
        let service = service();
        service.register("alice", "secret1").await.expect("register");

        assert_eq!(
            service.register("alice", "secret1").await,
            Err(AuthError::DuplicateIdentity)
        );
        assert_eq!(
            service.register("alice", "different").await,
            Err(AuthError::DuplicateIdentity)
        );
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_are_indistinguishable() {
        let service = service();
        service.register("alice", "secret1").await.expect("register");

        let wrong_password = service.authenticate("alice", "wrong").await;
        let unknown_user = service.authenticate("mallory", "secret1").await;

        assert_eq!(wrong_password, Err(AuthError::InvalidCredentials));
        assert_eq!(unknown_user, Err(AuthError::InvalidCredentials));
        assert_eq!(wrong_password, unknown_user);
    }

    #[tokio::test]
    async fn test_authenticate_empty_fields_rejected() {
        let service = service();

        assert_eq!(
            service.authenticate("", "secret1").await,
            Err(AuthError::InvalidInput)
        );
        assert_eq!(
            service.authenticate("alice", "").await,
            Err(AuthError::InvalidInput)
        );
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_internal_error() {
        let store = Arc::new(MemoryStore::new());
        let service = service_with_store(Arc::clone(&store));

        store.set_unavailable(true);
        assert_eq!(
            service.register("alice", "secret1").await,
            Err(AuthError::Internal)
        );
        assert_eq!(
            service.authenticate("alice", "secret1").await,
            Err(AuthError::Internal)
        );

        // Internal errors are distinct from credential failures.
        store.set_unavailable(false);
        assert_eq!(
            service.authenticate("alice", "secret1").await,
            Err(AuthError::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn test_token_embeds_registered_identity() {
        let service = service();
        service.register("alice", "secret1").await.expect("register");

        let token = service
            .authenticate("alice", "secret1")
            .await
            .expect("authenticate");

        let subject = new_test_signer().verify(&token).expect("verify");
        assert_eq!(subject, "alice");
    }

    #[tokio::test]
    async fn test_plaintext_secret_is_not_stored() {
        let store = Arc::new(MemoryStore::new());
        let service = service_with_store(Arc::clone(&store));
        service.register("alice", "secret1").await.expect("register");

        let record = store.get("alice").await.expect("get").expect("record");
        assert!(!record.password_hash.contains("secret1"));
    }
}
