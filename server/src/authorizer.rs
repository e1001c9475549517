//! Connection authorizer: the gate between a handshake and the live room.
//!
//! Invoked exactly once per connection attempt, before the WebSocket upgrade
//! completes. A missing, malformed, badly signed, or expired token rejects
//! the connection before any connection-level event fires; a valid token
//! binds the connection to the token's identity.
//!
//! This is a gate, not a per-message check: once admitted, a connection
//! stays trusted for its whole lifetime even if the token expires
//! mid-session.

use std::sync::Arc;

use crate::auth::token::{TokenError, TokenSigner};

/// Why a handshake was rejected.
///
/// Clients receive only an undifferentiated authentication-error signal;
/// the variant detail is for server-side debug logging.
#[derive(Debug)]
pub enum AuthzError {
    /// No token was presented in the handshake.
    MissingToken,
    /// The presented token failed verification.
    InvalidToken(TokenError),
}

impl std::fmt::Display for AuthzError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingToken => write!(f, "no token presented in handshake"),
            Self::InvalidToken(reason) => write!(f, "token rejected: {reason}"),
        }
    }
}

impl std::error::Error for AuthzError {}

/// Verifies handshake tokens and binds connections to identities.
pub struct ConnectionAuthorizer {
    signer: Arc<TokenSigner>,
}

impl ConnectionAuthorizer {
    /// Create an authorizer over the process-wide token signer.
    #[must_use]
    pub fn new(signer: Arc<TokenSigner>) -> Self {
        Self { signer }
    }

    /// Authorize a connection attempt.
    ///
    /// Returns the identity to bind the connection to.
    ///
    /// # Errors
    ///
    /// Returns `AuthzError` if no token was presented or the token fails
    /// signature or expiry verification.
    pub fn authorize(&self, token: Option<&str>) -> Result<String, AuthzError> {
        let token = token.ok_or(AuthzError::MissingToken)?;
        self.signer.verify(token).map_err(AuthzError::InvalidToken)
    }

    /// Authorize against an explicit "now" instant (expiry boundary tests).
    ///
    /// # Errors
    ///
    /// Same as [`ConnectionAuthorizer::authorize`].
    pub fn authorize_at(&self, token: Option<&str>, now: u64) -> Result<String, AuthzError> {
        let token = token.ok_or(AuthzError::MissingToken)?;
        self.signer
            .verify_at(token, now)
            .map_err(AuthzError::InvalidToken)
    }
}
