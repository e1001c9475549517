//! Bearer token issuance and verification.
//!
//! Tokens are HS256 JSON Web Tokens signed with a process-wide secret. The
//! payload carries the identity (`sub`), issuance time (`iat`), and expiry
//! (`exp`, 24 hours after issuance). Tokens are stateless: nothing is stored
//! server-side and there is no revocation list; expiry is checked lazily at
//! verification time only.
//!
//! # Pre-conditions
//! - The signing secret must be non-empty.
//!
//! # Post-conditions
//! - On success, verification returns the identity from the `sub` claim.
//! - On failure, returns an error indicating what went wrong.
//!
//! # Invariants
//! - Verification is stateless and does not modify any external state.
//! - A token is accepted strictly before its expiry instant and rejected
//!   from that instant on (zero leeway).

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    get_current_timestamp,
};
use serde::{Deserialize, Serialize};

/// Token lifetime: 24 hours from issuance.
pub const TOKEN_TTL_SECS: u64 = 24 * 60 * 60;

/// Claims embedded in a bearer token.
///
/// The 'sub' (subject) claim is required and contains the identity.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject claim containing the identity (username).
    pub sub: String,
    /// Issuance time, seconds since the Unix epoch.
    pub iat: u64,
    /// Expiry time, seconds since the Unix epoch.
    pub exp: u64,
}

/// Error returned when token issuance or verification fails.
#[derive(Debug)]
pub enum TokenError {
    /// The token signature is invalid.
    InvalidSignature,
    /// The token has expired.
    TokenExpired,
    /// The token is malformed or cannot be parsed.
    MalformedToken,
    /// The 'sub' claim is missing or empty.
    MissingSubject,
    /// The signing key could not be created from the provided secret.
    InvalidKey(String),
    /// Signing the claims failed.
    SigningFailed(String),
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSignature => write!(f, "invalid token signature"),
            Self::TokenExpired => write!(f, "token has expired"),
            Self::MalformedToken => write!(f, "malformed token"),
            Self::MissingSubject => write!(f, "missing 'sub' claim in token"),
            Self::InvalidKey(reason) => write!(f, "invalid key: {reason}"),
            Self::SigningFailed(reason) => write!(f, "failed to sign token: {reason}"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Signs and verifies bearer tokens with a process-wide HS256 secret.
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenSigner {
    /// Create a signer from the process-wide secret.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::InvalidKey` if the secret is empty.
    pub fn new(secret: &[u8]) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::InvalidKey("secret must be non-empty".to_string()));
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        })
    }

    /// Issue a token for `username`, expiring 24 hours from now.
    ///
    /// # Errors
    ///
    /// Returns `TokenError` if the subject is empty or signing fails.
    pub fn issue(&self, username: &str) -> Result<String, TokenError> {
        self.issue_at(username, get_current_timestamp())
    }

    /// Issue a token as of an explicit issuance instant.
    ///
    /// Split out from [`TokenSigner::issue`] so expiry behavior is testable
    /// without waiting for wall-clock time to pass.
    ///
    /// # Errors
    ///
    /// Returns `TokenError` if the subject is empty or signing fails.
    pub fn issue_at(&self, username: &str, now: u64) -> Result<String, TokenError> {
        if username.is_empty() {
            return Err(TokenError::MissingSubject);
        }
        let claims = Claims {
            sub: username.to_string(),
            iat: now,
            exp: now + TOKEN_TTL_SECS,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::SigningFailed(e.to_string()))
    }

    /// Verify a token and extract the identity from the 'sub' claim.
    ///
    /// # Errors
    ///
    /// Returns `TokenError` if the signature, shape, or expiry check fails.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        self.verify_at(token, get_current_timestamp())
    }

    /// Verify a token against an explicit "now" instant.
    ///
    /// Expiry is checked with zero leeway: a token whose `exp` equals `now`
    /// is already expired.
    ///
    /// # Errors
    ///
    /// Returns `TokenError` if the signature, shape, or expiry check fails.
    pub fn verify_at(&self, token: &str, now: u64) -> Result<String, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is validated manually below against the caller's clock.
        validation.validate_exp = false;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(map_jwt_error)?;

        let claims = token_data.claims;
        if claims.exp <= now {
            return Err(TokenError::TokenExpired);
        }
        if claims.sub.is_empty() {
            return Err(TokenError::MissingSubject);
        }

        Ok(claims.sub)
    }
}

/// Maps jsonwebtoken errors to our `TokenError` type.
fn map_jwt_error(error: jsonwebtoken::errors::Error) -> TokenError {
    use jsonwebtoken::errors::ErrorKind;

    match error.kind() {
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::TokenExpired,
        ErrorKind::MissingRequiredClaim(_) => TokenError::MissingSubject,
        _ => TokenError::MalformedToken,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-key-that-is-long-enough";

    fn signer() -> TokenSigner {
        TokenSigner::new(SECRET).expect("valid secret")
    }

    #[test]
    fn test_issue_then_verify_round_trip() {
        let signer = signer();
        let token = signer.issue("alice").expect("issue");

        let subject = signer.verify(&token).expect("verify");
        assert_eq!(subject, "alice");
    }

    #[test]
    fn test_verify_with_wrong_secret_fails() {
        let token = signer().issue("alice").expect("issue");

        let other = TokenSigner::new(b"wrong-secret-key-that-is-different").expect("valid secret");
        let result = other.verify(&token);
        assert!(matches!(result, Err(TokenError::InvalidSignature)));
    }

    #[test]
    fn test_verify_malformed_token() {
        let result = signer().verify("not-a-valid-token");
        assert!(matches!(result, Err(TokenError::MalformedToken)));
    }

    #[test]
    fn test_verify_empty_token() {
        let result = signer().verify("");
        assert!(matches!(result, Err(TokenError::MalformedToken)));
    }

    #[test]
    fn test_single_byte_mutation_invalidates_token() {
        let signer = signer();
        let token = signer.issue("alice").expect("issue");

        // Flip one byte in the signature segment.
        let mut bytes = token.into_bytes();
        let last = bytes.len() - 1;
        bytes[last] = if bytes[last] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).expect("ascii token");

        assert!(signer.verify(&tampered).is_err());
    }

    #[test]
    fn test_token_accepted_until_expiry_instant() {
        let signer = signer();
        let issued_at = 1_000_000;
        let token = signer.issue_at("alice", issued_at).expect("issue");

        // One second before expiry: still valid.
        let just_before = issued_at + TOKEN_TTL_SECS - 1;
        assert_eq!(
            signer.verify_at(&token, just_before).expect("verify"),
            "alice"
        );

        // At the expiry instant: rejected.
        let at_expiry = issued_at + TOKEN_TTL_SECS;
        assert!(matches!(
            signer.verify_at(&token, at_expiry),
            Err(TokenError::TokenExpired)
        ));

        // After expiry: still rejected.
        assert!(matches!(
            signer.verify_at(&token, at_expiry + 1),
            Err(TokenError::TokenExpired)
        ));
    }

    #[test]
    fn test_expiry_is_24_hours_from_issuance() {
        assert_eq!(TOKEN_TTL_SECS, 86_400);
    }

    #[test]
    fn test_issue_empty_subject_rejected() {
        let result = signer().issue("");
        assert!(matches!(result, Err(TokenError::MissingSubject)));
    }

    #[test]
    fn test_new_with_empty_secret() {
        let result = TokenSigner::new(b"");
        match result {
            Err(TokenError::InvalidKey(message)) => {
                assert_eq!(message, "secret must be non-empty");
            }
            _ => panic!("expected InvalidKey error"),
        }
    }

    #[test]
    fn test_tokens_for_different_users() {
        let signer = signer();

        let token1 = signer.issue("alice").expect("issue");
        let token2 = signer.issue("bob").expect("issue");

        assert_eq!(signer.verify(&token1).expect("alice token"), "alice");
        assert_eq!(signer.verify(&token2).expect("bob token"), "bob");
    }

    #[test]
    fn test_token_error_display() {
        assert_eq!(
            TokenError::InvalidSignature.to_string(),
            "invalid token signature"
        );
        assert_eq!(TokenError::TokenExpired.to_string(), "token has expired");
        assert_eq!(TokenError::MalformedToken.to_string(), "malformed token");
        assert_eq!(
            TokenError::MissingSubject.to_string(),
            "missing 'sub' claim in token"
        );
        assert_eq!(
            TokenError::InvalidKey("bad key".to_string()).to_string(),
            "invalid key: bad key"
        );
    }
}
