//! One-way salted password hashing.
//!
//! Secrets are transformed through Argon2 with a fresh random salt before
//! persistence, so a store-level compromise does not recover the original
//! secret. Verification replays the hash computation; plaintext comparison
//! never happens.
//!
//! # Invariants
//!
//! - Hashing the same secret twice produces different PHC strings (random
//!   salt).
//! - A malformed stored hash verifies as `false`, never panics.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Error returned when hashing a secret fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHashError(String);

impl std::fmt::Display for PasswordHashError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to hash password: {}", self.0)
    }
}

impl std::error::Error for PasswordHashError {}

/// Hash a secret with Argon2 and a freshly generated random salt.
///
/// Returns the PHC-format string (`$argon2id$...`) to persist.
///
/// # Errors
///
/// Returns `PasswordHashError` if the hashing primitive fails.
pub fn hash_password(secret: &str) -> Result<String, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordHashError(e.to_string()))
}

/// Verify a secret against a stored PHC-format hash.
///
/// Returns `false` for wrong secrets and for hashes that cannot be parsed.
#[must_use]
pub fn verify_password(secret: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify_round_trip() {
        let hash = hash_password("secret1").expect("hash");
        assert!(verify_password("secret1", &hash));
    }

    #[test]
    fn test_wrong_secret_fails_verification() {
        let hash = hash_password("secret1").expect("hash");
        assert!(!verify_password("secret2", &hash));
    }

    #[test]
    fn test_hash_is_not_plaintext() {
        let hash = hash_password("hunter2").expect("hash");
        assert!(!hash.contains("hunter2"));
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn test_same_secret_hashes_differently() {
        // Random salts: two hashes of the same secret must differ.
        let first = hash_password("secret1").expect("hash");
        let second = hash_password("secret1").expect("hash");
        assert_ne!(first, second);

        // Both still verify.
        assert!(verify_password("secret1", &first));
        assert!(verify_password("secret1", &second));
    }

    #[test]
    fn test_malformed_stored_hash_verifies_false() {
        assert!(!verify_password("secret1", "not-a-phc-string"));
        assert!(!verify_password("secret1", ""));
    }

    #[test]
    fn test_empty_secret_still_hashes() {
        // Input validation happens in the service layer; the primitive
        // itself accepts any byte string.
        let hash = hash_password("").expect("hash");
        assert!(verify_password("", &hash));
        assert!(!verify_password("x", &hash));
    }
}
