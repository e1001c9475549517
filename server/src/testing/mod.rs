//! Shared constructors for unit tests.

use crate::auth::TokenSigner;

/// Process-wide signing secret used across test modules, so tokens issued
/// in one module verify in another.
pub const TEST_SECRET: &[u8] = b"chat-server-test-secret-key";

/// Create a token signer over the shared test secret.
pub fn new_test_signer() -> TokenSigner {
    TokenSigner::new(TEST_SECRET).expect("test secret is non-empty")
}
