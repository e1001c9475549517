//! Authentication module.
//!
//! Validates signup and login requests against the credential store and
//! issues signed, time-limited bearer tokens on success.
//!
//! # Invariants
//!
//! - Plaintext secrets never leave this module: they are hashed before
//!   persistence and never logged.
//! - "Unknown username" and "wrong password" are indistinguishable to
//!   callers.

pub mod password;
pub mod service;
pub mod token;

pub use service::{AuthError, AuthService};
pub use token::{Claims, TOKEN_TTL_SECS, TokenError, TokenSigner};
