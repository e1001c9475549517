// Life of a request:
// 1. Client POSTs /signup, then /login -> AuthService checks the credential
//    store and returns a signed bearer token.
// 2. Client opens /ws?token=... -> ConnectionAuthorizer verifies the token
//    and binds the connection to an identity before the upgrade completes.
// 3. SessionRegistry admits the connection and fans presence/chat events out
//    to every other live connection; close removes it exactly once.
//
// System components:
//  - Credential store (sled-backed, trait for tests)
//  - Authentication service (argon2 hashing + HS256 tokens)
//  - Connection authorizer (handshake gate)
//  - Broadcast session registry (single shared room)

pub mod auth;
pub mod authorizer;
pub mod config;
pub mod connection;
pub mod error;
pub mod events;
pub mod http;
pub mod registry;
pub mod store;

mod e2e_tests;
#[cfg(test)]
pub(crate) mod testing;

pub use auth::{AuthError, AuthService, TokenSigner};
pub use authorizer::ConnectionAuthorizer;
pub use registry::SessionRegistry;
