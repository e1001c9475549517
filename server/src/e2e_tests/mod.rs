//! End-to-end tests at the auth/handshake/broadcast level.
//!
//! Each test file covers a specific scenario, driving the authentication
//! service, connection authorizer, and session registry directly with mock
//! connections to verify the complete flow.

#![cfg(test)]

mod helpers;

mod test_broadcast;
mod test_handshake;
mod test_login;
mod test_presence;
mod test_scenario;
mod test_signup;
mod test_store_failure;
