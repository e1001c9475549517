//! Client-facing error taxonomy.
//!
//! Every failure that can reach a client is collapsed into one of the
//! variants below before leaving the process. Internal detail (store
//! failures, token parse errors) is logged server-side and never included in
//! a response body.
//!
//! # Invariants
//!
//! - `InvalidCredentials` is a single undifferentiated signal: "unknown
//!   username" and "wrong password" are indistinguishable to callers.
//! - `Internal` never carries store detail to the client.

use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};

use crate::auth::AuthError;

/// Errors surfaced to HTTP and WebSocket clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    /// A required field (username or password) is missing or empty.
    InvalidInput,
    /// Signup collision: the username is already registered.
    DuplicateIdentity,
    /// Login failure: identity and secret do not match.
    InvalidCredentials,
    /// Realtime handshake token is missing, invalid, or expired.
    AuthenticationError,
    /// Store or infrastructure failure; the client may retry.
    Internal,
}

impl ApiError {
    /// HTTP status code for this error.
    #[must_use]
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::InvalidInput => StatusCode::BAD_REQUEST,
            Self::DuplicateIdentity => StatusCode::CONFLICT,
            Self::InvalidCredentials | Self::AuthenticationError => StatusCode::UNAUTHORIZED,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput => write!(f, "Username and password are required"),
            Self::DuplicateIdentity => write!(f, "User already exists"),
            Self::InvalidCredentials => write!(f, "Invalid username or password"),
            Self::AuthenticationError => write!(f, "Authentication error"),
            Self::Internal => write!(f, "Internal server error"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidInput => Self::InvalidInput,
            AuthError::DuplicateIdentity => Self::DuplicateIdentity,
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::Internal => Self::Internal,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (self.status_code(), body).into_response()
    }
}
