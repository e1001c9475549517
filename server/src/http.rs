//! HTTP surface: signup, login, health, and the WebSocket upgrade.
//!
//! HTTP-layer errors are recovered locally into a status code and a JSON
//! error body; a failed signup, login, or handshake never affects other
//! sessions or the process.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{any, post},
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use crate::auth::AuthService;
use crate::authorizer::ConnectionAuthorizer;
use crate::connection::handle_socket;
use crate::error::ApiError;
use crate::registry::SessionRegistry;

/// Shared application state handed to every handler.
#[derive(Clone)]
#[allow(clippy::disallowed_methods)] // Arc::clone is safe and expected for shared state
pub struct AppState {
    /// Signup/login against the credential store.
    pub auth: Arc<AuthService>,
    /// Handshake gate for the realtime channel.
    pub authorizer: Arc<ConnectionAuthorizer>,
    /// Live connections of the single shared room.
    pub registry: Arc<SessionRegistry>,
}

/// Body of `POST /signup` and `POST /login`.
///
/// Fields default to empty strings so "missing field" and "empty field"
/// collapse into the same `InvalidInput` rejection.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Build the application router (shared between production startup and tests).
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/signup", post(signup_handler))
        .route("/login", post(login_handler))
        .route("/health", axum::routing::get(health_handler))
        .route("/ws", any(ws_handler))
        .layer(cors)
        .with_state(state)
}

/// `POST /signup` — register a new identity.
async fn signup_handler(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.auth.register(&body.username, &body.password).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "message": "User registered successfully" })),
    ))
}

/// `POST /login` — authenticate and issue a bearer token.
async fn login_handler(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let token = state
        .auth
        .authenticate(&body.username, &body.password)
        .await?;

    Ok(Json(serde_json::json!({
        "token": token,
        "message": "Login successful",
    })))
}

/// `GET /health` — liveness plus the current connection count.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "connections": state.registry.connection_count(),
    }))
}

/// Query parameters of the `GET /ws` handshake.
///
/// The bearer token travels out-of-band from the message stream, as part of
/// the upgrade request.
#[derive(Debug, Deserialize)]
struct WsParams {
    token: Option<String>,
}

/// `GET /ws?token=...` — authorize and upgrade a realtime connection.
///
/// Authorization happens before the upgrade completes: a rejected handshake
/// returns 401 and no channel (and no connection-level event) is ever
/// established.
async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    State(state): State<AppState>,
) -> Response {
    let username = match state.authorizer.authorize(params.token.as_deref()) {
        Ok(username) => username,
        Err(e) => {
            tracing::debug!("rejected websocket handshake: {e}");
            return ApiError::AuthenticationError.into_response();
        }
    };

    tracing::debug!("websocket handshake authorized for '{username}'");
    let registry = Arc::clone(&state.registry);
    ws.on_upgrade(move |socket| handle_socket(socket, username, registry))
}
