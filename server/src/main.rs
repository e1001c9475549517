#![cfg_attr(test, allow(clippy::disallowed_methods))]
// Forbid unwrap() in production code to prevent panics from bad input.
// Test code is allowed to use unwrap() for convenience.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
use std::net::SocketAddr;
use std::sync::Arc;

use chat_server::auth::{AuthService, TokenSigner};
use chat_server::authorizer::ConnectionAuthorizer;
use chat_server::config::ServerConfig;
use chat_server::http::{AppState, build_app};
use chat_server::registry::SessionRegistry;
use chat_server::store::SledStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment variables
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Loaded configuration: data_directory={}, listen_port={}",
        config.data_directory.display(),
        config.listen_port
    );

    // Create the data directory for the credential store.
    if let Err(e) = std::fs::create_dir_all(&config.data_directory) {
        tracing::error!("Failed to create data directory: {e}");
        std::process::exit(1);
    }

    // Open the credential store.
    let store = match SledStore::open(&config.data_directory) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!("Failed to open credential store: {e}");
            std::process::exit(1);
        }
    };

    // Create the token signer from the process-wide secret.
    let signer = match TokenSigner::new(config.secret_key.as_bytes()) {
        Ok(signer) => Arc::new(signer),
        Err(e) => {
            tracing::error!("Failed to create token signer: {e}");
            std::process::exit(1);
        }
    };

    #[allow(clippy::disallowed_methods)] // Arc::clone is safe and expected for shared state
    let state = AppState {
        auth: Arc::new(AuthService::new(store, Arc::clone(&signer))),
        authorizer: Arc::new(ConnectionAuthorizer::new(signer)),
        registry: Arc::new(SessionRegistry::new()),
    };

    let app = build_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.listen_port));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind: {e}");
            std::process::exit(1);
        });

    axum::serve(listener, app).await.unwrap_or_else(|e| {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    });
}
