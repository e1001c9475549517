//! Common helpers for end-to-end tests.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::auth::AuthService;
use crate::authorizer::{AuthzError, ConnectionAuthorizer};
use crate::events::ServerEvent;
use crate::registry::{ConnectionId, SessionRegistry};
use crate::store::MemoryStore;
use crate::testing::new_test_signer;

/// One process worth of core components wired together over an in-memory
/// credential store, the way `main.rs` wires the production ones.
pub struct TestServer {
    pub auth: AuthService,
    pub authorizer: ConnectionAuthorizer,
    pub registry: Arc<SessionRegistry>,
    /// Kept separately for failure injection.
    pub store: Arc<MemoryStore>,
}

impl TestServer {
    /// Create a fresh server with an empty store and no live connections.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let signer = Arc::new(new_test_signer());
        Self {
            auth: AuthService::new(
                Arc::clone(&store) as Arc<dyn crate::store::CredentialStore>,
                Arc::clone(&signer),
            ),
            authorizer: ConnectionAuthorizer::new(signer),
            registry: Arc::new(SessionRegistry::new()),
            store,
        }
    }

    /// Register an identity, panicking on failure.
    pub async fn register(&self, username: &str, password: &str) {
        self.auth
            .register(username, password)
            .await
            .expect("register should succeed");
    }

    /// Log an identity in and return its bearer token.
    pub async fn login(&self, username: &str, password: &str) -> String {
        self.auth
            .authenticate(username, password)
            .await
            .expect("login should succeed")
    }

    /// Attempt the realtime handshake with an optional token.
    ///
    /// On success the connection is admitted to the registry, exactly like
    /// an upgraded WebSocket.
    pub fn connect(&self, token: Option<&str>) -> Result<TestConnection, AuthzError> {
        let username = self.authorizer.authorize(token)?;
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self
            .registry
            .admit(&username, tx)
            .expect("admit should succeed");
        Ok(TestConnection { id, username, rx })
    }

    /// Register, log in, and connect in one step.
    pub async fn join(&self, username: &str, password: &str) -> TestConnection {
        self.register(username, password).await;
        let token = self.login(username, password).await;
        self.connect(Some(&token)).expect("handshake should succeed")
    }
}

/// A mock live connection: holds the receiving end of the fan-out channel.
pub struct TestConnection {
    pub id: ConnectionId,
    pub username: String,
    rx: mpsc::UnboundedReceiver<ServerEvent>,
}

impl TestConnection {
    /// Pop the next delivered event, if any.
    pub fn try_recv(&mut self) -> Option<ServerEvent> {
        self.rx.try_recv().ok()
    }

    /// Drain all delivered events.
    pub fn drain(&mut self) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.try_recv() {
            events.push(event);
        }
        events
    }
}
