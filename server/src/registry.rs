//! Broadcast session registry: the set of live, authorized connections.
//!
//! The registry owns every admitted connection for its lifetime and routes
//! events between them: join/leave presence notices and chat-message fan-out,
//! always to every connection *except* the one that produced the event.
//!
//! # Connection lifecycle
//!
//! `Connecting -> Admitted -> Closed` (terminal). Admission happens through
//! the connection authorizer before [`SessionRegistry::admit`] is called;
//! [`SessionRegistry::close`] is irreversible and idempotent, so any
//! combination of client disconnect and task teardown produces exactly one
//! leave notice.
//!
//! # Invariants
//!
//! - A live connection has exactly one bound identity, set at admission and
//!   immutable thereafter. One identity may hold any number of simultaneous
//!   connections.
//! - Each operation locks the live set for the duration of its own fan-out,
//!   so every event observes a consistent "all other connections at that
//!   instant" snapshot, never a half-updated set.
//! - Fan-out sends are non-blocking (unbounded channels); the lock is never
//!   held across an await point.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;

use crate::events::ServerEvent;

/// Opaque identifier for one live connection, unique per channel instance.
pub type ConnectionId = u64;

/// One admitted, currently-open realtime channel.
struct LiveConnection {
    /// Identity bound at admission; immutable for the connection lifetime.
    username: String,
    /// Feeds the connection's write loop.
    sender: mpsc::UnboundedSender<ServerEvent>,
}

/// Error returned when a registry operation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// The live-connection set lock was poisoned by a panicked task.
    LockPoisoned,
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LockPoisoned => write!(f, "live-connection set lock poisoned"),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Registry of live connections for the single shared room.
///
/// Owned by the process lifecycle and passed by handle to all
/// connection-event handlers; never ambient global state.
#[derive(Default)]
pub struct SessionRegistry {
    /// The only shared mutable resource in the core.
    connections: Mutex<HashMap<ConnectionId, LiveConnection>>,
    /// Source of fresh connection identifiers.
    next_id: AtomicU64,
}

impl SessionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit an authorized connection to the live set.
    ///
    /// Emits a join notice to every *other* live connection; the joining
    /// connection does not receive its own notice.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::LockPoisoned` if the live set is unusable.
    #[allow(clippy::significant_drop_tightening)] // Lock must be held for the whole fan-out
    pub fn admit(
        &self,
        username: &str,
        sender: mpsc::UnboundedSender<ServerEvent>,
    ) -> Result<ConnectionId, RegistryError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let mut connections = self
            .connections
            .lock()
            .map_err(|_| RegistryError::LockPoisoned)?;

        let notice = ServerEvent::user_connected(username);
        for peer in connections.values() {
            // A dead receiver means that peer is tearing down; its own task
            // removes it via close().
            let _ = peer.sender.send(notice.clone());
        }

        connections.insert(
            id,
            LiveConnection {
                username: username.to_string(),
                sender,
            },
        );

        tracing::info!("user '{username}' connected (connection {id})");
        Ok(id)
    }

    /// Fan a chat message from `sender_id` out to every other live
    /// connection, tagged with the sender's bound identity and a
    /// server-assigned timestamp.
    ///
    /// The message is never echoed back to the sender. Empty or
    /// whitespace-only text passes through unfiltered. Messages from an
    /// already-closed connection are dropped.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::LockPoisoned` if the live set is unusable.
    #[allow(clippy::significant_drop_tightening)] // Lock must be held for the whole fan-out
    pub fn broadcast_message(
        &self,
        sender_id: ConnectionId,
        text: &str,
    ) -> Result<(), RegistryError> {
        let connections = self
            .connections
            .lock()
            .map_err(|_| RegistryError::LockPoisoned)?;

        let Some(origin) = connections.get(&sender_id) else {
            // Connection raced its own close; nothing to deliver to.
            return Ok(());
        };

        let timestamp = chrono::Local::now().format("%H:%M:%S").to_string();
        let event = ServerEvent::receive_message(&origin.username, text, timestamp);

        for (id, peer) in connections.iter() {
            if *id == sender_id {
                continue;
            }
            let _ = peer.sender.send(event.clone());
        }

        Ok(())
    }

    /// Remove a connection from the live set and notify everyone remaining.
    ///
    /// Idempotent: closing an already-closed connection is a no-op, so the
    /// leave notice is emitted exactly once per connection.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::LockPoisoned` if the live set is unusable.
    #[allow(clippy::significant_drop_tightening)] // Lock must be held for the whole fan-out
    pub fn close(&self, id: ConnectionId) -> Result<(), RegistryError> {
        let mut connections = self
            .connections
            .lock()
            .map_err(|_| RegistryError::LockPoisoned)?;

        let Some(closed) = connections.remove(&id) else {
            return Ok(());
        };

        let notice = ServerEvent::user_disconnected(&closed.username);
        for peer in connections.values() {
            let _ = peer.sender.send(notice.clone());
        }

        tracing::info!("user '{}' disconnected (connection {id})", closed.username);
        Ok(())
    }

    /// Number of currently live connections.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections.lock().map_or(0, |connections| connections.len())
    }
}
