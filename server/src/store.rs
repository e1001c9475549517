//! Credential store: durable mapping from identity to a salted password hash.
//!
//! The store is a pure data-access abstraction. Everything above it talks to
//! the [`CredentialStore`] trait; the production implementation is a sled
//! key-value tree keyed by username, and tests use an in-memory map with
//! failure injection.
//!
//! # Invariants
//!
//! - One credential record per username; records are immutable once written
//!   (no password-change or account-deletion path).
//! - Insertion is atomic check-and-set, so two concurrent signups for the
//!   same username cannot both succeed.
//! - Plaintext secrets never reach this module; callers store only the
//!   salted hash.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// One identity's stored credentials.
///
/// `password_hash` is a PHC-format Argon2 string produced by
/// [`crate::auth::password::hash_password`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Unique, case-sensitive username. The sole stable account key.
    pub username: String,
    /// Salted one-way hash of the secret.
    pub password_hash: String,
}

/// Result of an insert attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The record was written; the username was previously unknown.
    Inserted,
    /// A record for this username already exists; nothing was written.
    AlreadyExists,
}

/// Errors surfaced by the credential store.
///
/// All variants are undifferentiated "infrastructure failure" to clients;
/// the distinctions exist for server-side logging only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// An underlying I/O or database error.
    Io(String),
    /// A stored record could not be decoded.
    Corrupt(String),
    /// The store is unreachable.
    Unavailable,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(message) => write!(f, "store I/O error: {message}"),
            Self::Corrupt(message) => write!(f, "corrupt credential record: {message}"),
            Self::Unavailable => write!(f, "credential store unavailable"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sled::Error> for StoreError {
    fn from(error: sled::Error) -> Self {
        Self::Io(error.to_string())
    }
}

/// Data-access interface to the credential store.
///
/// Accessed via async round-trips: a slow lookup suspends the calling
/// operation but never blocks message fan-out for connected clients.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up the credential record for a username.
    async fn get(&self, username: &str) -> Result<Option<CredentialRecord>, StoreError>;

    /// Insert a new credential record if and only if the username is free.
    async fn insert(&self, record: CredentialRecord) -> Result<InsertOutcome, StoreError>;
}

/// Production credential store backed by a sled database.
///
/// Records are stored as JSON values keyed by the raw username bytes.
/// Uniqueness is enforced with `compare_and_swap` against an absent key.
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    /// Open (or create) the credential database under `data_directory`.
    ///
    /// # Errors
    ///
    /// Returns an error if the sled database cannot be opened.
    pub fn open(data_directory: &Path) -> Result<Self, StoreError> {
        let db = sled::open(data_directory.join("credentials"))?;
        Ok(Self { db })
    }
}

#[async_trait]
impl CredentialStore for SledStore {
    async fn get(&self, username: &str) -> Result<Option<CredentialRecord>, StoreError> {
        match self.db.get(username.as_bytes())? {
            Some(bytes) => {
                let record = serde_json::from_slice(&bytes)
                    .map_err(|e| StoreError::Corrupt(e.to_string()))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn insert(&self, record: CredentialRecord) -> Result<InsertOutcome, StoreError> {
        let value =
            serde_json::to_vec(&record).map_err(|e| StoreError::Corrupt(e.to_string()))?;

        // Atomic insert-if-absent: the swap only succeeds when no record
        // exists for this username.
        let swapped = self.db.compare_and_swap(
            record.username.as_bytes(),
            None as Option<&[u8]>,
            Some(value),
        )?;

        match swapped {
            Ok(()) => {
                self.db.flush_async().await?;
                Ok(InsertOutcome::Inserted)
            }
            Err(_) => Ok(InsertOutcome::AlreadyExists),
        }
    }
}

/// In-memory credential store for tests and local development.
///
/// Supports failure injection via [`MemoryStore::set_unavailable`] so the
/// internal-error paths of the authentication service are testable.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, CredentialRecord>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle failure injection. While set, every operation returns
    /// [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get(&self, username: &str) -> Result<Option<CredentialRecord>, StoreError> {
        self.check_available()?;
        Ok(self.records.read().await.get(username).cloned())
    }

    async fn insert(&self, record: CredentialRecord) -> Result<InsertOutcome, StoreError> {
        self.check_available()?;
        let mut records = self.records.write().await;
        if records.contains_key(&record.username) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        records.insert(record.username.clone(), record);
        Ok(InsertOutcome::Inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(username: &str) -> CredentialRecord {
        CredentialRecord {
            username: username.to_string(),
            password_hash: format!("$argon2id$fake-hash-for-{username}"),
        }
    }

    #[tokio::test]
    async fn test_memory_insert_then_get() {
        let store = MemoryStore::new();

        let outcome = store.insert(record("alice")).await.expect("insert");
        assert_eq!(outcome, InsertOutcome::Inserted);

        let found = store.get("alice").await.expect("get");
        assert_eq!(found, Some(record("alice")));
    }

    #[tokio::test]
    async fn test_memory_get_unknown_returns_none() {
        let store = MemoryStore::new();
        let found = store.get("nobody").await.expect("get");
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn test_memory_duplicate_insert_rejected() {
        let store = MemoryStore::new();
        store.insert(record("alice")).await.expect("first insert");

        let outcome = store.insert(record("alice")).await.expect("second insert");
        assert_eq!(outcome, InsertOutcome::AlreadyExists);
    }

    #[tokio::test]
    async fn test_memory_duplicate_insert_keeps_original_record() {
        let store = MemoryStore::new();
        store.insert(record("alice")).await.expect("first insert");

        let replacement = CredentialRecord {
            username: "alice".to_string(),
            password_hash: "$argon2id$other-hash".to_string(),
        };
        store.insert(replacement).await.expect("second insert");

        let found = store.get("alice").await.expect("get");
        assert_eq!(found, Some(record("alice")));
    }

    #[tokio::test]
    async fn test_memory_unavailable_fails_all_operations() {
        let store = MemoryStore::new();
        store.set_unavailable(true);

        assert_eq!(store.get("alice").await, Err(StoreError::Unavailable));
        assert_eq!(
            store.insert(record("alice")).await,
            Err(StoreError::Unavailable)
        );

        // Recovery: operations succeed again once the store is back.
        store.set_unavailable(false);
        assert_eq!(
            store.insert(record("alice")).await,
            Ok(InsertOutcome::Inserted)
        );
    }

    #[tokio::test]
    async fn test_memory_usernames_are_case_sensitive() {
        let store = MemoryStore::new();
        store.insert(record("Alice")).await.expect("insert");

        assert_eq!(store.get("alice").await.expect("get"), None);
        assert_eq!(
            store.insert(record("alice")).await.expect("insert"),
            InsertOutcome::Inserted
        );
    }

    #[tokio::test]
    async fn test_sled_insert_then_get() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = SledStore::open(temp_dir.path()).expect("open store");

        let outcome = store.insert(record("alice")).await.expect("insert");
        assert_eq!(outcome, InsertOutcome::Inserted);

        let found = store.get("alice").await.expect("get");
        assert_eq!(found, Some(record("alice")));
    }

    #[tokio::test]
    async fn test_sled_duplicate_insert_rejected() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = SledStore::open(temp_dir.path()).expect("open store");

        store.insert(record("alice")).await.expect("first insert");
        let outcome = store.insert(record("alice")).await.expect("second insert");
        assert_eq!(outcome, InsertOutcome::AlreadyExists);
    }

    #[tokio::test]
    async fn test_sled_records_survive_reopen() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

        {
            let store = SledStore::open(temp_dir.path()).expect("open store");
            store.insert(record("alice")).await.expect("insert");
        }

        let store = SledStore::open(temp_dir.path()).expect("reopen store");
        let found = store.get("alice").await.expect("get");
        assert_eq!(found, Some(record("alice")));
    }
}
