//! Durable key-value storage with separate local and synced namespaces.
//!
//! Backends are pluggable:
//! - In-memory (tests, ephemeral runs)
//! - SQLite (persistent, single file in the data directory)

mod memory;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

pub use memory::MemoryKeyValueStore;
pub use sqlite::SqliteKeyValueStore;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors from storage backend operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        StorageError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

/// Storage namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Per-installation state such as viewing history.
    Local,
    /// User settings shared across installations.
    Sync,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Sync => "sync",
        }
    }
}

/// Trait for key-value storage backends.
///
/// Implementations must be thread-safe and handle concurrent access.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `None` if the key was never written.
    async fn get(&self, namespace: Namespace, key: &str) -> StorageResult<Option<Value>>;

    /// Write a value, replacing any previous one.
    async fn set(&self, namespace: Namespace, key: &str, value: Value) -> StorageResult<()>;

    /// Delete a key. Deleting a missing key is not an error.
    async fn remove(&self, namespace: Namespace, key: &str) -> StorageResult<()>;
}

/// Shared handle to a storage backend.
pub type SharedStore = Arc<dyn KeyValueStore>;
