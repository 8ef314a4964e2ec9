//! In-memory key-value store.
//!
//! State is not persisted across restarts.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{KeyValueStore, Namespace, StorageResult};

/// In-memory key-value store.
#[derive(Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: Arc<RwLock<HashMap<(Namespace, String), Value>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys across both namespaces.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, namespace: Namespace, key: &str) -> StorageResult<Option<Value>> {
        let entries = self.entries.read().await;
        Ok(entries.get(&(namespace, key.to_string())).cloned())
    }

    async fn set(&self, namespace: Namespace, key: &str, value: Value) -> StorageResult<()> {
        let mut entries = self.entries.write().await;
        entries.insert((namespace, key.to_string()), value);
        Ok(())
    }

    async fn remove(&self, namespace: Namespace, key: &str) -> StorageResult<()> {
        let mut entries = self.entries.write().await;
        entries.remove(&(namespace, key.to_string()));
        Ok(())
    }
}
