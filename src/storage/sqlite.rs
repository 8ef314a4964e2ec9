//! SQLite key-value store.
//!
//! One table keyed by `(namespace, key)` holding JSON text. Blocking
//! rusqlite calls run on the blocking thread pool.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use super::{KeyValueStore, Namespace, StorageError, StorageResult};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv_store (
    namespace TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (namespace, key)
)";

/// SQLite-backed key-value store.
#[derive(Clone)]
pub struct SqliteKeyValueStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteKeyValueStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path).map_err(|e| {
            StorageError::Unavailable(format!("{}: {}", path.display(), e))
        })?;
        Self::init(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StorageResult<Self> {
        conn.execute(SCHEMA, [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> StorageResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StorageError::Unavailable("connection lock poisoned".to_string()))?;
            f(&guard)
        })
        .await
        .map_err(|e| StorageError::Unavailable(e.to_string()))?
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, namespace: Namespace, key: &str) -> StorageResult<Option<Value>> {
        let key = key.to_string();
        let text: Option<String> = self
            .with_conn(move |conn| {
                Ok(conn
                    .query_row(
                        "SELECT value FROM kv_store WHERE namespace = ?1 AND key = ?2",
                        params![namespace.as_str(), key],
                        |row| row.get(0),
                    )
                    .optional()?)
            })
            .await?;

        match text {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, namespace: Namespace, key: &str, value: Value) -> StorageResult<()> {
        let key = key.to_string();
        let text = serde_json::to_string(&value)?;
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO kv_store (namespace, key, value, updated_at) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(namespace, key) DO UPDATE SET value = excluded.value,
                 updated_at = excluded.updated_at",
                params![namespace.as_str(), key, text, Utc::now().to_rfc3339()],
            )?;
            Ok(())
        })
        .await
    }

    async fn remove(&self, namespace: Namespace, key: &str) -> StorageResult<()> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "DELETE FROM kv_store WHERE namespace = ?1 AND key = ?2",
                params![namespace.as_str(), key],
            )?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_set_get_overwrite() {
        let store = SqliteKeyValueStore::open_in_memory().unwrap();
        store
            .set(Namespace::Local, "objectHistory", json!([{"id": "O1"}]))
            .await
            .unwrap();
        store
            .set(Namespace::Local, "objectHistory", json!([{"id": "O2"}]))
            .await
            .unwrap();

        let value = store.get(Namespace::Local, "objectHistory").await.unwrap();
        assert_eq!(value, Some(json!([{"id": "O2"}])));
        assert!(store.get(Namespace::Sync, "objectHistory").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("curio.db");

        {
            let store = SqliteKeyValueStore::open(&path).unwrap();
            store
                .set(Namespace::Sync, "strictSearch", json!("strict"))
                .await
                .unwrap();
        }

        let store = SqliteKeyValueStore::open(&path).unwrap();
        assert_eq!(
            store.get(Namespace::Sync, "strictSearch").await.unwrap(),
            Some(json!("strict"))
        );

        store.remove(Namespace::Sync, "strictSearch").await.unwrap();
        assert!(store.get(Namespace::Sync, "strictSearch").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_open_in_missing_directory_is_unavailable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no/such/dir/curio.db");
        assert!(matches!(
            SqliteKeyValueStore::open(&path),
            Err(StorageError::Unavailable(_))
        ));
    }
}
