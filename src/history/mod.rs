//! Bounded, deduplicated viewing history.
//!
//! The in-memory list is authoritative for the session. Every mutation is
//! written through to the key-value store on a best-effort basis once the
//! persisted history has been loaded.

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::models::{HistoryEntry, ObjectRecord};
use crate::storage::{Namespace, SharedStore};

/// Storage key for the persisted history array.
pub const HISTORY_KEY: &str = "objectHistory";

/// Entries kept when no limit is configured.
pub const DEFAULT_MAX_ITEMS: usize = 10;

#[derive(Debug, Default)]
struct HistoryState {
    entries: Vec<HistoryEntry>,
    /// Set once the persisted list has been merged in. Until then writes
    /// stay in memory so they cannot clobber the stored array.
    hydrated: bool,
}

/// Most-recent-first list of viewed objects, unique by id.
pub struct HistoryStore {
    state: RwLock<HistoryState>,
    max_items: usize,
    store: Option<SharedStore>,
}

impl HistoryStore {
    /// Create an empty store. Without a backing store it works in memory only.
    pub fn new(max_items: usize, store: Option<SharedStore>) -> Self {
        Self {
            state: RwLock::new(HistoryState {
                entries: Vec::new(),
                hydrated: store.is_none(),
            }),
            max_items,
            store,
        }
    }

    pub fn in_memory(max_items: usize) -> Self {
        Self::new(max_items, None)
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    pub fn is_persistent(&self) -> bool {
        self.store.is_some()
    }

    /// Whether the persisted list has been merged into memory.
    pub async fn is_hydrated(&self) -> bool {
        self.state.read().await.hydrated
    }

    /// Record a view of `record`, moving it to the front if already present.
    pub async fn add_entry(&self, record: &ObjectRecord) {
        self.add_entry_if(record, || true).await;
    }

    /// Like [`add_entry`](Self::add_entry), but `still_wanted` is checked
    /// after the history lock is taken and the entry is dropped if it
    /// returns false. Returns whether the entry was recorded.
    pub async fn add_entry_if<F>(&self, record: &ObjectRecord, still_wanted: F) -> bool
    where
        F: FnOnce() -> bool,
    {
        if record.id.is_empty() {
            debug!("Not recording object without an id");
            return false;
        }

        let entry = HistoryEntry::from_record(record, chrono::Utc::now());
        let mut state = self.state.write().await;
        if !still_wanted() {
            debug!("Dropping history entry for {}", entry.id);
            return false;
        }

        state.entries.retain(|e| e.id != entry.id);
        state.entries.insert(0, entry);
        state.entries.truncate(self.max_items);

        // Written under the lock so saves land in mutation order
        if state.hydrated {
            self.persist(&state.entries).await;
        }
        true
    }

    /// Merge the persisted list into memory.
    ///
    /// Entries added before the load stay in front of the persisted ones.
    /// Legacy field names are mapped and unreadable entries skipped. When
    /// storage fails the current list is kept and the store stays
    /// unhydrated, so a later load can retry. Returns the number of entries
    /// now held.
    pub async fn load(&self) -> usize {
        let Some(ref store) = self.store else {
            debug!("No history storage; keeping in-memory history");
            return self.state.read().await.entries.len();
        };

        let mut state = self.state.write().await;
        let loaded = match store.get(Namespace::Local, HISTORY_KEY).await {
            Ok(Some(Value::Array(items))) => {
                let total = items.len();
                let parsed: Vec<HistoryEntry> = items
                    .iter()
                    .filter_map(HistoryEntry::from_persisted)
                    .collect();
                if parsed.len() < total {
                    warn!(
                        "Skipped {} unreadable history entr(ies)",
                        total - parsed.len()
                    );
                }
                parsed
            }
            Ok(Some(other)) => {
                warn!("Ignoring persisted history of unexpected shape: {}", other);
                Vec::new()
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("History storage unavailable: {}", e);
                return state.entries.len();
            }
        };

        let pending = state.entries.len();
        let mut merged: Vec<HistoryEntry> = Vec::with_capacity(pending + loaded.len());
        for entry in state.entries.drain(..).chain(loaded) {
            if !merged.iter().any(|e| e.id == entry.id) {
                merged.push(entry);
            }
        }
        merged.truncate(self.max_items);

        state.entries = merged;
        state.hydrated = true;
        if pending > 0 {
            self.persist(&state.entries).await;
        }
        debug!("Loaded {} history entries", state.entries.len());
        state.entries.len()
    }

    /// Copy of the current entries, most recent first.
    pub async fn list(&self) -> Vec<HistoryEntry> {
        self.state.read().await.entries.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.entries.is_empty()
    }

    /// Remove every entry and persist the empty list.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.entries.clear();
        state.hydrated = true;
        self.persist(&state.entries).await;
    }

    async fn persist(&self, entries: &[HistoryEntry]) {
        let Some(ref store) = self.store else {
            return;
        };

        let value = match serde_json::to_value(entries) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to serialize history: {}", e);
                return;
            }
        };

        if let Err(e) = store.set(Namespace::Local, HISTORY_KEY, value).await {
            warn!("Failed to persist history: {}", e);
        }
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::in_memory(DEFAULT_MAX_ITEMS)
    }
}
