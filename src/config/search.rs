//! Search configuration and its synced-settings encoding.
//!
//! The settings form writes two keys into the sync namespace:
//! `userSearchTerms` (comma-joined, spaces encoded as `+`) and
//! `strictSearch` (`"strict"` or `"fuzzy"`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::storage::{KeyValueStore, Namespace, StorageResult};

/// Sync-namespace key holding the encoded term list.
pub const USER_SEARCH_TERMS_KEY: &str = "userSearchTerms";
/// Sync-namespace key holding the strict/fuzzy flag.
pub const STRICT_SEARCH_KEY: &str = "strictSearch";

const STRICT: &str = "strict";
const FUZZY: &str = "fuzzy";

/// Active search terms and matching mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfiguration {
    pub terms: Vec<String>,
    /// Match the term against the object-name field instead of free text.
    pub strict: bool,
}

impl SearchConfiguration {
    pub fn new(terms: Vec<String>, strict: bool) -> Self {
        let terms = terms
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        Self { terms, strict }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Decode a `userSearchTerms` value.
    pub fn decode_terms(encoded: &str) -> Vec<String> {
        encoded
            .split(',')
            .map(|t| t.replace('+', " ").trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// Encode terms for `userSearchTerms`.
    pub fn encode_terms(terms: &[String]) -> String {
        terms
            .iter()
            .map(|t| t.trim().replace(' ', "+"))
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Build from the two synced values. Returns `None` when no terms are set.
    pub fn from_synced(terms: Option<&str>, strict: Option<&str>) -> Option<Self> {
        let terms = Self::decode_terms(terms?);
        if terms.is_empty() {
            return None;
        }
        Some(Self {
            terms,
            strict: strict.is_some_and(|s| s.eq_ignore_ascii_case(STRICT)),
        })
    }

    /// Value written to `strictSearch`.
    pub fn strict_value(&self) -> &'static str {
        if self.strict {
            STRICT
        } else {
            FUZZY
        }
    }

    /// Read the synced search settings, if any.
    pub async fn load_synced(store: &dyn KeyValueStore) -> StorageResult<Option<Self>> {
        let terms = store.get(Namespace::Sync, USER_SEARCH_TERMS_KEY).await?;
        let strict = store.get(Namespace::Sync, STRICT_SEARCH_KEY).await?;
        Ok(Self::from_synced(
            terms.as_ref().and_then(Value::as_str),
            strict.as_ref().and_then(Value::as_str),
        ))
    }

    /// Write these settings to the sync namespace.
    pub async fn save_synced(&self, store: &dyn KeyValueStore) -> StorageResult<()> {
        store
            .set(
                Namespace::Sync,
                USER_SEARCH_TERMS_KEY,
                Value::String(Self::encode_terms(&self.terms)),
            )
            .await?;
        store
            .set(
                Namespace::Sync,
                STRICT_SEARCH_KEY,
                Value::String(self.strict_value().to_string()),
            )
            .await
    }

    /// Remove synced settings so the config file or built-in list applies.
    pub async fn clear_synced(store: &dyn KeyValueStore) -> StorageResult<()> {
        store.remove(Namespace::Sync, USER_SEARCH_TERMS_KEY).await?;
        store.remove(Namespace::Sync, STRICT_SEARCH_KEY).await
    }
}
