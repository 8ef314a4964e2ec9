//! Search term selection.
//!
//! Holds the configured (or built-in) term list and draws one term
//! uniformly at random per request.

mod defaults;

use std::sync::{Arc, RwLock};

pub use defaults::DEFAULT_SEARCH_TERMS;

use crate::config::SearchConfiguration;
use crate::utils::random_index;

/// Provides search terms for acquisition requests.
///
/// Configuration updates replace the whole term list at once; readers see
/// either the old or the new list, never a mix.
#[derive(Debug)]
pub struct SearchTermProvider {
    active: RwLock<Arc<SearchConfiguration>>,
}

impl SearchTermProvider {
    /// Create a provider using the built-in terms.
    pub fn new() -> Self {
        Self {
            active: RwLock::new(Arc::new(Self::defaults())),
        }
    }

    /// Create a provider from a configuration, falling back to defaults if empty.
    pub fn with_config(config: SearchConfiguration) -> Self {
        let provider = Self::new();
        provider.configure(config.terms, config.strict);
        provider
    }

    fn defaults() -> SearchConfiguration {
        SearchConfiguration::new(
            DEFAULT_SEARCH_TERMS.iter().map(|t| t.to_string()).collect(),
            false,
        )
    }

    /// Replace the active term list. An empty list reverts to the built-in
    /// defaults with strict matching off.
    pub fn configure(&self, terms: Vec<String>, strict: bool) {
        let config = SearchConfiguration::new(terms, strict);
        let config = if config.is_empty() {
            Self::defaults()
        } else {
            config
        };

        tracing::debug!(
            "Search terms configured: {} term(s), strict={}",
            config.terms.len(),
            config.strict
        );

        let mut active = self.active.write().unwrap_or_else(|e| e.into_inner());
        *active = Arc::new(config);
    }

    /// Snapshot of the active configuration.
    pub fn current(&self) -> Arc<SearchConfiguration> {
        Arc::clone(&self.active.read().unwrap_or_else(|e| e.into_inner()))
    }

    /// The active term list, for display.
    pub fn terms(&self) -> Vec<String> {
        self.current().terms.clone()
    }

    pub fn is_strict(&self) -> bool {
        self.current().strict
    }

    /// Pick a term uniformly at random.
    pub fn choose(&self) -> String {
        let config = self.current();
        random_index(config.terms.len())
            .and_then(|i| config.terms.get(i).cloned())
            // The active list is never empty; this only guards the type.
            .unwrap_or_else(|| DEFAULT_SEARCH_TERMS[0].to_string())
    }
}

impl Default for SearchTermProvider {
    fn default() -> Self {
        Self::new()
    }
}
