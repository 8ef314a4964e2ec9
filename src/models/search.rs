//! Normalized search requests and raw search responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Backend-neutral parameter set handed to a request proxy.
///
/// `search_term` and `strict_item` are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    pub search_term: Option<String>,
    pub strict_item: Option<String>,
    pub id_filter: Option<String>,
    /// One-based page number.
    pub page: u32,
    pub page_size: u32,
    pub random_order: bool,
    pub image_only: bool,
}

impl SearchParams {
    /// Search for `term`, either as free text or as a strict item match.
    pub fn for_term(term: &str, strict: bool) -> Self {
        let (search_term, strict_item) = if strict {
            (None, Some(term.to_string()))
        } else {
            (Some(term.to_string()), None)
        };
        Self {
            search_term,
            strict_item,
            ..Self::default()
        }
    }

    /// Look up a single object by identifier.
    pub fn for_id(id: &str) -> Self {
        Self {
            id_filter: Some(id.to_string()),
            image_only: false,
            ..Self::default()
        }
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn random_order(mut self, random_order: bool) -> Self {
        self.random_order = random_order;
        self
    }

    pub fn image_only(mut self, image_only: bool) -> Self {
        self.image_only = image_only;
        self
    }

    /// The term this request searches for, whichever field carries it.
    pub fn term(&self) -> Option<&str> {
        self.search_term
            .as_deref()
            .or(self.strict_item.as_deref())
    }
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            search_term: None,
            strict_item: None,
            id_filter: None,
            page: 1,
            page_size: 1,
            random_order: false,
            image_only: true,
        }
    }
}

/// Search response as returned by a proxy, before validation.
///
/// Either field is `None` when the payload did not carry it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSearchResult {
    /// Matches across the whole collection.
    pub record_count: Option<u64>,
    /// Summary records for the requested page.
    pub records: Option<Vec<Value>>,
}

impl RawSearchResult {
    pub fn new(record_count: u64, records: Vec<Value>) -> Self {
        Self {
            record_count: Some(record_count),
            records: Some(records),
        }
    }

    /// Records on this page, empty when the payload had none.
    pub fn page_records(&self) -> &[Value] {
        self.records.as_deref().unwrap_or(&[])
    }
}
