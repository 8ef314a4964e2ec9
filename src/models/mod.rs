//! Data models for collection objects, search requests, and viewing history.

mod history_entry;
mod object_record;
mod search;

pub use history_entry::HistoryEntry;
pub use object_record::ObjectRecord;
pub use search::{RawSearchResult, SearchParams};
