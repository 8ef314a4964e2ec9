//! Curio - random museum object acquisition.
//!
//! Picks a random object from a museum collection's public search API,
//! normalizes it into an [`ObjectRecord`], and keeps a bounded,
//! deduplicated viewing history.

pub mod acquisition;
pub mod config;
pub mod history;
pub mod models;
pub mod museum;
pub mod proxy;
pub mod rate_limit;
pub mod storage;
pub mod terms;
pub mod utils;

pub use acquisition::{AcquireOutcome, AcquisitionController, AcquisitionEvent};
pub use history::HistoryStore;
pub use models::{HistoryEntry, ObjectRecord};
pub use museum::{AcquisitionError, MuseumApiClient};
