//! Shared utility functions.
//!
//! This module contains reusable utilities used across the codebase:
//! - `html`: light-markup stripping for titles and descriptions
//! - `json_path`: dot-notation lookups into API payloads
//! - `random`: uniform integer draws

mod html;
mod json_path;
mod random;

pub use html::strip_light_markup;
pub use json_path::extract_path;
pub use random::{random_index, random_int};
