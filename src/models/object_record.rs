//! Canonical object record produced by every museum backend.

use serde::{Deserialize, Serialize};

/// A normalized collection object.
///
/// `image_url` is empty exactly when `image_id` is `None`. `description` is
/// never empty once a backend has normalized the record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRecord {
    /// Stable unique identifier within the museum.
    pub id: String,
    pub title: String,
    pub date: String,
    /// Empty when unknown or unattributed.
    pub maker: String,
    /// Life-span annotation for the maker, e.g. `(1834-1896)`.
    pub maker_dates: String,
    pub place: String,
    pub object_type: String,
    pub accession_number: String,
    pub museum_location: String,
    pub image_id: Option<String>,
    pub image_url: String,
    /// Public permalink for the object.
    pub collection_url: String,
    pub description: String,
}

impl ObjectRecord {
    /// Whether the record carries a usable image.
    pub fn has_image(&self) -> bool {
        self.image_id.as_deref().is_some_and(|id| !id.is_empty()) && !self.image_url.is_empty()
    }

    /// Fill in `description` from the other fields if it is empty.
    pub fn ensure_description(&mut self) {
        if self.description.trim().is_empty() {
            self.description = self.synthesize_description();
        }
    }

    /// Build a human-readable description from the catalogue fields.
    ///
    /// Produces `"{title}, by {maker}, Dated {date}, from {place}."`, omitting
    /// empty parts. When none of maker/date/place are known the generic
    /// `"A {objectType} from the collection."` is used instead.
    pub fn synthesize_description(&self) -> String {
        let mut details = Vec::new();
        if !self.maker.is_empty() {
            details.push(format!("by {}", self.maker));
        }
        if !self.date.is_empty() {
            details.push(format!("Dated {}", self.date));
        }
        if !self.place.is_empty() {
            details.push(format!("from {}", self.place));
        }

        let object_type = if self.object_type.is_empty() {
            "object"
        } else {
            self.object_type.as_str()
        };

        if details.is_empty() {
            return format!("A {} from the collection.", object_type);
        }

        let lead = if self.title.is_empty() {
            object_type
        } else {
            self.title.as_str()
        };

        format!("{}, {}.", lead, details.join(", "))
    }
}
