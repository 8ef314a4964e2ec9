//! Viewing history entries.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::ObjectRecord;

/// Older persisted shapes used these names; `(legacy, canonical)`.
const LEGACY_ALIASES: &[(&str, &str)] = &[
    ("systemNumber", "id"),
    ("objectNumber", "id"),
    ("vaCollectionsUrl", "collectionUrl"),
];

/// Reduced projection of an [`ObjectRecord`] kept in the history list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub maker: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub collection_url: String,
    #[serde(default = "epoch", deserialize_with = "deserialize_viewed_at")]
    pub viewed_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Project a record into a history entry viewed at `viewed_at`.
    pub fn from_record(record: &ObjectRecord, viewed_at: DateTime<Utc>) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            maker: record.maker.clone(),
            date: record.date.clone(),
            image_url: record.image_url.clone(),
            collection_url: record.collection_url.clone(),
            viewed_at,
        }
    }

    /// Parse one persisted entry, mapping legacy field names first.
    ///
    /// Canonical fields win when both a legacy and a canonical name are present.
    /// Returns `None` for values that are not objects or lack an id.
    pub fn from_persisted(value: &Value) -> Option<Self> {
        let mut map = value.as_object()?.clone();

        for (legacy, canonical) in LEGACY_ALIASES {
            match map.remove(*legacy) {
                Some(v) if !map.contains_key(*canonical) => {
                    map.insert(canonical.to_string(), v);
                }
                _ => {}
            }
        }

        // Legacy ids were sometimes stored as numbers
        if let Some(Value::Number(n)) = map.get("id") {
            let id = n.to_string();
            map.insert("id".to_string(), Value::String(id));
        }

        let entry: Self = serde_json::from_value(Value::Object(map)).ok()?;
        if entry.id.is_empty() {
            return None;
        }
        Some(entry)
    }
}

fn epoch() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH
}

/// Accept either an RFC 3339 string or a millisecond Unix timestamp.
fn deserialize_viewed_at<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = match &value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok(),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    };
    Ok(parsed.unwrap_or(DateTime::UNIX_EPOCH))
}
