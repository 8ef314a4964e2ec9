//! Dot-notation lookups into JSON payloads.

use serde_json::Value;

/// Extract a value from nested JSON using dot-notation path.
///
/// Numeric segments index into arrays. Missing keys resolve to `Value::Null`.
pub fn extract_path<'a>(data: &'a Value, path: &str) -> &'a Value {
    if path.is_empty() {
        return data;
    }

    let mut current = data;
    for key in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(key).unwrap_or(&Value::Null),
            Value::Array(arr) => match key.parse::<usize>() {
                Ok(idx) => arr.get(idx).unwrap_or(&Value::Null),
                Err(_) => &Value::Null,
            },
            _ => &Value::Null,
        };
    }

    current
}
