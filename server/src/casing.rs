//! Storage-to-API key casing.
//!
//! Rows come out of the database with snake_case column names. Clients see
//! camelCase keys, so every row is passed through [`to_api`] before it is
//! written to a response body.

use serde::Serialize;
use serde_json::{Map, Value};

/// Convert a snake_case key to camelCase.
///
/// Separators (`_`, `-`, space) are dropped; leading and repeated separators
/// are ignored.
pub fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());

    for word in key
        .split(|c: char| c == '_' || c == '-' || c == ' ')
        .filter(|w| !w.is_empty())
    {
        let lower = word.to_lowercase();
        if out.is_empty() {
            out.push_str(&lower);
        } else {
            let mut chars = lower.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
    }

    out
}

/// Rename every object key in `value` to camelCase, descending into nested
/// objects and arrays. Non-key data is left untouched.
pub fn camelize(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (camel_case(&k), camelize(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(camelize).collect()),
        other => other,
    }
}

/// Serialize a storage row and camelize its keys.
pub fn to_api<T: Serialize>(row: &T) -> Result<Value, serde_json::Error> {
    serde_json::to_value(row).map(camelize)
}
