//! JSON payload view
//!
//! Parsed JSON is kept as a [`serde_json::Value`]; these helpers address it
//! as nested mappings, sequences and scalars.

use serde_json::Value;

/// Walk `segments` through nested objects and arrays.
///
/// Object levels are addressed by key. Array levels are addressed by a
/// numeric index; a non-numeric or out-of-range index yields `None`, as does
/// descending into a scalar.
#[must_use]
pub fn lookup<'a, 'b>(value: &'a Value, segments: impl IntoIterator<Item = &'b str>) -> Option<&'a Value> {
    let mut current = value;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => {
                let index: usize = segment.parse().ok()?;
                items.get(index)?
            }
            _ => return None,
        };
    }
    Some(current)
}

/// String form of a JSON value, or `None` for JSON `null`.
///
/// Strings are returned without quotes; numbers and booleans use their JSON
/// spelling; objects and arrays are rendered as compact JSON.
#[must_use]
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}
