//! Lenient accessors over untyped JSON payloads.

use serde_json::Value;

/// Non-empty, trimmed string at `key`.
pub(crate) fn text(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(as_text)
}

/// First non-empty string among `keys`.
pub(crate) fn first_text(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| text(value, k))
}

/// Unwrap `{ "value": ... }` wrappers used by Crunchbase.
pub(crate) fn wrapped_text(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(|v| match v {
        Value::Object(_) => v.get("value").and_then(as_text),
        other => as_text(other),
    })
}

/// `value` of the first element of an array of wrapped entries.
pub(crate) fn first_wrapped_text(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .and_then(|item| match item {
            Value::Object(_) => item.get("value").and_then(as_text),
            other => as_text(other),
        })
}

/// Non-negative integer at `key`. Accepts JSON numbers and numeric strings.
pub(crate) fn count(value: &Value, key: &str) -> Option<u64> {
    value.get(key).and_then(as_count)
}

pub(crate) fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64)),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok().and_then(|f| {
            (f >= 0.0).then(|| f.round() as u64)
        }),
        _ => None,
    }
}

/// Strings of an array at `key`, skipping blanks and non-strings.
pub(crate) fn text_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(as_text).collect())
        .unwrap_or_default()
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
