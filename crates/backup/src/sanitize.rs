// Secret redaction for JSON configuration documents.
//
// Any object key matching a sensitive marker has its whole value replaced by
// `<$KEY>` (key uppercased), whatever the original type. Redaction stops the
// descent into that branch. Arrays are walked element by element; scalars
// outside a sensitive key pass through unchanged.

use serde_json::{Map, Value};
use tracing::trace;

use crate::config::SensitiveKeys;

/// Placeholder written in place of a sensitive value.
pub fn placeholder(key: &str) -> String {
    format!("<${}>", key.to_uppercase())
}

/// Return a redacted copy of `value`. The input is left untouched.
pub fn sanitize(value: &Value, keys: &SensitiveKeys) -> Value {
    sanitize_at(value, "", keys)
}

/// Redact `value` found at the dotted key path `path` (empty at the root).
///
/// No rule currently depends on the path; it is threaded through so
/// path-based rules can be added without changing callers.
pub fn sanitize_at(value: &Value, path: &str, keys: &SensitiveKeys) -> Value {
    match value {
        Value::Object(map) => Value::Object(sanitize_object(map, path, keys)),
        Value::Array(items) => {
            Value::Array(items.iter().map(|item| sanitize_at(item, path, keys)).collect())
        }
        scalar => scalar.clone(),
    }
}

fn sanitize_object(map: &Map<String, Value>, path: &str, keys: &SensitiveKeys) -> Map<String, Value> {
    map.iter()
        .map(|(key, value)| {
            let key_path = join_path(path, key);
            let sanitized = if keys.matches(key) {
                trace!(path = %key_path, "redacted sensitive value");
                Value::String(placeholder(key))
            } else {
                sanitize_at(value, &key_path, keys)
            };
            (key.clone(), sanitized)
        })
        .collect()
}

fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}
