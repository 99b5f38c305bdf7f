//! Canonical text forms of a tree.
use serde::Serialize;
use serde_json::{Map, Value};

use bcd_core::{BcdError, Tree};

use crate::order::{canonicalize_tree, FeatureOrder};

/// Two-space pretty printing with a trailing newline, the on-disk format of
/// every document.
pub fn to_pretty_string<T: Serialize + ?Sized>(value: &T) -> Result<String, BcdError> {
    let mut text = serde_json::to_string_pretty(value).map_err(|e| BcdError::SerializeError(e.to_string()))?;
    text.push('\n');
    Ok(text)
}

/// Canonical on-disk text of `tree`; the tree itself is left untouched.
pub fn to_canonical_string(tree: &Tree, order: &dyn FeatureOrder) -> Result<String, BcdError> {
    let mut canonical = tree.clone();
    canonicalize_tree(&mut canonical, order);
    to_pretty_string(&canonical)
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(object) => {
            let mut entries: Vec<(String, Value)> = object.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sort_keys(v))).collect::<Map<_, _>>())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// Compact JSON with every object's keys sorted, so equal data always
/// produces equal bytes (and equal digests).
pub fn to_stable_string(value: &Value) -> Result<String, BcdError> {
    serde_json::to_string(&sort_keys(value.clone())).map_err(|e| BcdError::SerializeError(e.to_string()))
}
