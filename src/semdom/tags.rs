//! Nested tagged-data helpers
//!
//! Contexts and accumulators carry a mapping of tagged data addressed by
//! dot-separated paths (`"element.attrs.href"`). This module provides the
//! lookup, removal and merge primitives over `serde_json::Value` that both
//! value objects share.
//!
//! Merge semantics: mappings merge key-by-key recursively; scalar and
//! sequence leaves are overwritten by the incoming value (right bias).

use serde_json::{Map, Value};

/// An empty tagged-data mapping.
pub fn empty() -> Value {
    Value::Object(Map::new())
}

/// Look up a dot-path in a mapping.
///
/// Returns `None` when any segment of the path is absent. A key that is
/// present with a `null` value yields `Some(&Value::Null)`, which is how
/// callers distinguish "present with null" from "absent".
pub fn get<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = data;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Whether a dot-path exists in a mapping, regardless of its value.
pub fn exists(data: &Value, path: &str) -> bool {
    get(data, path).is_some()
}

/// Set a top-level key to a value, in place.
pub fn set(data: &mut Value, key: &str, value: Value) {
    if let Value::Object(map) = data {
        map.insert(key.to_string(), value);
    }
}

/// Remove a dot-path from a mapping, in place.
///
/// Removing a path that does not exist is a no-op.
pub fn unset(data: &mut Value, path: &str) {
    let mut segments = path.split('.').collect::<Vec<_>>();
    let last = match segments.pop() {
        Some(last) => last,
        None => return,
    };

    let mut current = data;
    for segment in segments {
        current = match current.as_object_mut().and_then(|m| m.get_mut(segment)) {
            Some(next) => next,
            None => return,
        };
    }
    if let Value::Object(map) = current {
        map.remove(last);
    }
}

/// Deep-merge `incoming` into `data`, in place.
///
/// Mappings merge recursively; any other kind of value (scalar, sequence,
/// null) replaces the existing value outright. The incoming side wins on
/// leaf conflicts.
pub fn merge_deep(data: &mut Value, incoming: &Value) {
    match (data, incoming) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                match target.get_mut(key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        merge_deep(existing, value);
                    }
                    _ => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (data, incoming) => {
            *data = incoming.clone();
        }
    }
}

/// Shallow-merge `incoming` into `data`, in place: top-level keys of the
/// incoming mapping overwrite existing keys wholesale.
pub fn merge_shallow(data: &mut Value, incoming: &Value) {
    if let (Value::Object(target), Value::Object(source)) = (data, incoming) {
        for (key, value) in source {
            target.insert(key.clone(), value.clone());
        }
    }
}
