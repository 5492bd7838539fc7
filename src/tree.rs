//! Structural edits on a [`Document`](crate::store::Document).
//!
//! Three primitives describe every mutation the patcher performs:
//! container creation ([`ensure_object`] / [`ensure_array`]), conditional
//! insertion ([`insert_if_absent`] / [`append_if_missing`]), and plain
//! `Document::insert` for full-record upserts. Each is idempotent on its
//! own, so a sequence of them is too.

use serde_json::Value;

use crate::store::Document;

/// Get the object under `key`, inserting an empty one if the key is absent.
///
/// If the slot holds a non-object value, it is replaced with an empty
/// object — the patch needs a container there and a scalar in that slot is
/// already outside the document's shape.
pub fn ensure_object<'a>(map: &'a mut Document, key: &str) -> &'a mut Document {
    if !matches!(map.get(key), Some(Value::Object(_))) {
        map.insert(key.to_string(), Value::Object(Document::new()));
    }
    match map.get_mut(key) {
        Some(Value::Object(obj)) => obj,
        _ => unreachable!("slot was just set to an object"),
    }
}

/// Get the array under `key`, inserting an empty one if the key is absent.
///
/// Same replacement policy as [`ensure_object`] for wrong-typed slots.
pub fn ensure_array<'a>(map: &'a mut Document, key: &str) -> &'a mut Vec<Value> {
    if !matches!(map.get(key), Some(Value::Array(_))) {
        map.insert(key.to_string(), Value::Array(Vec::new()));
    }
    match map.get_mut(key) {
        Some(Value::Array(arr)) => arr,
        _ => unreachable!("slot was just set to an array"),
    }
}

/// Insert `value` under `key` only if the key is currently absent.
/// Returns `true` if the insertion happened. Never overwrites.
pub fn insert_if_absent(map: &mut Document, key: &str, value: Value) -> bool {
    if map.contains_key(key) {
        return false;
    }
    map.insert(key.to_string(), value);
    true
}

/// Append `value` to `list` unless an equal element is already present.
///
/// Membership is exact equality. Existing elements keep their positions;
/// a new element always lands at the end. Returns `true` if appended.
pub fn append_if_missing(list: &mut Vec<Value>, value: Value) -> bool {
    if list.contains(&value) {
        return false;
    }
    list.push(value);
    true
}
