//! Field-by-field merging of configuration tiers.
//!
//! Higher tiers override lower ones key by key. Arrays are replaced whole, so
//! a plan's `artifacts` list always comes from a single tier.

use serde_json::Value;

/// Merge `overlay` onto `base`, overlay winning.
///
/// - Objects merge recursively
/// - Arrays and scalars from the overlay replace the base value
/// - A null overlay means "not specified" and keeps the base value
///
/// # Example
/// ```
/// use serde_json::json;
/// use confpush::config::deep_merge;
///
/// let base = json!({ "git": { "program": "git", "remote": "origin" } });
/// let overlay = json!({ "git": { "remote": "upstream" } });
/// let merged = deep_merge(base, overlay);
/// assert_eq!(merged, json!({ "git": { "program": "git", "remote": "upstream" } }));
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut merged), Value::Object(overlay)) => {
            // Merge in place so keys keep their first position.
            for (key, value) in overlay {
                match merged.get_mut(&key) {
                    Some(existing) => {
                        let previous = existing.take();
                        *existing = deep_merge(previous, value);
                    }
                    None => {
                        merged.insert(key, value);
                    }
                }
            }
            Value::Object(merged)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Fold [`deep_merge`] over tiers given lowest priority first.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}
