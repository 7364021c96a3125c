//! Value merge used by overlays.
//!
//! - Tables: deep-merge by key
//! - Arrays: REPLACE (overlay wins)
//! - Scalars: override (overlay wins)

use serde_json::Value;

/// Deep merge two JSON values.
///
/// Merge semantics:
/// - Objects: deep-merge by key (recursive)
/// - Arrays: REPLACE (second wins entirely)
/// - Scalars: override (second wins)
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = if let Some(base_value) = base_map.remove(&key) {
                    deep_merge(base_value, overlay_value)
                } else {
                    overlay_value
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }

        (Value::Array(_), overlay @ Value::Array(_)) => overlay,

        (_, overlay) => overlay,
    }
}

/// Merge `overlay` into the field `key` of `settings`.
pub fn merge_field(settings: &mut serde_json::Map<String, Value>, key: &str, overlay: Value) {
    let merged = match settings.remove(key) {
        Some(base) => deep_merge(base, overlay),
        None => overlay,
    };
    settings.insert(key.to_string(), merged);
}
