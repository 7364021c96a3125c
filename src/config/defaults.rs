//! Per-group default templates.
//!
//! A group may carry a `_default` entry whose fields are copied into every
//! sibling item that does not define them already. The merge is shallow:
//! only top-level item fields are considered.

use serde_json::{Map, Value};

/// Reserved key holding a group's default template.
pub const DEFAULT_KEY: &str = "_default";

/// Apply every group's `_default` template to its items.
///
/// Returns a new mapping; the input is left untouched. `_default` never
/// appears in the output, explicit item fields are never overwritten, and
/// non-mapping values pass through as they are.
pub fn apply_defaults(data: &Map<String, Value>) -> Map<String, Value> {
    data.iter()
        .map(|(group_key, group_value)| {
            let applied = match group_value {
                Value::Object(group) => Value::Object(apply_group_defaults(group)),
                other => other.clone(),
            };
            (group_key.clone(), applied)
        })
        .collect()
}

/// Apply a single group's `_default` template to its items.
pub fn apply_group_defaults(group: &Map<String, Value>) -> Map<String, Value> {
    let empty = Map::new();
    let defaults = match group.get(DEFAULT_KEY) {
        Some(Value::Object(defaults)) => defaults,
        _ => &empty,
    };

    group
        .iter()
        .filter(|(key, _)| key.as_str() != DEFAULT_KEY)
        .map(|(item_key, item_value)| {
            let item = match item_value {
                Value::Object(item) => {
                    let mut item = item.clone();
                    for (field, default) in defaults {
                        item.entry(field.clone()).or_insert_with(|| default.clone());
                    }
                    Value::Object(item)
                }
                other => other.clone(),
            };
            (item_key.clone(), item)
        })
        .collect()
}
