//! Regrouping of flat item collections by their `_group` tag.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::config::{KeyPath, GROUP_KEY, PREFIX_KEY, TARGET_KEY};

/// Group assigned to items without an explicit `_group`.
pub const DEFAULT_GROUP: &str = "misc";

/// Errors raised while hoisting grouped items to the top level
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GroupingError {
    #[error("item '{key}' defined at both {existing} and {incoming}")]
    DuplicateItem {
        key: String,
        existing: KeyPath,
        incoming: KeyPath,
    },
}

/// A mapping whose entries are all item mappings and which is not itself an
/// item (no `_target`, no `prefix`).
fn is_group_shaped(value: &Value) -> bool {
    match value {
        Value::Object(entries) => {
            !entries.is_empty()
                && !entries.contains_key(TARGET_KEY)
                && !entries.contains_key(PREFIX_KEY)
                && entries.values().all(Value::is_object)
        }
        _ => false,
    }
}

/// Hoist the items of group-shaped entries to the top level.
///
/// Each hoisted item is tagged with the enclosing key as its `_group`
/// unless it already names one. Flat items pass through untouched. An item
/// key defined twice is an error.
pub fn flatten_groups(data: &Map<String, Value>) -> Result<Map<String, Value>, GroupingError> {
    let mut items = Map::new();
    let mut origins: BTreeMap<String, KeyPath> = BTreeMap::new();

    for (key, value) in data {
        let hoisted: Vec<(&String, Value, KeyPath)> = match value {
            Value::Object(group) if is_group_shaped(value) => group
                .iter()
                .map(|(item_key, item)| {
                    let mut item = item.clone();
                    if let Value::Object(fields) = &mut item {
                        fields
                            .entry(GROUP_KEY.to_string())
                            .or_insert_with(|| Value::String(key.clone()));
                    }
                    (item_key, item, KeyPath::root().child(key).child(item_key))
                })
                .collect(),
            _ => vec![(key, value.clone(), KeyPath::root().child(key))],
        };

        for (item_key, item, origin) in hoisted {
            if let Some(existing) = origins.get(item_key) {
                return Err(GroupingError::DuplicateItem {
                    key: item_key.clone(),
                    existing: existing.clone(),
                    incoming: origin,
                });
            }
            origins.insert(item_key.clone(), origin);
            items.insert(item_key.clone(), item);
        }
    }

    Ok(items)
}

/// Bucket every item by its `_group` field.
///
/// Returns `group → item key → fields` with `_group` removed from each item.
/// Items without a string `_group` land in `DEFAULT_GROUP`. Every input item
/// appears in exactly one group.
pub fn group_items(data: &Map<String, Value>) -> Map<String, Value> {
    let mut groups: Map<String, Value> = Map::new();

    for (key, value) in data {
        let (group, item) = match value {
            Value::Object(fields) => {
                let mut fields = fields.clone();
                let group = match fields.remove(GROUP_KEY) {
                    Some(Value::String(group)) => group,
                    _ => DEFAULT_GROUP.to_string(),
                };
                (group, Value::Object(fields))
            }
            other => (DEFAULT_GROUP.to_string(), other.clone()),
        };

        let bucket = groups
            .entry(group)
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(bucket) = bucket {
            bucket.insert(key.clone(), item);
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn item_count(groups: &Map<String, Value>) -> usize {
        groups
            .values()
            .map(|g| g.as_object().map(Map::len).unwrap_or(0))
            .sum()
    }

    #[test]
    fn test_groups_by_tag() {
        let data = as_map(json!({
            "i0": {"_target": "Adc", "_group": "detectors"},
            "sc": {"_target": "Adc", "_group": "detectors"},
            "psh4": {"_target": "Shutter", "_group": "shutters"}
        }));

        let groups = group_items(&data);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups["detectors"].as_object().unwrap().len(), 2);
        assert_eq!(groups["shutters"]["psh4"], json!({"_target": "Shutter"}));
    }

    #[test]
    fn test_untagged_items_in_default_group() {
        let data = as_map(json!({
            "tesz": {"_target": "Motor"},
            "odd": {"_target": "Motor", "_group": 5}
        }));

        let groups = group_items(&data);

        assert_eq!(groups.len(), 1);
        let misc = groups[DEFAULT_GROUP].as_object().unwrap();
        assert!(misc.contains_key("tesz"));
        assert!(misc.contains_key("odd"));
        assert!(misc["odd"].get(GROUP_KEY).is_none());
    }

    #[test]
    fn test_conservation() {
        let data = as_map(json!({
            "a": {"_group": "g1"},
            "b": {"_group": "g2"},
            "c": {},
            "d": "scalar",
            "e": {"_group": "g1"}
        }));

        let groups = group_items(&data);

        assert_eq!(item_count(&groups), data.len());
        for key in data.keys() {
            let holders = groups
                .values()
                .filter(|g| g.as_object().unwrap().contains_key(key))
                .count();
            assert_eq!(holders, 1, "{} must appear exactly once", key);
        }
    }

    #[test]
    fn test_input_not_mutated() {
        let data = as_map(json!({"a": {"_group": "g1"}}));
        let _ = group_items(&data);
        assert_eq!(data["a"]["_group"], "g1");
    }

    #[test]
    fn test_empty_input() {
        assert!(group_items(&Map::new()).is_empty());
    }

    #[test]
    fn test_flatten_hoists_group_items() {
        let data = as_map(json!({
            "slits": {
                "eslit": {"_target": "Motor", "prefix": "ES"},
                "islit": {"_target": "Motor", "prefix": "IS", "_group": "apertures"}
            },
            "tesz": {"_target": "Motor", "prefix": "Z"}
        }));

        let flat = flatten_groups(&data).unwrap();

        assert_eq!(flat.len(), 3);
        assert_eq!(flat["eslit"]["_group"], "slits");
        assert_eq!(flat["islit"]["_group"], "apertures");
        assert_eq!(flat["tesz"], data["tesz"]);

        let groups = group_items(&flat);
        assert_eq!(groups["slits"]["eslit"], json!({"_target": "Motor", "prefix": "ES"}));
        assert!(groups["misc"].get("tesz").is_some());
    }

    #[test]
    fn test_flatten_leaves_items_with_nested_tables() {
        let data = as_map(json!({
            "mesh": {"prefix": "MESH:", "x": {"prefix": "X"}},
            "empty": {}
        }));

        assert_eq!(flatten_groups(&data).unwrap(), data);
    }

    #[test]
    fn test_flatten_duplicate_item() {
        let data = as_map(json!({
            "a": {"m1": {"_target": "Motor"}},
            "b": {"m1": {"_target": "Motor"}}
        }));

        let err = flatten_groups(&data).unwrap_err();

        assert_eq!(
            err,
            GroupingError::DuplicateItem {
                key: "m1".into(),
                existing: KeyPath::root().child("a").child("m1"),
                incoming: KeyPath::root().child("b").child("m1"),
            }
        );
    }
}
