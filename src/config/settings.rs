//! Typed view of a device's settings.
//!
//! Separates the pipeline directives (`_target`, `_group`, `_role`) and the
//! addressing `prefix` from the keyword parameters handed to a constructor.

use beamsim_model::{is_reserved, Params};
use serde_json::{Map, Value};

pub const TARGET_KEY: &str = "_target";
pub const GROUP_KEY: &str = "_group";
pub const ROLE_KEY: &str = "_role";
pub const PREFIX_KEY: &str = "prefix";

/// Settings errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SettingsError {
    #[error("'{field}' must be a string, got {value}")]
    NotAString { field: String, value: String },
}

/// A device's settings split into directives, prefix and parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceSettings {
    pub target: Option<String>,
    pub group: Option<String>,
    pub role: Option<String>,
    pub prefix: String,
    pub params: Params,
}

fn string_field(field: &str, value: &Value) -> Result<String, SettingsError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| SettingsError::NotAString {
            field: field.to_string(),
            value: value.to_string(),
        })
}

impl DeviceSettings {
    /// Split a settings mapping. Every field starting with `_` is a directive
    /// and never becomes a parameter; unknown directives are discarded.
    pub fn from_map(settings: &Map<String, Value>) -> Result<Self, SettingsError> {
        let mut parsed = Self::default();

        for (field, value) in settings {
            match field.as_str() {
                TARGET_KEY => parsed.target = Some(string_field(field, value)?),
                ROLE_KEY => parsed.role = Some(string_field(field, value)?),
                GROUP_KEY => parsed.group = value.as_str().map(str::to_string),
                PREFIX_KEY => parsed.prefix = string_field(field, value)?,
                other if is_reserved(other) => {}
                other => {
                    parsed.params.insert(other, value.clone());
                }
            }
        }

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_reserved_fields_never_parameters() {
        let parsed = DeviceSettings::from_map(&settings(json!({
            "_target": "X",
            "_group": "g",
            "prefix": "P",
            "velocity": 10
        })))
        .unwrap();

        assert_eq!(parsed.target.as_deref(), Some("X"));
        assert_eq!(parsed.group.as_deref(), Some("g"));
        assert_eq!(parsed.prefix, "P");
        assert_eq!(parsed.params, Params::new().with("velocity", 10));
    }

    #[test]
    fn test_unknown_directives_discarded() {
        let parsed = DeviceSettings::from_map(&settings(json!({
            "_target": "X",
            "_load_order": 3,
            "precision": 2
        })))
        .unwrap();

        assert_eq!(parsed.params.len(), 1);
        assert!(parsed.params.contains("precision"));
    }

    #[test]
    fn test_prefix_defaults_to_empty() {
        let parsed = DeviceSettings::from_map(&settings(json!({"_target": "X"}))).unwrap();
        assert_eq!(parsed.prefix, "");
        assert!(parsed.role.is_none());
    }

    #[test]
    fn test_non_string_target_rejected() {
        let err = DeviceSettings::from_map(&settings(json!({"_target": 5}))).unwrap_err();
        assert!(err.to_string().contains("_target"));
    }

    #[test]
    fn test_role() {
        let parsed =
            DeviceSettings::from_map(&settings(json!({"_target": "X", "_role": "primary_manipulator"})))
                .unwrap();
        assert_eq!(parsed.role.as_deref(), Some("primary_manipulator"));
    }
}
