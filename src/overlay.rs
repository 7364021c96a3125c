//! Overlay configuration
//!
//! A secondary file narrows or adjusts the resolved configuration without
//! touching the primary device file:
//!
//! ```toml
//! [loaders]
//! EpicsMotor = "beamsim.devices.motor.FakeMotor"
//!
//! [devices.detectors.sc]
//! exclude = true
//!
//! [devices.motors.m1]
//! velocity = 2
//! prefix = { exclude = true }
//! ```
//!
//! The overlay never adds groups or devices; it only removes or adjusts
//! what the resolved configuration already contains.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::config::{merge_field, KeyPath};
use crate::translate::{TranslateError, TranslationTable};

/// Key of the translation section of an overlay file
pub const LOADERS_KEY: &str = "loaders";

/// Key of the device overlay section of an overlay file
pub const DEVICES_KEY: &str = "devices";

/// Flag marking a group, device or field as excluded
pub const EXCLUDE_KEY: &str = "exclude";

/// Overlay errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OverlayError {
    #[error("{path}: expected a table, got {value}")]
    NotATable { path: KeyPath, value: String },

    #[error("{path}: 'exclude' must be a boolean, got {value}")]
    InvalidExclude { path: KeyPath, value: String },

    #[error(transparent)]
    Loaders(#[from] TranslateError),
}

/// Override for a single field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOverlay {
    Excluded,
    Set(Value),
}

/// Override for a single device
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceOverlay {
    Excluded,
    Fields(BTreeMap<String, FieldOverlay>),
}

/// Override for a group of devices
#[derive(Debug, Clone, PartialEq)]
pub enum GroupOverlay {
    Excluded,
    Devices(BTreeMap<String, DeviceOverlay>),
}

/// The `[devices]` section: group → device → field overrides
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlaySpec {
    groups: BTreeMap<String, GroupOverlay>,
}

fn as_table<'a>(value: &'a Value, path: &KeyPath) -> Result<&'a Map<String, Value>, OverlayError> {
    value.as_object().ok_or_else(|| OverlayError::NotATable {
        path: path.clone(),
        value: value.to_string(),
    })
}

/// Reads the `exclude` flag of a table; absent means not excluded.
fn is_excluded(table: &Map<String, Value>, path: &KeyPath) -> Result<bool, OverlayError> {
    match table.get(EXCLUDE_KEY) {
        None => Ok(false),
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(other) => Err(OverlayError::InvalidExclude {
            path: path.child(EXCLUDE_KEY),
            value: other.to_string(),
        }),
    }
}

impl OverlaySpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `[devices]` section given as a bare value.
    pub fn from_value(value: &Value) -> Result<Self, OverlayError> {
        let path = KeyPath::root().child(DEVICES_KEY);
        Self::from_section(as_table(value, &path)?, &path)
    }

    /// Parse a `[devices]` section.
    pub fn from_section(section: &Map<String, Value>, path: &KeyPath) -> Result<Self, OverlayError> {
        let mut groups = BTreeMap::new();
        for (group_key, group_value) in section {
            let group_path = path.child(group_key);
            let group_table = as_table(group_value, &group_path)?;
            groups.insert(group_key.clone(), Self::parse_group(group_table, &group_path)?);
        }
        Ok(Self { groups })
    }

    fn parse_group(table: &Map<String, Value>, path: &KeyPath) -> Result<GroupOverlay, OverlayError> {
        if is_excluded(table, path)? {
            return Ok(GroupOverlay::Excluded);
        }

        let mut devices = BTreeMap::new();
        for (device_key, device_value) in table {
            if device_key == EXCLUDE_KEY {
                continue;
            }
            let device_path = path.child(device_key);
            let device_table = as_table(device_value, &device_path)?;
            devices.insert(device_key.clone(), Self::parse_device(device_table, &device_path)?);
        }
        Ok(GroupOverlay::Devices(devices))
    }

    fn parse_device(table: &Map<String, Value>, path: &KeyPath) -> Result<DeviceOverlay, OverlayError> {
        if is_excluded(table, path)? {
            return Ok(DeviceOverlay::Excluded);
        }

        let mut fields = BTreeMap::new();
        for (field, value) in table {
            if field == EXCLUDE_KEY {
                continue;
            }
            let excluded = match value {
                Value::Object(inner) => is_excluded(inner, &path.child(field))?,
                _ => false,
            };
            let overlay = if excluded {
                FieldOverlay::Excluded
            } else {
                FieldOverlay::Set(value.clone())
            };
            fields.insert(field.clone(), overlay);
        }
        Ok(DeviceOverlay::Fields(fields))
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group(&self, key: &str) -> Option<&GroupOverlay> {
        self.groups.get(key)
    }

    /// Apply the overlay to a grouped configuration, returning a new mapping.
    pub fn apply(&self, config: &Map<String, Value>) -> Map<String, Value> {
        let mut out = Map::new();

        for (group_key, group_value) in config {
            match (self.groups.get(group_key), group_value) {
                (Some(GroupOverlay::Excluded), _) => {}
                (Some(GroupOverlay::Devices(devices)), Value::Object(group)) => {
                    out.insert(group_key.clone(), Value::Object(apply_group(devices, group)));
                }
                _ => {
                    out.insert(group_key.clone(), group_value.clone());
                }
            }
        }

        out
    }
}

fn apply_group(devices: &BTreeMap<String, DeviceOverlay>, group: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();

    for (device_key, settings) in group {
        match (devices.get(device_key), settings) {
            (Some(DeviceOverlay::Excluded), _) => {}
            (Some(DeviceOverlay::Fields(fields)), Value::Object(settings)) => {
                let mut settings = settings.clone();
                for (field, overlay) in fields {
                    match overlay {
                        FieldOverlay::Excluded => {
                            settings.remove(field);
                        }
                        FieldOverlay::Set(value) => merge_field(&mut settings, field, value.clone()),
                    }
                }
                out.insert(device_key.clone(), Value::Object(settings));
            }
            _ => {
                out.insert(device_key.clone(), settings.clone());
            }
        }
    }

    out
}

/// A parsed overlay file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayConfig {
    /// Extra target translations
    pub loaders: TranslationTable,

    pub devices: OverlaySpec,
}

impl OverlayConfig {
    /// Parse an overlay file's top-level table. Both sections are optional.
    pub fn from_map(data: &Map<String, Value>) -> Result<Self, OverlayError> {
        let root = KeyPath::root();

        let loaders = match data.get(LOADERS_KEY) {
            Some(value) => {
                let path = root.child(LOADERS_KEY);
                TranslationTable::from_section(as_table(value, &path)?, &path)?
            }
            None => TranslationTable::new(),
        };

        let devices = match data.get(DEVICES_KEY) {
            Some(value) => {
                let path = root.child(DEVICES_KEY);
                OverlaySpec::from_section(as_table(value, &path)?, &path)?
            }
            None => OverlaySpec::new(),
        };

        Ok(Self { loaders, devices })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn resolved() -> Map<String, Value> {
        as_map(json!({
            "detectors": {
                "i0": {"_target": "Adc", "prefix": "I0:"},
                "sc": {"_target": "Adc", "prefix": "SC:"}
            },
            "motors": {
                "m1": {"_target": "FakeMotor", "prefix": "M1:", "velocity": 1}
            }
        }))
    }

    fn spec(value: Value) -> OverlaySpec {
        OverlaySpec::from_section(&as_map(value), &KeyPath::root().child(DEVICES_KEY)).unwrap()
    }

    #[test]
    fn test_device_exclusion() {
        let overlay = spec(json!({"detectors": {"sc": {"exclude": true}}}));

        let result = overlay.apply(&resolved());

        assert!(result["detectors"].get("sc").is_none());
        assert!(result["detectors"].get("i0").is_some());
    }

    #[test]
    fn test_field_exclusion_keeps_siblings() {
        let overlay = spec(json!({"motors": {"m1": {"prefix": {"exclude": true}}}}));

        let result = overlay.apply(&resolved());

        assert_eq!(result["motors"]["m1"], json!({"_target": "FakeMotor", "velocity": 1}));
    }

    #[test]
    fn test_field_override() {
        let overlay = spec(json!({"motors": {"m1": {"velocity": 2, "precision": 4}}}));

        let result = overlay.apply(&resolved());

        assert_eq!(result["motors"]["m1"]["velocity"], 2);
        assert_eq!(result["motors"]["m1"]["precision"], 4);
        assert_eq!(result["motors"]["m1"]["prefix"], "M1:");
    }

    #[test]
    fn test_group_exclusion() {
        let overlay = spec(json!({"detectors": {"exclude": true}}));

        let result = overlay.apply(&resolved());

        assert!(result.get("detectors").is_none());
        assert!(result.get("motors").is_some());
    }

    #[test]
    fn test_explicit_false_keeps_device() {
        let overlay = spec(json!({"detectors": {"exclude": false, "sc": {"exclude": false}}}));

        let result = overlay.apply(&resolved());

        assert_eq!(result, resolved());
    }

    #[test]
    fn test_never_adds_groups_or_devices() {
        let overlay = spec(json!({
            "cameras": {"cam1": {"prefix": "CAM:"}},
            "motors": {"m2": {"velocity": 3}}
        }));

        let result = overlay.apply(&resolved());

        assert!(result.get("cameras").is_none());
        assert!(result["motors"].get("m2").is_none());
    }

    #[test]
    fn test_empty_overlay_is_identity() {
        assert_eq!(OverlaySpec::new().apply(&resolved()), resolved());
    }

    #[test]
    fn test_invalid_exclude_flag() {
        let err = OverlaySpec::from_section(
            &as_map(json!({"detectors": {"sc": {"exclude": "yes"}}})),
            &KeyPath::root().child(DEVICES_KEY),
        )
        .unwrap_err();

        assert!(err.to_string().contains("devices.detectors.sc.exclude"));
    }

    #[test]
    fn test_device_entry_must_be_table() {
        let err = OverlaySpec::from_section(
            &as_map(json!({"detectors": {"sc": 3}})),
            &KeyPath::root().child(DEVICES_KEY),
        )
        .unwrap_err();

        assert!(matches!(err, OverlayError::NotATable { .. }));
    }

    #[test]
    fn test_overlay_config_sections() {
        let config = OverlayConfig::from_map(&as_map(json!({
            "loaders": {"Manipulator4AxBase": "beamsim.devices.manipulator.Manipulator"},
            "devices": {"detectors": {"sc": {"exclude": true}}}
        })))
        .unwrap();

        assert_eq!(config.loaders.len(), 1);
        assert!(matches!(config.devices.group("detectors"), Some(GroupOverlay::Devices(_))));
    }

    #[test]
    fn test_from_value_requires_table() {
        assert!(OverlaySpec::from_value(&json!({"detectors": {"exclude": true}})).is_ok());
        assert!(matches!(
            OverlaySpec::from_value(&json!([1, 2])),
            Err(OverlayError::NotATable { .. })
        ));
    }

    #[test]
    fn test_overlay_config_empty() {
        let config = OverlayConfig::from_map(&Map::new()).unwrap();
        assert!(config.loaders.is_empty());
        assert!(config.devices.is_empty());
    }
}
