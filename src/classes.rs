//! Device class registry
//!
//! Maps dotted class identifiers (`beamsim.devices.motor.FakeMotor`) to
//! constructible device classes. Identifiers are split into a container
//! path and a symbol name; every class is registered up front, so resolving
//! a configuration's targets is a plain lookup that can be validated before
//! anything is constructed.

use std::collections::BTreeMap;

use beamsim_model::DeviceClass;
use serde_json::{Map, Value};

use crate::config::{KeyPath, TARGET_KEY};

/// Class resolution errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolutionError {
    #[error("invalid class identifier '{0}': expected 'container.Symbol'")]
    InvalidIdentifier(String),

    #[error("cannot resolve '{id}': no container '{container}'")]
    ContainerNotFound { id: String, container: String },

    #[error("cannot resolve '{id}': container '{container}' has no class '{symbol}'")]
    SymbolNotFound {
        id: String,
        container: String,
        symbol: String,
    },

    #[error("class '{0}' is already registered")]
    Duplicate(String),
}

/// A target that failed to resolve, with its location in the configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{path}: {source}")]
pub struct TargetError {
    pub path: KeyPath,
    pub source: ResolutionError,
}

/// Split an identifier into container path and symbol name.
pub fn split_identifier(id: &str) -> Result<(&str, &str), ResolutionError> {
    match id.rsplit_once('.') {
        Some((container, symbol)) if !container.is_empty() && !symbol.is_empty() => Ok((container, symbol)),
        _ => Err(ResolutionError::InvalidIdentifier(id.to_string())),
    }
}

/// Registry of constructible device classes, grouped by container.
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    containers: BTreeMap<String, BTreeMap<String, DeviceClass>>,
}

impl ClassRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every class of `beamsim_devices::catalog()`
    pub fn with_builtin() -> Result<Self, ResolutionError> {
        let mut registry = Self::new();
        for class in beamsim_devices::catalog() {
            registry.register(class)?;
        }
        Ok(registry)
    }

    /// Register a class under its identifier.
    pub fn register(&mut self, class: DeviceClass) -> Result<(), ResolutionError> {
        let (container, symbol) = split_identifier(class.id)?;
        let symbols = self.containers.entry(container.to_string()).or_default();
        if symbols.contains_key(symbol) {
            return Err(ResolutionError::Duplicate(class.id.to_string()));
        }
        symbols.insert(symbol.to_string(), class);
        Ok(())
    }

    /// Look up a class by its full identifier.
    pub fn resolve(&self, id: &str) -> Result<DeviceClass, ResolutionError> {
        let (container, symbol) = split_identifier(id)?;
        let symbols = self
            .containers
            .get(container)
            .ok_or_else(|| ResolutionError::ContainerNotFound {
                id: id.to_string(),
                container: container.to_string(),
            })?;
        symbols
            .get(symbol)
            .copied()
            .ok_or_else(|| ResolutionError::SymbolNotFound {
                id: id.to_string(),
                container: container.to_string(),
                symbol: symbol.to_string(),
            })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.resolve(id).is_ok()
    }

    /// All registered identifiers, grouped by container.
    pub fn ids(&self) -> Vec<&'static str> {
        self.containers
            .values()
            .flat_map(|symbols| symbols.values().map(|class| class.id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.containers.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check every device-level `_target` of a grouped configuration.
    ///
    /// Devices without a target are skipped here; construction reports them.
    /// Returns the number of targets checked.
    pub fn validate_targets(&self, config: &Map<String, Value>) -> Result<usize, TargetError> {
        let mut checked = 0;
        for (group_key, group) in config {
            let Some(group) = group.as_object() else {
                continue;
            };
            for (device_key, settings) in group {
                let Some(target) = settings.get(TARGET_KEY) else {
                    continue;
                };
                let path = KeyPath::root().child(group_key).child(device_key).child(TARGET_KEY);
                let id = target.as_str().ok_or_else(|| TargetError {
                    path: path.clone(),
                    source: ResolutionError::InvalidIdentifier(target.to_string()),
                })?;
                self.resolve(id).map_err(|source| TargetError { path, source })?;
                checked += 1;
            }
        }
        Ok(checked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beamsim_devices::{FAKE_MOTOR, SHUTTER};
    use serde_json::json;

    #[test]
    fn test_split_identifier() {
        assert_eq!(
            split_identifier("beamsim.devices.motor.FakeMotor").unwrap(),
            ("beamsim.devices.motor", "FakeMotor")
        );
        assert!(split_identifier("FakeMotor").is_err());
        assert!(split_identifier("pkg.").is_err());
        assert!(split_identifier(".Motor").is_err());
    }

    #[test]
    fn test_resolve_registered() {
        let mut registry = ClassRegistry::new();
        registry.register(FAKE_MOTOR).unwrap();

        let class = registry.resolve("beamsim.devices.motor.FakeMotor").unwrap();
        assert_eq!(class, FAKE_MOTOR);
    }

    #[test]
    fn test_container_not_found() {
        let mut registry = ClassRegistry::new();
        registry.register(FAKE_MOTOR).unwrap();

        let err = registry.resolve("ophyd.EpicsMotor").unwrap_err();
        assert_eq!(
            err,
            ResolutionError::ContainerNotFound {
                id: "ophyd.EpicsMotor".into(),
                container: "ophyd".into(),
            }
        );
    }

    #[test]
    fn test_symbol_not_found() {
        let mut registry = ClassRegistry::new();
        registry.register(FAKE_MOTOR).unwrap();

        let err = registry.resolve("beamsim.devices.motor.Stepper").unwrap_err();
        assert!(matches!(err, ResolutionError::SymbolNotFound { ref symbol, .. } if symbol == "Stepper"));
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = ClassRegistry::new();
        registry.register(SHUTTER).unwrap();
        assert_eq!(
            registry.register(SHUTTER).unwrap_err(),
            ResolutionError::Duplicate(SHUTTER.id.to_string())
        );
    }

    #[test]
    fn test_builtin_catalog() {
        let registry = ClassRegistry::with_builtin().unwrap();
        assert_eq!(registry.len(), beamsim_devices::catalog().len());
        assert!(registry.contains("beamsim.devices.energy.Energy"));
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_validate_targets() {
        let registry = ClassRegistry::with_builtin().unwrap();
        let config = json!({
            "motors": {
                "m1": {"_target": "beamsim.devices.motor.FakeMotor"},
                "m2": {"prefix": "no target"}
            }
        });

        assert_eq!(registry.validate_targets(config.as_object().unwrap()).unwrap(), 1);
    }

    #[test]
    fn test_validate_targets_reports_path() {
        let registry = ClassRegistry::with_builtin().unwrap();
        let config = json!({
            "detectors": {"i0": {"_target": "ophyd.EpicsSignal"}}
        });

        let err = registry.validate_targets(config.as_object().unwrap()).unwrap_err();

        assert_eq!(err.path.to_string(), "detectors.i0._target");
        assert!(err.to_string().contains("ophyd.EpicsSignal"));
    }
}
