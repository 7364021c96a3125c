//! Assembly of a complete graph from a grouped configuration.

use beamsim_devices::BEAMLINE;
use beamsim_model::Params;
use serde_json::{Map, Value};

use super::{DeviceGraph, GraphError};
use crate::classes::ClassRegistry;
use crate::config::KeyPath;

/// Prefix of the root node unless configured otherwise
pub const DEFAULT_ROOT_PREFIX: &str = "SIM:";

/// Key of the root node
pub const ROOT_KEY: &str = "beamline";

/// Groups whose devices form the beam transmission chain, upstream first
pub const TRANSMISSION_GROUPS: [&str; 3] = ["gatevalves", "shutters", "apertures"];

/// Builds a [`DeviceGraph`] rooted at a `Beamline` device.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    classes: ClassRegistry,
    prefix: String,
    root_params: Params,
}

impl GraphBuilder {
    pub fn new(classes: ClassRegistry) -> Self {
        Self {
            classes,
            prefix: DEFAULT_ROOT_PREFIX.to_string(),
            root_params: Params::new(),
        }
    }

    /// Prefix of the root node's own endpoints. Configured devices keep
    /// their own prefixes.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Parameters for the root `Beamline`, e.g. `endstation`.
    pub fn root_params(mut self, params: Params) -> Self {
        self.root_params = params;
        self
    }

    /// Build every device of a grouped configuration (`group → key → settings`).
    ///
    /// All targets are validated before the first device is constructed.
    /// Devices are built in group order, then key order, each directly under
    /// the root. Members of [`TRANSMISSION_GROUPS`] are then chained in that
    /// group order. The first error aborts and the partial graph is dropped.
    pub fn build(self, config: &Map<String, Value>) -> Result<DeviceGraph, GraphError> {
        self.classes.validate_targets(config)?;

        let mut graph = DeviceGraph::new(self.classes);
        let root = graph.build_root(ROOT_KEY, BEAMLINE, &self.prefix, self.root_params)?;

        for (group_key, devices) in config {
            let group_path = KeyPath::root().child(group_key);
            let devices = devices.as_object().ok_or_else(|| GraphError::NotATable {
                path: group_path.clone(),
                value: devices.to_string(),
            })?;

            for (device_key, settings) in devices {
                let path = group_path.child(device_key);
                let settings = settings.as_object().ok_or_else(|| GraphError::NotATable {
                    path: path.clone(),
                    value: settings.to_string(),
                })?;

                let id = graph.build_at(path, device_key, settings, None, Some(root))?;
                graph.add_to_group(group_key, id)?;
                if let Some(role) = graph.checked(id)?.role.clone() {
                    graph.assign_role(&role, id)?;
                }
            }
        }

        for group in TRANSMISSION_GROUPS {
            for id in graph.group(group).to_vec() {
                graph.add_to_transmission(id)?;
            }
        }

        Ok(graph)
    }
}
