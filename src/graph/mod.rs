//! Device graph
//!
//! Nodes live in an arena owned by the graph. Each node is owned by its
//! parent through the parent's `children` list and keeps a non-owning
//! `parent` id. A configured device is addressed by its own prefix; a
//! component's prefix extends its owner's. The endpoint registry belongs to
//! the graph root and is filled bottom-up: a node's endpoints are merged only after the node and
//! all of its components were constructed, and every merge is checked for
//! name collisions.

mod builder;
mod registry;

use std::collections::BTreeMap;

use beamsim_model::{Device, DeviceArgs, DeviceClass, DeviceError, Endpoint, NodeId, Params, ParentRef};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::classes::{ClassRegistry, ResolutionError, TargetError};
use crate::config::{DeviceSettings, KeyPath, SettingsError, TARGET_KEY};

pub use builder::{GraphBuilder, DEFAULT_ROOT_PREFIX, ROOT_KEY, TRANSMISSION_GROUPS};
pub use registry::{Collision, EndpointHandle, EndpointRegistry};

/// Graph construction errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    #[error("{path}: no '_target' and no explicit class supplied")]
    MissingTarget { path: KeyPath },

    #[error("{path}: {source}")]
    Settings { path: KeyPath, source: SettingsError },

    #[error("{path}: {source}")]
    Resolution { path: KeyPath, source: ResolutionError },

    #[error(transparent)]
    Target(#[from] TargetError),

    #[error("{path}: {source}")]
    Device { path: KeyPath, source: DeviceError },

    #[error("endpoint '{name}' of {incoming} collides with {existing}")]
    EndpointCollision {
        name: String,
        existing: KeyPath,
        incoming: KeyPath,
    },

    #[error("role '{role}' claimed by both {existing} and {incoming}")]
    DuplicateRole {
        role: String,
        existing: KeyPath,
        incoming: KeyPath,
    },

    #[error("{path}: expected a table, got {value}")]
    NotATable { path: KeyPath, value: String },

    #[error("unknown parent node {0}")]
    UnknownParent(NodeId),

    #[error("graph already has a root")]
    RootExists,
}

/// A constructed device and its place in the graph.
#[derive(Debug)]
pub struct DeviceNode {
    pub id: NodeId,

    /// Configuration key or component name.
    pub key: String,

    /// Location in the configuration, e.g. `energy.en.mono`.
    pub path: KeyPath,

    pub class_id: &'static str,

    /// Full prefix. Configured devices and the root use their own prefix;
    /// a component appends its prefix to its owner's full prefix.
    pub prefix: String,

    pub parent: Option<NodeId>,

    pub children: Vec<NodeId>,

    pub role: Option<String>,

    /// Endpoints declared at construction; names are relative to `prefix`.
    pub endpoints: Vec<Endpoint>,

    device: Box<dyn Device>,
}

impl DeviceNode {
    pub fn device(&self) -> &dyn Device {
        self.device.as_ref()
    }

    /// Fully qualified endpoint names, in declaration order.
    pub fn endpoint_names(&self) -> Vec<String> {
        self.endpoints
            .iter()
            .map(|ep| format!("{}{}", self.prefix, ep.name))
            .collect()
    }
}

/// Serializable overview of one node.
#[derive(Debug, Clone, Serialize)]
pub struct NodeSummary {
    pub path: KeyPath,
    pub class: &'static str,
    pub prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<KeyPath>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub endpoints: Vec<String>,
}

/// Serializable overview of a graph.
#[derive(Debug, Clone, Serialize)]
pub struct GraphSummary {
    pub nodes: Vec<NodeSummary>,
    pub groups: BTreeMap<String, Vec<KeyPath>>,
    pub roles: BTreeMap<String, KeyPath>,
    pub transmission: Vec<KeyPath>,
    pub endpoint_count: usize,
}

/// Arena of constructed devices plus the shared endpoint registry.
#[derive(Debug)]
pub struct DeviceGraph {
    classes: ClassRegistry,
    nodes: Vec<DeviceNode>,
    registry: EndpointRegistry,
    root: Option<NodeId>,
    groups: BTreeMap<String, Vec<NodeId>>,
    roles: BTreeMap<String, NodeId>,
    transmission: Vec<NodeId>,
}

impl DeviceGraph {
    pub fn new(classes: ClassRegistry) -> Self {
        Self {
            classes,
            nodes: Vec::new(),
            registry: EndpointRegistry::new(),
            root: None,
            groups: BTreeMap::new(),
            roles: BTreeMap::new(),
            transmission: Vec::new(),
        }
    }

    /// Construct the root node. It owns the registry, so its own endpoints
    /// are registered too. Its prefix is never prepended to the devices
    /// built under it.
    pub fn build_root(
        &mut self,
        key: &str,
        class: DeviceClass,
        prefix: &str,
        params: Params,
    ) -> Result<NodeId, GraphError> {
        if self.root.is_some() {
            return Err(GraphError::RootExists);
        }
        let id = self.construct(KeyPath::root(), key, class, prefix.to_string(), params, None, None)?;
        self.register_endpoints(id)?;
        self.root = Some(id);
        Ok(id)
    }

    /// Construct a device from its settings.
    ///
    /// The class is `class` when given, else the `_target` of `settings`.
    /// Directives (`_`-prefixed fields) never reach the constructor and
    /// `prefix` is passed separately from the keyword parameters and names
    /// the device as is, parent or not. With a parent, the new node's endpoints are merged into the registry and the
    /// node is linked under the parent.
    ///
    /// On error the graph must be discarded; no rollback is attempted.
    pub fn build_device(
        &mut self,
        key: &str,
        settings: &Map<String, Value>,
        class: Option<DeviceClass>,
        parent: Option<NodeId>,
    ) -> Result<NodeId, GraphError> {
        let path = match parent {
            Some(parent) => self.checked(parent)?.path.child(key),
            None => KeyPath::root().child(key),
        };
        self.build_at(path, key, settings, class, parent)
    }

    fn build_at(
        &mut self,
        path: KeyPath,
        key: &str,
        settings: &Map<String, Value>,
        class: Option<DeviceClass>,
        parent: Option<NodeId>,
    ) -> Result<NodeId, GraphError> {
        let settings = DeviceSettings::from_map(settings).map_err(|source| GraphError::Settings {
            path: path.clone(),
            source,
        })?;

        let class = match (class, settings.target.as_deref()) {
            (Some(class), _) => class,
            (None, Some(target)) => self.classes.resolve(target).map_err(|source| GraphError::Resolution {
                path: path.child(TARGET_KEY),
                source,
            })?,
            (None, None) => return Err(GraphError::MissingTarget { path }),
        };

        let id = self.construct(
            path,
            key,
            class,
            settings.prefix,
            settings.params,
            settings.role,
            parent,
        )?;

        if let Some(parent) = parent {
            self.register_endpoints(id)?;
            self.checked_mut(parent)?.children.push(id);
        }
        Ok(id)
    }

    /// Construct one node with full prefix `prefix` and, depth-first, its
    /// declared components.
    #[allow(clippy::too_many_arguments)]
    fn construct(
        &mut self,
        path: KeyPath,
        key: &str,
        class: DeviceClass,
        prefix: String,
        params: Params,
        role: Option<String>,
        parent: Option<NodeId>,
    ) -> Result<NodeId, GraphError> {
        let parent_ref = match parent {
            Some(parent) => Some(self.parent_ref(parent)?),
            None => None,
        };

        let mut args = DeviceArgs::new(key, prefix.as_str(), params);
        args.parent = parent_ref;
        let device = (class.construct)(args).map_err(|source| GraphError::Device {
            path: path.clone(),
            source,
        })?;

        let id = NodeId(self.nodes.len());
        let components = device.components();
        self.nodes.push(DeviceNode {
            id,
            key: key.to_string(),
            path: path.clone(),
            class_id: class.id,
            prefix: prefix.clone(),
            parent,
            children: Vec::new(),
            role,
            endpoints: device.endpoints(),
            device,
        });

        for component in components {
            let child = self.construct(
                path.child(&component.name),
                &component.name,
                component.class,
                format!("{}{}", prefix, component.prefix),
                component.params,
                None,
                Some(id),
            )?;
            self.register_endpoints(child)?;
            self.nodes[id.0].children.push(child);
        }

        Ok(id)
    }

    fn parent_ref(&self, id: NodeId) -> Result<ParentRef, GraphError> {
        let node = self.checked(id)?;
        Ok(ParentRef {
            id,
            key: node.key.clone(),
            class: node.class_id.to_string(),
            prefix: node.prefix.clone(),
        })
    }

    fn register_endpoints(&mut self, id: NodeId) -> Result<(), GraphError> {
        let node = &self.nodes[id.0];
        let names = node.endpoint_names();
        self.registry
            .merge(id, &names)
            .map_err(|collision| GraphError::EndpointCollision {
                name: collision.name,
                existing: self.nodes[collision.existing.node.0].path.clone(),
                incoming: self.nodes[id.0].path.clone(),
            })
    }

    fn checked(&self, id: NodeId) -> Result<&DeviceNode, GraphError> {
        self.nodes.get(id.0).ok_or(GraphError::UnknownParent(id))
    }

    fn checked_mut(&mut self, id: NodeId) -> Result<&mut DeviceNode, GraphError> {
        self.nodes.get_mut(id.0).ok_or(GraphError::UnknownParent(id))
    }

    /// Record `id` as a member of `group`.
    pub fn add_to_group(&mut self, group: &str, id: NodeId) -> Result<(), GraphError> {
        self.checked(id)?;
        self.groups.entry(group.to_string()).or_default().push(id);
        Ok(())
    }

    /// Record `id` under `role`; a role names exactly one device.
    pub fn assign_role(&mut self, role: &str, id: NodeId) -> Result<(), GraphError> {
        let incoming = self.checked(id)?.path.clone();
        if let Some(existing) = self.roles.get(role) {
            return Err(GraphError::DuplicateRole {
                role: role.to_string(),
                existing: self.checked(*existing)?.path.clone(),
                incoming,
            });
        }
        self.roles.insert(role.to_string(), id);
        Ok(())
    }

    /// Append `id` to the beam transmission chain.
    pub fn add_to_transmission(&mut self, id: NodeId) -> Result<(), GraphError> {
        self.checked(id)?;
        self.transmission.push(id);
        Ok(())
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&DeviceNode> {
        self.nodes.get(id.0)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &DeviceNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find a node by its dotted configuration path, e.g. `energy.en.gap`.
    pub fn find(&self, path: &str) -> Option<&DeviceNode> {
        self.nodes.iter().find(|node| node.path.to_string() == path)
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    /// Resolve a fully qualified endpoint name.
    pub fn endpoint(&self, name: &str) -> Option<(&DeviceNode, &Endpoint)> {
        let handle = self.registry.get(name)?;
        let node = self.nodes.get(handle.node.0)?;
        Some((node, node.endpoints.get(handle.index)?))
    }

    pub fn group(&self, name: &str) -> &[NodeId] {
        self.groups.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn groups(&self) -> &BTreeMap<String, Vec<NodeId>> {
        &self.groups
    }

    pub fn role(&self, role: &str) -> Option<&DeviceNode> {
        self.roles.get(role).and_then(|id| self.node(*id))
    }

    /// Devices that attenuate the beam, upstream first.
    pub fn transmission(&self) -> &[NodeId] {
        &self.transmission
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    pub fn summary(&self) -> GraphSummary {
        let path_of = |id: &NodeId| self.nodes[id.0].path.clone();
        GraphSummary {
            nodes: self
                .nodes
                .iter()
                .map(|node| NodeSummary {
                    path: node.path.clone(),
                    class: node.class_id,
                    prefix: node.prefix.clone(),
                    parent: node.parent.as_ref().map(path_of),
                    role: node.role.clone(),
                    endpoints: self
                        .registry
                        .names_for(node.id)
                        .into_iter()
                        .map(str::to_string)
                        .collect(),
                })
                .collect(),
            groups: self
                .groups
                .iter()
                .map(|(group, ids)| (group.clone(), ids.iter().map(path_of).collect()))
                .collect(),
            roles: self
                .roles
                .iter()
                .map(|(role, id)| (role.clone(), path_of(id)))
                .collect(),
            transmission: self.transmission.iter().map(path_of).collect(),
            endpoint_count: self.registry.len(),
        }
    }
}
