//! Device trait and construction types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::endpoint::Endpoint;
use crate::error::DeviceError;
use crate::params::Params;

/// Index of a node in a device graph arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Non-owning reference to the parent of a device under construction.
///
/// Children use it to address state they depend on (e.g. signals on the
/// beamline root) without owning it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    pub id: NodeId,
    pub key: String,
    pub class: String,
    /// Full prefix of the parent (all ancestor prefixes concatenated).
    pub prefix: String,
}

/// Arguments handed to a device constructor.
#[derive(Debug, Clone)]
pub struct DeviceArgs {
    /// Configuration key of the device (or component name).
    pub key: String,

    /// Addressing prefix, relative to the parent.
    pub prefix: String,

    pub parent: Option<ParentRef>,

    /// Keyword parameters, never containing directives or `prefix`.
    pub params: Params,
}

impl DeviceArgs {
    pub fn new(key: impl Into<String>, prefix: impl Into<String>, params: Params) -> Self {
        Self {
            key: key.into(),
            prefix: prefix.into(),
            parent: None,
            params,
        }
    }

    pub fn with_parent(mut self, parent: ParentRef) -> Self {
        self.parent = Some(parent);
        self
    }

    /// The parent, or `MissingParent` for classes that cannot stand alone.
    pub fn require_parent(&self, class: &str) -> Result<&ParentRef, DeviceError> {
        self.parent.as_ref().ok_or_else(|| DeviceError::MissingParent {
            class: class.to_string(),
        })
    }
}

/// Constructor registered for a device class.
pub type Constructor = fn(DeviceArgs) -> Result<Box<dyn Device>, DeviceError>;

/// A constructible device type, identified by a dotted identifier such as
/// `beamsim.devices.motor.FakeMotor`.
#[derive(Debug, Clone, Copy)]
pub struct DeviceClass {
    pub id: &'static str,
    pub construct: Constructor,
}

impl DeviceClass {
    pub const fn new(id: &'static str, construct: Constructor) -> Self {
        Self { id, construct }
    }

    /// Trailing segment of the identifier.
    pub fn short_name(&self) -> &'static str {
        self.id.rsplit('.').next().unwrap_or(self.id)
    }
}

impl PartialEq for DeviceClass {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// A sub-device declared by its parent class, built with an explicit class
/// rather than a `_target` lookup.
#[derive(Debug, Clone)]
pub struct Component {
    pub name: String,
    pub class: DeviceClass,
    pub prefix: String,
    pub params: Params,
}

impl Component {
    pub fn new(name: impl Into<String>, class: DeviceClass, prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class,
            prefix: prefix.into(),
            params: Params::new(),
        }
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }
}

/// A constructed simulated device.
///
/// Construction must not start any background activity; live behavior is
/// attached later by the serving layer.
pub trait Device: fmt::Debug {
    /// Short class name, e.g. `FakeMotor`.
    fn class_name(&self) -> &'static str;

    /// Endpoints exposed by this device itself (not by its components).
    fn endpoints(&self) -> Vec<Endpoint>;

    /// Sub-devices to construct as children of this device.
    fn components(&self) -> Vec<Component> {
        Vec::new()
    }
}
