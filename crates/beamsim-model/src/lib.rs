//! Beamsim Model Types
//!
//! Shared vocabulary between the configuration pipeline and the simulated
//! instruments: the `Device` trait, construction arguments, parameters and
//! endpoint declarations.

pub mod device;
pub mod endpoint;
pub mod error;
pub mod params;

pub use device::{Component, Constructor, Device, DeviceArgs, DeviceClass, NodeId, ParentRef};
pub use endpoint::{Access, Endpoint, EndpointValue};
pub use error::DeviceError;
pub use params::Params;

/// Leading marker of reserved configuration fields (`_target`, `_group`, ...).
pub const RESERVED_MARKER: char = '_';

/// Returns true if a field name is a pipeline directive rather than a parameter.
pub fn is_reserved(field: &str) -> bool {
    field.starts_with(RESERVED_MARKER)
}
