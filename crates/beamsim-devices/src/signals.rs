//! Ring current signal.

use beamsim_model::{Device, DeviceArgs, DeviceClass, DeviceError, Endpoint, NodeId};

pub const RING_CURRENT: DeviceClass =
    DeviceClass::new("beamsim.devices.signals.RingCurrent", RingCurrent::construct);

/// Mirrors the storage ring current computed by its parent.
#[derive(Debug, Clone)]
pub struct RingCurrent {
    pub source: NodeId,
}

impl RingCurrent {
    fn construct(args: DeviceArgs) -> Result<Box<dyn Device>, DeviceError> {
        let source = args.require_parent("RingCurrent")?.id;
        args.params.reject_unknown("RingCurrent", &[])?;
        Ok(Box::new(Self { source }))
    }
}

impl Device for RingCurrent {
    fn class_name(&self) -> &'static str {
        "RingCurrent"
    }

    fn endpoints(&self) -> Vec<Endpoint> {
        vec![Endpoint::float("", 0.0).read_only().doc("Ring Current")]
    }
}
