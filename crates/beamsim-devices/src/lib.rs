//! Simulated Beamline Instruments
//!
//! Declarations of the instruments the simulator can build: parameters they
//! accept, endpoints they expose and the sub-devices they are made of. Live
//! behavior (scan loops, put handlers) is attached by the serving layer.

pub mod beamline;
pub mod detectors;
pub mod energy;
pub mod manipulator;
pub mod mca;
pub mod motor;
pub mod shutters;
pub mod signals;
pub mod slits;

use beamsim_model::DeviceClass;

pub use beamline::{Beamline, BEAMLINE};
pub use detectors::{Adc, AdcKind, ADC};
pub use energy::{Energy, ENERGY};
pub use manipulator::{Manipulator, MultiMesh, MANIPULATOR, MULTI_MESH};
pub use mca::{Mca, MCA};
pub use motor::{FakeMotor, FAKE_MOTOR};
pub use shutters::{Shutter, SHUTTER};
pub use signals::{RingCurrent, RING_CURRENT};
pub use slits::{Slit, SLIT};

/// Every device class this crate provides.
pub fn catalog() -> Vec<DeviceClass> {
    vec![
        BEAMLINE,
        FAKE_MOTOR,
        SLIT,
        SHUTTER,
        ADC,
        RING_CURRENT,
        MANIPULATOR,
        MULTI_MESH,
        ENERGY,
        energy::MONO,
        energy::MONO_MOTOR,
        energy::MONO_GRATING,
        MCA,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_ids_unique() {
        let mut seen = HashSet::new();
        for class in catalog() {
            assert!(seen.insert(class.id), "duplicate class id {}", class.id);
        }
    }

    #[test]
    fn test_catalog_ids_are_qualified() {
        for class in catalog() {
            assert!(class.id.starts_with("beamsim.devices."), "{}", class.id);
        }
    }
}
