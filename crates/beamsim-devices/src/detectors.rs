//! ADC-backed beam detectors.
//!
//! Every detector reads beam intensity from the beamline it is attached to,
//! so it cannot be built without a parent.

use std::fmt;
use std::str::FromStr;

use beamsim_model::{Device, DeviceArgs, DeviceClass, DeviceError, Endpoint, NodeId};

pub const ADC: DeviceClass = DeviceClass::new("beamsim.devices.detectors.Adc", Adc::construct);

/// What the detector measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcKind {
    /// Sample current, scaled by manipulator overlap.
    Sc,
    /// Incoming flux.
    I0,
    /// Reference foil.
    Ref,
    /// Transmitted flux.
    I1,
}

impl FromStr for AdcKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sc" => Ok(Self::Sc),
            "i0" => Ok(Self::I0),
            "ref" => Ok(Self::Ref),
            "i1" => Ok(Self::I1),
            other => Err(format!("unknown detector kind '{}' (expected sc, i0, ref or i1)", other)),
        }
    }
}

impl fmt::Display for AdcKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Sc => "sc",
            Self::I0 => "i0",
            Self::Ref => "ref",
            Self::I1 => "i1",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct Adc {
    pub kind: AdcKind,
    /// Standard deviation of the simulated readout noise.
    pub sigma: f64,
    /// Node the intensity is read from.
    pub source: NodeId,
}

impl Adc {
    fn construct(args: DeviceArgs) -> Result<Box<dyn Device>, DeviceError> {
        let source = args.require_parent("Adc")?.id;
        args.params.reject_unknown("Adc", &["kind", "sigma"])?;
        let kind = args
            .params
            .str_or("Adc", "kind", "sc")?
            .parse::<AdcKind>()
            .map_err(|reason| DeviceError::invalid("Adc", "kind", reason))?;
        let sigma = args.params.f64_or("Adc", "sigma", 0.05)?;
        if sigma < 0.0 {
            return Err(DeviceError::invalid("Adc", "sigma", "must not be negative"));
        }
        Ok(Box::new(Self { kind, sigma, source }))
    }
}

impl Device for Adc {
    fn class_name(&self) -> &'static str {
        "Adc"
    }

    fn endpoints(&self) -> Vec<Endpoint> {
        vec![Endpoint::float("Volt", 0.0).read_only().doc("ADC Value")]
    }
}
