//! Beamline root device.

use beamsim_model::{Device, DeviceArgs, DeviceClass, DeviceError, Endpoint};

pub const BEAMLINE: DeviceClass = DeviceClass::new("beamsim.devices.beamline.Beamline", Beamline::construct);

const ENDSTATIONS: &[&str] = &[
    "RSoXS", "NEXAFS", "LARIAT", "LARIAT II", "UCAL", "HAXPES", "VPEEM", "pending", "conflict", "none",
];
const STATUSES: &[&str] = &["OK", "DUMPED", "FILLING"];

/// Root of a device graph: owns the shared beam state every instrument
/// reads from.
#[derive(Debug, Clone)]
pub struct Beamline {
    pub endstation: String,
}

impl Beamline {
    fn construct(args: DeviceArgs) -> Result<Box<dyn Device>, DeviceError> {
        args.params.reject_unknown("Beamline", &["endstation"])?;
        let endstation = args.params.str_or("Beamline", "endstation", "UCAL")?;
        if !ENDSTATIONS.contains(&endstation) {
            return Err(DeviceError::invalid(
                "Beamline",
                "endstation",
                format!("unknown endstation '{}'", endstation),
            ));
        }
        Ok(Box::new(Self {
            endstation: endstation.to_string(),
        }))
    }
}

impl Device for Beamline {
    fn class_name(&self) -> &'static str {
        "Beamline"
    }

    fn endpoints(&self) -> Vec<Endpoint> {
        vec![
            Endpoint::float("current", 500.0).read_only(),
            Endpoint::enumerated("Endstn-Sel", &self.endstation, ENDSTATIONS),
            Endpoint::enumerated("status", "OK", STATUSES),
        ]
    }
}
