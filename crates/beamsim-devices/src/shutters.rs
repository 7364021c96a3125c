//! Photon shutter with open/close commands.

use beamsim_model::{Device, DeviceArgs, DeviceClass, DeviceError, Endpoint};

pub const SHUTTER: DeviceClass = DeviceClass::new("beamsim.devices.shutters.Shutter", Shutter::construct);

#[derive(Debug, Clone)]
pub struct Shutter {
    /// Seconds between a command and the state change.
    pub delay: f64,
    pub openval: i64,
    pub closeval: i64,
}

impl Shutter {
    fn construct(args: DeviceArgs) -> Result<Box<dyn Device>, DeviceError> {
        let params = &args.params;
        params.reject_unknown("Shutter", &["delay", "openval", "closeval"])?;
        let delay = params.f64_or("Shutter", "delay", 0.5)?;
        if delay < 0.0 {
            return Err(DeviceError::invalid("Shutter", "delay", "must not be negative"));
        }
        let openval = params.i64_or("Shutter", "openval", 0)?;
        let closeval = params.i64_or("Shutter", "closeval", 1)?;
        if openval == closeval {
            return Err(DeviceError::invalid(
                "Shutter",
                "closeval",
                "must differ from openval",
            ));
        }
        Ok(Box::new(Self {
            delay,
            openval,
            closeval,
        }))
    }
}

impl Device for Shutter {
    fn class_name(&self) -> &'static str {
        "Shutter"
    }

    fn endpoints(&self) -> Vec<Endpoint> {
        vec![
            Endpoint::int("Pos-Sts", self.openval).read_only(),
            Endpoint::int("Cmd:Cls-Cmd", 0),
            Endpoint::int("Cmd:Opn-Cmd", 0),
            Endpoint::int("Err-Sts", 0),
            Endpoint::float("transmission", 0.0).read_only(),
        ]
    }
}
