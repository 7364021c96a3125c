//! Slit: a motor whose opening gates beam transmission.

use beamsim_model::{Device, DeviceArgs, DeviceClass, DeviceError, Endpoint};

use crate::motor::MotorSettings;

pub const SLIT: DeviceClass = DeviceClass::new("beamsim.devices.slits.Slit", Slit::construct);

#[derive(Debug, Clone)]
pub struct Slit {
    pub motor: MotorSettings,
    /// Minimum opening that transmits any beam.
    pub trans_min: f64,
    /// Opening at which transmission is complete.
    pub trans_max: f64,
}

impl Slit {
    fn construct(args: DeviceArgs) -> Result<Box<dyn Device>, DeviceError> {
        let params = &args.params;
        let allowed: Vec<&str> = MotorSettings::PARAMS.into_iter().chain(["trans_min", "trans_max"]).collect();
        params.reject_unknown("Slit", &allowed)?;
        let trans_min = params.require_f64("Slit", "trans_min")?;
        let trans_max = params.require_f64("Slit", "trans_max")?;
        if trans_min >= trans_max {
            return Err(DeviceError::invalid(
                "Slit",
                "trans_max",
                format!("must exceed trans_min ({})", trans_min),
            ));
        }
        Ok(Box::new(Self {
            motor: MotorSettings::from_params("Slit", params)?,
            trans_min,
            trans_max,
        }))
    }
}

impl Device for Slit {
    fn class_name(&self) -> &'static str {
        "Slit"
    }

    fn endpoints(&self) -> Vec<Endpoint> {
        let mut endpoints = self.motor.endpoints();
        endpoints.push(
            Endpoint::float("transmission", 0.0)
                .read_only()
                .doc("Transmission through slit"),
        );
        endpoints
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beamsim_model::Params;

    #[test]
    fn test_requires_transmission_bounds() {
        let err = (SLIT.construct)(DeviceArgs::new("eslit", "", Params::new().with("trans_min", 10))).unwrap_err();
        assert_eq!(err, DeviceError::missing("Slit", "trans_max"));
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let params = Params::new().with("trans_min", 40).with("trans_max", 10);
        assert!((SLIT.construct)(DeviceArgs::new("eslit", "", params)).is_err());
    }

    #[test]
    fn test_exposes_motor_and_transmission() {
        let params = Params::new()
            .with("trans_min", 10)
            .with("trans_max", 40)
            .with("velocity", 10);
        let slit = (SLIT.construct)(DeviceArgs::new("eslit", "", params)).unwrap();
        let names: Vec<_> = slit.endpoints().into_iter().map(|ep| ep.name).collect();
        assert!(names.contains(&".RBV".to_string()));
        assert!(names.contains(&"transmission".to_string()));
    }
}
