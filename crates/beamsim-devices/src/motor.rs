//! Fake motor record.

use beamsim_model::{Device, DeviceArgs, DeviceClass, DeviceError, Endpoint, Params};

pub const FAKE_MOTOR: DeviceClass = DeviceClass::new("beamsim.devices.motor.FakeMotor", FakeMotor::construct);

/// Motion settings shared by every motor-backed device.
#[derive(Debug, Clone, PartialEq)]
pub struct MotorSettings {
    pub velocity: f64,
    pub precision: i64,
    pub acceleration: f64,
    pub resolution: f64,
    pub user_limits: (f64, f64),
}

impl MotorSettings {
    /// Parameters read by [`MotorSettings::from_params`].
    pub const PARAMS: [&'static str; 5] = ["velocity", "precision", "acceleration", "resolution", "user_limits"];

    /// Read and validate the motor parameters for `class`.
    pub fn from_params(class: &str, params: &Params) -> Result<Self, DeviceError> {
        let settings = Self {
            velocity: params.f64_or(class, "velocity", 1.0)?,
            precision: params.i64_or(class, "precision", 3)?,
            acceleration: params.f64_or(class, "acceleration", 1.0)?,
            resolution: params.f64_or(class, "resolution", 1e-6)?,
            user_limits: params.pair_or(class, "user_limits", (-100.0, 100.0))?,
        };

        if settings.velocity <= 0.0 {
            return Err(DeviceError::invalid(class, "velocity", "must be positive"));
        }
        if settings.precision < 0 {
            return Err(DeviceError::invalid(class, "precision", "must not be negative"));
        }
        if settings.resolution <= 0.0 {
            return Err(DeviceError::invalid(class, "resolution", "must be positive"));
        }
        let (low, high) = settings.user_limits;
        if low > high {
            return Err(DeviceError::invalid(
                class,
                "user_limits",
                format!("low limit {} above high limit {}", low, high),
            ));
        }
        Ok(settings)
    }

    /// Motor record fields: setpoint, readback and motion settings.
    pub fn endpoints(&self) -> Vec<Endpoint> {
        let (low, high) = self.user_limits;
        vec![
            Endpoint::float("", 0.0).doc("Setpoint"),
            Endpoint::float(".RBV", 0.0).read_only().doc("Readback"),
            Endpoint::float(".VELO", self.velocity),
            Endpoint::float(".ACCL", self.acceleration),
            Endpoint::int(".PREC", self.precision),
            Endpoint::float(".MRES", self.resolution),
            Endpoint::float(".LLM", low),
            Endpoint::float(".HLM", high),
            Endpoint::int(".DMOV", 1).read_only(),
            Endpoint::int(".MOVN", 0).read_only(),
            Endpoint::int(".STOP", 0),
        ]
    }
}

/// A motor that moves towards its setpoint at `velocity`.
#[derive(Debug, Clone)]
pub struct FakeMotor {
    pub settings: MotorSettings,
}

impl FakeMotor {
    fn construct(args: DeviceArgs) -> Result<Box<dyn Device>, DeviceError> {
        args.params.reject_unknown("FakeMotor", &MotorSettings::PARAMS)?;
        let settings = MotorSettings::from_params("FakeMotor", &args.params)?;
        Ok(Box::new(Self { settings }))
    }
}

impl Device for FakeMotor {
    fn class_name(&self) -> &'static str {
        "FakeMotor"
    }

    fn endpoints(&self) -> Vec<Endpoint> {
        self.settings.endpoints()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(params: Params) -> Result<Box<dyn Device>, DeviceError> {
        (FAKE_MOTOR.construct)(DeviceArgs::new("m1", "M1:", params))
    }

    #[test]
    fn test_defaults() {
        let settings = MotorSettings::from_params("FakeMotor", &Params::new()).unwrap();
        assert_eq!(settings.velocity, 1.0);
        assert_eq!(settings.precision, 3);
        assert_eq!(settings.user_limits, (-100.0, 100.0));
    }

    #[test]
    fn test_velocity_reaches_endpoint() {
        let motor = build(Params::new().with("velocity", 2.5)).unwrap();
        let velo = motor
            .endpoints()
            .into_iter()
            .find(|ep| ep.name == ".VELO")
            .unwrap();
        assert_eq!(velo.value, beamsim_model::EndpointValue::Float(2.5));
    }

    #[test]
    fn test_rejects_non_positive_velocity() {
        let err = build(Params::new().with("velocity", 0)).unwrap_err();
        assert!(err.to_string().contains("velocity"));
    }

    #[test]
    fn test_rejects_misspelled_parameter() {
        let err = build(Params::new().with("velocty", 2.5)).unwrap_err();
        assert_eq!(
            err,
            DeviceError::UnknownParam {
                class: "FakeMotor".into(),
                param: "velocty".into(),
            }
        );
    }

    #[test]
    fn test_rejects_inverted_limits() {
        let err = build(Params::new().with("user_limits", json!([10, 0]))).unwrap_err();
        assert!(err.to_string().contains("user_limits"));
    }

    #[test]
    fn test_endpoint_names_unique() {
        let motor = build(Params::new()).unwrap();
        let mut names: Vec<_> = motor.endpoints().into_iter().map(|ep| ep.name).collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
    }
}
