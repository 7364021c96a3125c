//! Undulator + monochromator energy assembly.

use beamsim_model::{Component, Device, DeviceArgs, DeviceClass, DeviceError, Endpoint, Params};

use crate::motor::FAKE_MOTOR;

pub const ENERGY: DeviceClass = DeviceClass::new("beamsim.devices.energy.Energy", Energy::construct);
pub const MONO: DeviceClass = DeviceClass::new("beamsim.devices.energy.Mono", Mono::construct);
pub const MONO_MOTOR: DeviceClass = DeviceClass::new("beamsim.devices.energy.MonoMotor", MonoMotor::construct);
pub const MONO_GRATING: DeviceClass =
    DeviceClass::new("beamsim.devices.energy.MonoGrating", MonoGrating::construct);

const GRATING_SETPOINTS: &[&str] = &[
    "ZERO", "ONE", "250l/mm", "THREE", "FOUR", "FIVE", "SIX", "SEVEN", "EIGHT", "1200l/mm",
];
const GRATING_READBACKS: &[&str] = &["1200l/mm", "250l/mm"];

fn delay_param(class: &str, params: &Params, default: f64) -> Result<f64, DeviceError> {
    let delay = params.f64_or(class, "delay", default)?;
    if delay < 0.0 {
        return Err(DeviceError::invalid(class, "delay", "must not be negative"));
    }
    Ok(delay)
}

/// Energy axis: monochromator plus gap, phase and mode motors.
#[derive(Debug, Clone, Default)]
pub struct Energy;

impl Energy {
    fn construct(args: DeviceArgs) -> Result<Box<dyn Device>, DeviceError> {
        args.params.reject_unknown("Energy", &[])?;
        Ok(Box::new(Self))
    }
}

impl Device for Energy {
    fn class_name(&self) -> &'static str {
        "Energy"
    }

    fn endpoints(&self) -> Vec<Endpoint> {
        Vec::new()
    }

    fn components(&self) -> Vec<Component> {
        let motor = |name: &str, prefix: &str, velocity: f64| {
            Component::new(name, FAKE_MOTOR, prefix).with_params(
                Params::new()
                    .with("velocity", velocity)
                    .with("precision", 3),
            )
        };
        vec![
            Component::new("mono", MONO, "MonoMtr"),
            motor("gap", "GapMtr", 5000.0),
            motor("phase", "PhaseMtr", 5000.0),
            motor("mode", "ModeMtr", 100.0),
        ]
    }
}

/// Monochromator: energy motor, grating selector and cff.
#[derive(Debug, Clone, Default)]
pub struct Mono;

impl Mono {
    fn construct(args: DeviceArgs) -> Result<Box<dyn Device>, DeviceError> {
        args.params.reject_unknown("Mono", &[])?;
        Ok(Box::new(Self))
    }
}

impl Device for Mono {
    fn class_name(&self) -> &'static str {
        "Mono"
    }

    fn endpoints(&self) -> Vec<Endpoint> {
        vec![Endpoint::float(":CFF_SP", 1.55)]
    }

    fn components(&self) -> Vec<Component> {
        vec![
            Component::new("mono", MONO_MOTOR, ""),
            Component::new("gratingx", MONO_GRATING, "GrtX}Mtr"),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct MonoMotor {
    pub delay: f64,
}

impl MonoMotor {
    fn construct(args: DeviceArgs) -> Result<Box<dyn Device>, DeviceError> {
        args.params.reject_unknown("MonoMotor", &["delay"])?;
        let delay = delay_param("MonoMotor", &args.params, 0.1)?;
        Ok(Box::new(Self { delay }))
    }
}

impl Device for MonoMotor {
    fn class_name(&self) -> &'static str {
        "MonoMotor"
    }

    fn endpoints(&self) -> Vec<Endpoint> {
        vec![
            Endpoint::float(":ENERGY_SP", 500.0),
            Endpoint::float(":ENERGY_MON", 500.0).read_only(),
            Endpoint::float(":ENERGY_VELO", 200.0),
            Endpoint::int(":ERDY_STS", 0),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct MonoGrating {
    pub delay: f64,
}

impl MonoGrating {
    fn construct(args: DeviceArgs) -> Result<Box<dyn Device>, DeviceError> {
        args.params.reject_unknown("MonoGrating", &["delay"])?;
        let delay = delay_param("MonoGrating", &args.params, 0.5)?;
        Ok(Box::new(Self { delay }))
    }
}

impl Device for MonoGrating {
    fn class_name(&self) -> &'static str {
        "MonoGrating"
    }

    fn endpoints(&self) -> Vec<Endpoint> {
        vec![
            Endpoint::enumerated("_TYPE_SP", "1200l/mm", GRATING_SETPOINTS),
            Endpoint::enumerated("_TYPE_MON", "1200l/mm", GRATING_READBACKS).read_only(),
            Endpoint::int("_DCPL_CALC.PROC", 0),
            Endpoint::int("_ENA_CMD.PROC", 0),
            Endpoint::int("_KILL_CMD.PROC", 0),
            Endpoint::int("_HOME_CMD.PROC", 0),
            Endpoint::int("_ENC_LSS_CLR_CMD.PROC", 0),
            Endpoint::int("_AXIS_STS", 0),
        ]
    }
}
