//! Sample manipulators built from fake motors.

use beamsim_model::{Component, Device, DeviceArgs, DeviceClass, DeviceError, Endpoint, Params};

use crate::motor::FAKE_MOTOR;

pub const MANIPULATOR: DeviceClass =
    DeviceClass::new("beamsim.devices.manipulator.Manipulator", Manipulator::construct);

pub const MULTI_MESH: DeviceClass =
    DeviceClass::new("beamsim.devices.manipulator.MultiMesh", MultiMesh::construct);

fn axis(name: &str, prefix: &str, velocity: f64) -> Component {
    Component::new(name, FAKE_MOTOR, prefix).with_params(
        Params::new()
            .with("velocity", velocity)
            .with("precision", 3),
    )
}

/// Four-axis (x, y, z, rotation) sample manipulator.
#[derive(Debug, Clone, Default)]
pub struct Manipulator;

impl Manipulator {
    fn construct(args: DeviceArgs) -> Result<Box<dyn Device>, DeviceError> {
        args.params.reject_unknown("Manipulator", &[])?;
        Ok(Box::new(Self))
    }
}

impl Device for Manipulator {
    fn class_name(&self) -> &'static str {
        "Manipulator"
    }

    fn endpoints(&self) -> Vec<Endpoint> {
        Vec::new()
    }

    fn components(&self) -> Vec<Component> {
        vec![
            axis("x", "SampX}Mtr", 2.0),
            axis("y", "SampY}Mtr", 2.0),
            axis("z", "SampZ}Mtr", 2.0),
            axis("r", "SampTh}Mtr", 2.0),
        ]
    }
}

/// Single-axis multi-mesh holder.
#[derive(Debug, Clone, Default)]
pub struct MultiMesh;

impl MultiMesh {
    fn construct(args: DeviceArgs) -> Result<Box<dyn Device>, DeviceError> {
        args.params.reject_unknown("MultiMesh", &[])?;
        Ok(Box::new(Self))
    }
}

impl Device for MultiMesh {
    fn class_name(&self) -> &'static str {
        "MultiMesh"
    }

    fn endpoints(&self) -> Vec<Endpoint> {
        Vec::new()
    }

    fn components(&self) -> Vec<Component> {
        vec![axis("x", "MMesh}Mtr", 10.0)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manipulator_axes() {
        let device = (MANIPULATOR.construct)(DeviceArgs::new("manipulator", "XF:07ID1-ES{Manip:", Params::new())).unwrap();
        let names: Vec<_> = device.components().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["x", "y", "z", "r"]);
        assert!(device.components().iter().all(|c| c.class == FAKE_MOTOR));
    }

    #[test]
    fn test_manipulator_takes_no_parameters() {
        let params = Params::new().with("velocity", 2.0);
        let err = (MANIPULATOR.construct)(DeviceArgs::new("manipulator", "M{", params)).unwrap_err();
        assert_eq!(err.to_string(), "Manipulator: unknown parameter 'velocity'");
    }

    #[test]
    fn test_axis_prefixes_distinct() {
        let components = Manipulator.components();
        let mut prefixes: Vec<_> = components.iter().map(|c| c.prefix.as_str()).collect();
        prefixes.sort();
        prefixes.dedup();
        assert_eq!(prefixes.len(), 4);
    }

    #[test]
    fn test_multimesh_velocity() {
        let x = &MultiMesh.components()[0];
        assert_eq!(x.params.get("velocity"), Some(&serde_json::json!(10.0)));
    }
}
