//! Constructor parameters.
//!
//! `Params` holds the free-form keyword parameters left over once the
//! pipeline has removed every directive and the addressing prefix. Typed
//! accessors report the class and parameter name on mismatch.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DeviceError;

/// Keyword parameters passed to a device constructor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(Map<String, Value>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Fail on the first parameter (in key order) not listed in `allowed`.
    pub fn reject_unknown(&self, class: &str, allowed: &[&str]) -> Result<(), DeviceError> {
        match self.0.keys().find(|key| !allowed.contains(&key.as_str())) {
            Some(param) => Err(DeviceError::UnknownParam {
                class: class.to_string(),
                param: param.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Float parameter, `default` when absent. Integers are widened.
    pub fn f64_or(&self, class: &str, key: &str, default: f64) -> Result<f64, DeviceError> {
        match self.0.get(key) {
            None => Ok(default),
            Some(value) => value
                .as_f64()
                .ok_or_else(|| DeviceError::invalid(class, key, format!("expected a number, got {}", value))),
        }
    }

    /// Required float parameter.
    pub fn require_f64(&self, class: &str, key: &str) -> Result<f64, DeviceError> {
        if !self.0.contains_key(key) {
            return Err(DeviceError::missing(class, key));
        }
        self.f64_or(class, key, 0.0)
    }

    pub fn i64_or(&self, class: &str, key: &str, default: i64) -> Result<i64, DeviceError> {
        match self.0.get(key) {
            None => Ok(default),
            Some(value) => value
                .as_i64()
                .ok_or_else(|| DeviceError::invalid(class, key, format!("expected an integer, got {}", value))),
        }
    }

    pub fn str_or<'a>(&'a self, class: &str, key: &str, default: &'a str) -> Result<&'a str, DeviceError> {
        match self.0.get(key) {
            None => Ok(default),
            Some(value) => value
                .as_str()
                .ok_or_else(|| DeviceError::invalid(class, key, format!("expected a string, got {}", value))),
        }
    }

    /// Two-element numeric array such as `user_limits = [0, 10]`.
    pub fn pair_or(&self, class: &str, key: &str, default: (f64, f64)) -> Result<(f64, f64), DeviceError> {
        let Some(value) = self.0.get(key) else {
            return Ok(default);
        };
        let pair = value
            .as_array()
            .filter(|items| items.len() == 2)
            .and_then(|items| Some((items[0].as_f64()?, items[1].as_f64()?)));
        pair.ok_or_else(|| DeviceError::invalid(class, key, format!("expected [low, high], got {}", value)))
    }
}

impl From<Map<String, Value>> for Params {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_f64_defaults_when_absent() {
        let params = Params::new();
        assert_eq!(params.f64_or("FakeMotor", "velocity", 1.0).unwrap(), 1.0);
    }

    #[test]
    fn test_f64_widens_integers() {
        let params = Params::new().with("velocity", 10);
        assert_eq!(params.f64_or("FakeMotor", "velocity", 1.0).unwrap(), 10.0);
    }

    #[test]
    fn test_f64_rejects_strings() {
        let params = Params::new().with("velocity", "fast");
        let err = params.f64_or("FakeMotor", "velocity", 1.0).unwrap_err();
        assert!(err.to_string().contains("velocity"));
        assert!(err.to_string().contains("FakeMotor"));
    }

    #[test]
    fn test_require_missing() {
        let params = Params::new();
        let err = params.require_f64("Slit", "trans_min").unwrap_err();
        assert_eq!(err, DeviceError::missing("Slit", "trans_min"));
    }

    #[test]
    fn test_reject_unknown() {
        let params = Params::new().with("velocity", 1).with("velocty", 2);

        assert!(params.reject_unknown("FakeMotor", &["velocity", "velocty"]).is_ok());
        assert_eq!(
            params.reject_unknown("FakeMotor", &["velocity"]).unwrap_err(),
            DeviceError::UnknownParam {
                class: "FakeMotor".into(),
                param: "velocty".into(),
            }
        );
        assert!(Params::new().reject_unknown("Manipulator", &[]).is_ok());
    }

    #[test]
    fn test_pair() {
        let params = Params::new().with("user_limits", json!([0, 10]));
        assert_eq!(params.pair_or("FakeMotor", "user_limits", (-1.0, 1.0)).unwrap(), (0.0, 10.0));

        let bad = Params::new().with("user_limits", json!([0]));
        assert!(bad.pair_or("FakeMotor", "user_limits", (-1.0, 1.0)).is_err());
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let params = Params::new().with("velocity", 10).with("precision", 3);
        assert_eq!(serde_json::to_value(&params).unwrap(), json!({"velocity": 10, "precision": 3}));
    }
}
