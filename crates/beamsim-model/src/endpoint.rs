//! Endpoint declarations.
//!
//! An endpoint is a named value a device exposes for external read/write
//! access. Devices only declare endpoints here; serving them belongs to the
//! protocol layer.

use serde::{Deserialize, Serialize};

/// Access mode of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    ReadOnly,
    ReadWrite,
}

/// Initial value (and therefore type) of an endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum EndpointValue {
    Float(f64),
    Int(i64),
    Str(String),
    /// Enumerated value: index into `choices`.
    Enum { index: usize, choices: Vec<String> },
    /// Fixed-length waveform of floats.
    FloatArray(Vec<f64>),
    /// Fixed-length waveform of integers.
    IntArray(Vec<i64>),
}

/// A single endpoint declared by a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Suffix appended to the owning device's full prefix.
    pub name: String,

    pub value: EndpointValue,

    pub access: Access,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

impl Endpoint {
    fn new(name: impl Into<String>, value: EndpointValue) -> Self {
        Self {
            name: name.into(),
            value,
            access: Access::ReadWrite,
            doc: None,
        }
    }

    pub fn float(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, EndpointValue::Float(value))
    }

    pub fn int(name: impl Into<String>, value: i64) -> Self {
        Self::new(name, EndpointValue::Int(value))
    }

    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, EndpointValue::Str(value.into()))
    }

    /// Enumerated endpoint starting at `selected`, which must be one of `choices`.
    /// An unknown selection falls back to the first choice.
    pub fn enumerated(name: impl Into<String>, selected: &str, choices: &[&str]) -> Self {
        let index = choices.iter().position(|c| *c == selected).unwrap_or(0);
        Self::new(
            name,
            EndpointValue::Enum {
                index,
                choices: choices.iter().map(|c| c.to_string()).collect(),
            },
        )
    }

    pub fn float_array(name: impl Into<String>, len: usize) -> Self {
        Self::new(name, EndpointValue::FloatArray(vec![0.0; len]))
    }

    pub fn int_array(name: impl Into<String>, len: usize) -> Self {
        Self::new(name, EndpointValue::IntArray(vec![0; len]))
    }

    /// Mark the endpoint read-only.
    pub fn read_only(mut self) -> Self {
        self.access = Access::ReadOnly;
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn is_read_only(&self) -> bool {
        self.access == Access::ReadOnly
    }
}
