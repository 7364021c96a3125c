//! Configuration sources
//!
//! Reads the TOML device and overlay files, converts them to JSON values
//! for the pipeline stages, and records where each one came from.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Device file name inside a startup directory
pub const DEVICE_FILE_NAME: &str = "devices.toml";

/// Overlay file name inside a startup directory
pub const OVERLAY_FILE_NAME: &str = "sim_conf.toml";

/// Role of a configuration source
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Devices,
    Overlay,
}

/// A contributing config source with provenance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    pub path: String,

    /// SHA-256 digest of raw file bytes
    pub digest: String,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Locations of the device file and optional overlay file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub device_file: PathBuf,
    pub overlay_file: Option<PathBuf>,
}

impl ConfigPaths {
    pub fn new(device_file: impl Into<PathBuf>, overlay_file: Option<PathBuf>) -> Self {
        Self {
            device_file: device_file.into(),
            overlay_file,
        }
    }

    /// `devices.toml` and `sim_conf.toml` inside a startup directory.
    pub fn from_startup_dir(dir: &Path) -> Self {
        Self {
            device_file: dir.join(DEVICE_FILE_NAME),
            overlay_file: Some(dir.join(OVERLAY_FILE_NAME)),
        }
    }
}

/// A parsed source file
#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub data: Map<String, Value>,
    pub source: ConfigSource,
}

/// Load and parse a TOML file, returning its top-level table and provenance
pub fn load_toml_file(path: &Path, origin: ConfigOrigin) -> Result<LoadedSource, ConfigError> {
    let bytes = fs::read(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hex::encode(hasher.finalize());

    let contents = String::from_utf8(bytes).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: format!("invalid UTF-8: {}", e),
    })?;

    let data = parse_toml_str(&contents).map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })?;

    Ok(LoadedSource {
        data,
        source: ConfigSource {
            origin,
            path: path.to_string_lossy().to_string(),
            digest,
        },
    })
}

/// Parse TOML text into a JSON object
pub fn parse_toml_str(contents: &str) -> Result<Map<String, Value>, String> {
    let table: toml::Table = toml::from_str(contents).map_err(|e| e.to_string())?;
    Ok(table
        .into_iter()
        .map(|(k, v)| (k, toml_to_json(v)))
        .collect())
}

/// Convert TOML Value to JSON Value
pub fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}
