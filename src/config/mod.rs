//! Configuration sources and schema
//!
//! Loading of the TOML device and overlay files, per-group default
//! templates, value merging and the typed settings schema used when
//! constructing devices.

mod defaults;
mod merge;
mod path;
mod settings;
mod source;

pub use defaults::{apply_defaults, apply_group_defaults, DEFAULT_KEY};
pub use merge::{deep_merge, merge_field};
pub use path::KeyPath;
pub use settings::{DeviceSettings, SettingsError, GROUP_KEY, PREFIX_KEY, ROLE_KEY, TARGET_KEY};
pub use source::{
    load_toml_file, parse_toml_str, toml_to_json, ConfigError, ConfigOrigin, ConfigPaths, ConfigSource,
    LoadedSource, DEVICE_FILE_NAME, OVERLAY_FILE_NAME,
};
