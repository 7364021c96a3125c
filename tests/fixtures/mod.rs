//! Shared fixtures for integration tests
//!
//! `startup/` is a startup directory as the CLI expects it: a device file
//! in the instrument's own vocabulary plus a simulation overlay.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use beamsim::ConfigPaths;
use tempfile::TempDir;

/// Path to the fixture startup directory
pub fn startup_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/startup")
}

/// Config paths of the fixture startup directory
pub fn startup_paths() -> ConfigPaths {
    ConfigPaths::from_startup_dir(&startup_dir())
}

/// A temporary startup directory with the given file contents
pub struct ScratchDir {
    pub dir: TempDir,
}

impl ScratchDir {
    pub fn new(devices: &str, overlay: Option<&str>) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        fs::write(dir.path().join("devices.toml"), devices).expect("write devices.toml");
        if let Some(overlay) = overlay {
            fs::write(dir.path().join("sim_conf.toml"), overlay).expect("write sim_conf.toml");
        }
        Self { dir }
    }

    pub fn device_file(&self) -> PathBuf {
        self.dir.path().join("devices.toml")
    }

    /// Paths with the overlay only when one was written
    pub fn paths(&self) -> ConfigPaths {
        let overlay = self.dir.path().join("sim_conf.toml");
        ConfigPaths::new(self.device_file(), overlay.exists().then_some(overlay))
    }
}
