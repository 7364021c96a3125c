//! beamsim - simulated beamline device graph
//!
//! This crate turns a hierarchical TOML device configuration into a tree of
//! simulated devices whose endpoints share one flat namespace. The stages
//! (defaults, target translation, grouping, overlay, class resolution,
//! construction) are pure functions chained by [`pipeline`].

pub mod classes;
pub mod config;
pub mod graph;
pub mod overlay;
pub mod pipeline;
pub mod translate;

pub use classes::{ClassRegistry, ResolutionError};
pub use config::{ConfigError, ConfigPaths, KeyPath};
pub use graph::{DeviceGraph, DeviceNode, EndpointRegistry, GraphBuilder, GraphError};
pub use overlay::{OverlayConfig, OverlayError, OverlaySpec};
pub use pipeline::{build_graph, convert_config, load_device_config, PipelineError, ResolvedConfig};
pub use translate::{Diagnostic, TranslateError, TranslateOptions, TranslationTable, UnresolvedPolicy};
