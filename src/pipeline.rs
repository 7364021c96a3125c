//! Pipeline orchestration
//!
//! Chains the stages from raw device file to device graph:
//! - Apply group defaults
//! - Hoist grouped items to the top level
//! - Translate targets
//! - Regroup by `_group`
//! - Apply the overlay file
//! - Validate classes and build the graph
//!
//! Every stage is a pure function of its inputs; this module only loads the
//! sources and threads the results through.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::classes::{ClassRegistry, ResolutionError};
use crate::config::{apply_defaults, load_toml_file, ConfigError, ConfigOrigin, ConfigPaths, ConfigSource};
use crate::graph::{DeviceGraph, GraphBuilder, GraphError};
use crate::overlay::{OverlayConfig, OverlayError};
use crate::translate::{
    flatten_groups, group_items, Diagnostic, GroupingError, Retention, TranslateError, TranslateOptions, Translation, TranslationTable, Translator,
};

/// Schema version for resolved configurations
pub const RESOLVED_SCHEMA_VERSION: u32 = 1;

/// Schema identifier for resolved configurations
pub const RESOLVED_SCHEMA_ID: &str = "beamsim/resolved_config@1";

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("translation error: {0}")]
    Translate(#[from] TranslateError),

    #[error("grouping error: {0}")]
    Grouping(#[from] GroupingError),

    #[error("overlay error: {0}")]
    Overlay(#[from] OverlayError),

    #[error("class resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PipelineError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Config(_) => 2,
            PipelineError::Grouping(_) => 2,
            PipelineError::Overlay(_) => 2,
            PipelineError::Translate(_) => 3,
            PipelineError::Resolution(_) => 4,
            PipelineError::Graph(GraphError::Target(_)) => 4,
            PipelineError::Graph(GraphError::Resolution { .. }) => 4,
            PipelineError::Graph(_) => 5,
            PipelineError::Io(_) => 1,
            PipelineError::Serialization(_) => 1,
        }
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// A grouped configuration with provenance (resolved_config.json)
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    /// Schema version
    pub schema_version: u32,

    /// Schema identifier
    pub schema_id: String,

    /// Timestamp of resolution
    pub created_at: DateTime<Utc>,

    /// `group → device → settings`
    pub config: Map<String, Value>,

    /// Files that contributed, device file first
    pub sources: Vec<ConfigSource>,

    /// Non-fatal findings, in the order they were recorded
    pub diagnostics: Vec<Diagnostic>,
}

impl ResolvedConfig {
    pub fn new(config: Map<String, Value>, sources: Vec<ConfigSource>, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            schema_version: RESOLVED_SCHEMA_VERSION,
            schema_id: RESOLVED_SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            config,
            sources,
            diagnostics,
        }
    }

    /// Total number of devices across all groups
    pub fn device_count(&self) -> usize {
        self.config
            .values()
            .filter_map(Value::as_object)
            .map(Map::len)
            .sum()
    }

    pub fn to_json_pretty(&self) -> PipelineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Apply defaults, translate targets and regroup a raw device configuration.
///
/// Group-shaped entries (see [`flatten_groups`]) are hoisted after defaults
/// are applied, so their items keep the enclosing key as their group unless
/// they name one. The translation table is the built-in table updated with `updates`
/// (later entries win).
pub fn convert_config(
    raw: &Map<String, Value>,
    updates: &TranslationTable,
    options: &TranslateOptions,
) -> PipelineResult<Translation> {
    let mut table = TranslationTable::with_builtin();
    table.update(updates);

    let items = flatten_groups(&apply_defaults(raw))?;
    let translation = Translator::new(&table, options).translate(&items)?;

    Ok(Translation {
        config: group_items(&translation.config),
        diagnostics: translation.diagnostics,
    })
}

/// Load the device file and optional overlay file and resolve them.
///
/// Overlay `[loaders]` entries take precedence over `updates`; the overlay
/// `[devices]` section is applied after grouping. An overlay path that is
/// given must exist.
pub fn load_device_config(
    paths: &ConfigPaths,
    updates: &TranslationTable,
    options: &TranslateOptions,
) -> PipelineResult<ResolvedConfig> {
    let devices = load_toml_file(&paths.device_file, ConfigOrigin::Devices)?;
    let mut sources = vec![devices.source];

    let overlay = match &paths.overlay_file {
        Some(path) => {
            let loaded = load_toml_file(path, ConfigOrigin::Overlay)?;
            sources.push(loaded.source);
            OverlayConfig::from_map(&loaded.data)?
        }
        None => OverlayConfig::default(),
    };

    let mut merged = updates.clone();
    merged.update(&overlay.loaders);

    let translation = convert_config(&devices.data, &merged, options)?;
    let config = overlay.devices.apply(&translation.config);

    Ok(ResolvedConfig::new(config, sources, translation.diagnostics))
}

/// A constructed graph and the configuration it was built from
#[derive(Debug)]
pub struct BuiltGraph {
    pub resolved: ResolvedConfig,
    pub graph: DeviceGraph,
}

/// Resolve the configuration for construction and build the device graph.
///
/// Translation keeps device parameters regardless of `options.retention`.
/// The builder's class registry validates every target before the first
/// device is constructed.
pub fn build_graph(
    paths: &ConfigPaths,
    updates: &TranslationTable,
    options: &TranslateOptions,
    builder: GraphBuilder,
) -> PipelineResult<BuiltGraph> {
    let options = options.clone().with_retention(Retention::Parameters);
    let resolved = load_device_config(paths, updates, &options)?;
    let graph = builder.build(&resolved.config)?;
    Ok(BuiltGraph { resolved, graph })
}

/// Builder over the built-in device catalog
pub fn default_builder() -> PipelineResult<GraphBuilder> {
    Ok(GraphBuilder::new(ClassRegistry::with_builtin()?))
}
