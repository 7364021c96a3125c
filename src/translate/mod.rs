//! Target translation
//!
//! Walks a configuration tree and rewrites every `_target` identifier
//! through a translation table, so that real hardware classes are replaced
//! by simulated stand-ins. Lookup precedence is:
//!
//! 1. exact match of the full identifier
//! 2. match of the trailing short name (text after the last `.`)
//! 3. the default target, if one was supplied
//!
//! A node whose target matches nothing is either dropped with a diagnostic
//! (lenient) or rejected (strict).

mod group;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::{KeyPath, GROUP_KEY, PREFIX_KEY, TARGET_KEY};

pub use group::{flatten_groups, group_items, GroupingError, DEFAULT_GROUP};

/// Translations every table starts from.
pub const BUILTIN_TRANSLATIONS: &[(&str, &str)] = &[("EpicsMotor", "beamsim.devices.motor.FakeMotor")];

/// Trailing segment of a dotted identifier.
pub fn short_name(id: &str) -> &str {
    id.rsplit('.').next().unwrap_or(id)
}

/// Translation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TranslateError {
    #[error("{path}: target '{target}' has no translation and no default target was provided")]
    Unresolved { path: KeyPath, target: String },

    #[error("{path}: _target must be a string, got {value}")]
    InvalidTarget { path: KeyPath, value: String },

    #[error("{path}: translation for '{key}' must be a string, got {value}")]
    InvalidEntry {
        path: KeyPath,
        key: String,
        value: String,
    },
}

/// How a target was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Exact,
    ShortName,
    Default,
}

/// Outcome of a successful table lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved<'a> {
    pub target: &'a str,
    pub via: Resolution,
}

/// Mapping from target identifiers (full or short) to replacements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TranslationTable {
    entries: BTreeMap<String, String>,
}

impl TranslationTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Table seeded with `BUILTIN_TRANSLATIONS`
    pub fn with_builtin() -> Self {
        let mut table = Self::new();
        for (from, to) in BUILTIN_TRANSLATIONS {
            table.insert(*from, *to);
        }
        table
    }

    /// Insert or replace an entry.
    pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.entries.insert(from.into(), to.into());
    }

    /// Layer `other` on top of this table; its entries win.
    pub fn update(&mut self, other: &TranslationTable) {
        for (from, to) in &other.entries {
            self.entries.insert(from.clone(), to.clone());
        }
    }

    /// Parse a `[loaders]` style section: every value must be a string.
    pub fn from_section(section: &Map<String, Value>, path: &KeyPath) -> Result<Self, TranslateError> {
        let mut table = Self::new();
        for (key, value) in section {
            let to = value.as_str().ok_or_else(|| TranslateError::InvalidEntry {
                path: path.clone(),
                key: key.clone(),
                value: value.to_string(),
            })?;
            table.insert(key.as_str(), to);
        }
        Ok(table)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve `id` with exact > short name > default precedence.
    pub fn resolve<'a>(&'a self, id: &str, default_target: Option<&'a str>) -> Option<Resolved<'a>> {
        if let Some(target) = self.get(id) {
            return Some(Resolved {
                target,
                via: Resolution::Exact,
            });
        }
        if let Some(target) = self.get(short_name(id)) {
            return Some(Resolved {
                target,
                via: Resolution::ShortName,
            });
        }
        default_target.map(|target| Resolved {
            target,
            via: Resolution::Default,
        })
    }
}

/// What to do with a target that matches nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnresolvedPolicy {
    /// Fail the translation.
    #[default]
    Strict,
    /// Drop the node and record a diagnostic.
    Lenient,
}

/// Which non-structural fields survive translation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Retention {
    /// Only `_target`, `prefix`, `_group` and nested mappings (presentation view).
    #[default]
    Structural,
    /// Every field; used when the result feeds device construction.
    Parameters,
}

/// Translation options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslateOptions {
    pub default_target: Option<String>,
    pub policy: UnresolvedPolicy,
    pub retention: Retention,
}

impl TranslateOptions {
    pub fn lenient() -> Self {
        Self {
            policy: UnresolvedPolicy::Lenient,
            ..Self::default()
        }
    }

    pub fn with_default_target(mut self, target: impl Into<String>) -> Self {
        self.default_target = Some(target.into());
        self
    }

    pub fn with_policy(mut self, policy: UnresolvedPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_retention(mut self, retention: Retention) -> Self {
        self.retention = retention;
        self
    }
}

/// Non-fatal findings recorded during translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A node was dropped because its target has no translation.
    UnresolvedTarget { path: KeyPath, target: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedTarget { path, target } => write!(
                f,
                "{}: '{}' not found in translation table and no default target was provided; entry dropped",
                path,
                short_name(target)
            ),
        }
    }
}

/// Result of a translation pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Translation {
    pub config: Map<String, Value>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Rewrites `_target` identifiers through a translation table.
#[derive(Debug, Clone)]
pub struct Translator<'a> {
    table: &'a TranslationTable,
    options: &'a TranslateOptions,
}

impl<'a> Translator<'a> {
    pub fn new(table: &'a TranslationTable, options: &'a TranslateOptions) -> Self {
        Self { table, options }
    }

    /// Translate a configuration tree. The input is not modified.
    pub fn translate(&self, data: &Map<String, Value>) -> Result<Translation, TranslateError> {
        let mut diagnostics = Vec::new();
        let config = self
            .translate_node(data, &KeyPath::root(), &mut diagnostics)?
            .unwrap_or_default();
        Ok(Translation { config, diagnostics })
    }

    /// Returns `None` when the node was dropped.
    fn translate_node(
        &self,
        node: &Map<String, Value>,
        path: &KeyPath,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Option<Map<String, Value>>, TranslateError> {
        let mut out = Map::new();

        for (key, value) in node {
            match key.as_str() {
                TARGET_KEY => {
                    let target = value.as_str().ok_or_else(|| TranslateError::InvalidTarget {
                        path: path.child(key),
                        value: value.to_string(),
                    })?;
                    match self.table.resolve(target, self.options.default_target.as_deref()) {
                        Some(resolved) => {
                            out.insert(key.clone(), Value::String(resolved.target.to_string()));
                        }
                        None => return self.unresolved(path, target, diagnostics),
                    }
                }
                PREFIX_KEY | GROUP_KEY => {
                    out.insert(key.clone(), value.clone());
                }
                _ => match value {
                    Value::Object(child) => {
                        let translated = self.translate_node(child, &path.child(key), diagnostics)?;
                        if let Some(translated) = translated.filter(|m| !m.is_empty()) {
                            out.insert(key.clone(), Value::Object(translated));
                        }
                    }
                    other => {
                        if self.options.retention == Retention::Parameters {
                            out.insert(key.clone(), other.clone());
                        }
                    }
                },
            }
        }

        Ok(Some(out))
    }

    fn unresolved(
        &self,
        path: &KeyPath,
        target: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Option<Map<String, Value>>, TranslateError> {
        match self.options.policy {
            UnresolvedPolicy::Strict => Err(TranslateError::Unresolved {
                path: path.clone(),
                target: target.to_string(),
            }),
            UnresolvedPolicy::Lenient => {
                diagnostics.push(Diagnostic::UnresolvedTarget {
                    path: path.clone(),
                    target: target.to_string(),
                });
                Ok(None)
            }
        }
    }
}
