//! Parameter Store - named Helmert parameter sets.
//!
//! Loads a JSON document mapping coordinate-system names to their seven
//! transformation parameters. The table is built completely before it is
//! handed out and exposes no mutation, so it can be shared across threads
//! behind an `Arc` without locking.
//!
//! ```json
//! {
//!   "СК-42": { "ΔX": 23.557, "ΔY": -140.844, "ΔZ": -79.778,
//!              "ωx": -1.115e-8, "ωy": -1.680e-6, "ωz": -3.850e-6, "m": -0.228 }
//! }
//! ```

use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult, TransformError, TransformResult};
use crate::models::TransformParameters;
use crate::validation::validate_parameters;

/// GOST 32453-2017 parameter sets compiled into the binary.
const EMBEDDED_TABLE: &str = include_str!("../../parameters/gost-32453-2017.json");

/// Read-only mapping from system name to parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterTable {
    entries: BTreeMap<String, TransformParameters>,
}

impl ParameterTable {
    /// Load a table from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate a table from a JSON string.
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let document: Value = serde_json::from_str(content)?;
        Self::from_value(document)
    }

    /// Validate a parsed document against the schema, then build the table.
    pub fn from_value(document: Value) -> ConfigResult<Self> {
        validate_parameters(&document).map_err(|errors| ConfigError::Schema { errors })?;

        let entries: BTreeMap<String, TransformParameters> = serde_json::from_value(document)?;
        for (system, params) in &entries {
            if let Some((field, _)) = params.fields().into_iter().find(|(_, v)| !v.is_finite()) {
                return Err(ConfigError::NonFinite { system: system.clone(), field });
            }
        }

        Ok(Self { entries })
    }

    /// The table shipped with the crate.
    pub fn embedded() -> ConfigResult<Self> {
        Self::from_json(EMBEDDED_TABLE)
    }

    /// Load from `path` if given, otherwise fall back to the embedded table.
    pub fn load_or_embedded(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Self::embedded(),
        }
    }

    /// Build a table directly from entries (tests, synthetic sets).
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, TransformParameters)>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Parameters for `system`, or [`TransformError::UnknownSystem`].
    pub fn lookup(&self, system: &str) -> TransformResult<&TransformParameters> {
        self.entries.get(system).ok_or_else(|| TransformError::UnknownSystem {
            system: system.to_string(),
        })
    }

    pub fn contains(&self, system: &str) -> bool {
        self.entries.contains_key(system)
    }

    /// System names in sorted order.
    pub fn systems(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TransformParameters)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
