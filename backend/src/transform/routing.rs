//! Cascade routes between systems that have no direct parameter set.
//!
//! A route lists the intermediate systems a batch passes through. Each hop
//! uses the parameter set keyed by the system it leaves, so a route
//! `A → C via [B]` applies the sets for `A` and then `B`.
//!
//! Routes are plain data: they are matched by exact `(source, target)` and
//! never searched as a graph.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};

/// Built-in cascade: СК-42 has parameters to ПЗ-90.11 only, and ПЗ-90.11 to WGS-84.
pub const SK42: &str = "СК-42";
pub const PZ90_11: &str = "ПЗ-90.11";
pub const WGS84: &str = "WGS-84";

/// A known multi-hop path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CascadeRoute {
    pub source: String,
    pub target: String,
    pub via: Vec<String>,
}

impl CascadeRoute {
    pub fn new(source: impl Into<String>, target: impl Into<String>, via: &[&str]) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            via: via.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Parameter keys applied in order: the source followed by every intermediate.
    pub fn legs(&self) -> Vec<&str> {
        std::iter::once(self.source.as_str())
            .chain(self.via.iter().map(String::as_str))
            .collect()
    }

    fn check(&self) -> ConfigResult<()> {
        if self.via.is_empty() {
            return Err(ConfigError::Routes(format!(
                "{} → {} has no intermediate system",
                self.source, self.target
            )));
        }
        if self.source == self.target {
            return Err(ConfigError::Routes(format!("{} routes to itself", self.source)));
        }
        for (i, hop) in self.via.iter().enumerate() {
            if hop == &self.source || hop == &self.target || self.via[..i].contains(hop) {
                return Err(ConfigError::Routes(format!(
                    "{} → {} revisits {}",
                    self.source, self.target, hop
                )));
            }
        }
        Ok(())
    }
}

/// Lookup table of cascade routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<CascadeRoute>,
}

impl RouteTable {
    /// A table with no cascades: every request is a single hop.
    pub fn empty() -> Self {
        Self { routes: Vec::new() }
    }

    /// Build from routes, rejecting malformed or duplicate entries.
    pub fn new(routes: Vec<CascadeRoute>) -> ConfigResult<Self> {
        for (i, route) in routes.iter().enumerate() {
            route.check()?;
            if routes[..i]
                .iter()
                .any(|r| r.source == route.source && r.target == route.target)
            {
                return Err(ConfigError::Routes(format!(
                    "duplicate route {} → {}",
                    route.source, route.target
                )));
            }
        }
        Ok(Self { routes })
    }

    /// Parse `[{ "source": .., "target": .., "via": [..] }, ..]`.
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let routes: Vec<CascadeRoute> = serde_json::from_str(content)?;
        Self::new(routes)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Load from `path` if given, otherwise use the built-in routes.
    pub fn load_or_default(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn find(&self, source: &str, target: &str) -> Option<&CascadeRoute> {
        self.routes
            .iter()
            .find(|r| r.source == source && r.target == target)
    }

    /// Parameter keys to apply for `source → target`, in order.
    pub fn resolve<'a>(&'a self, source: &'a str, target: &str) -> Vec<&'a str> {
        match self.find(source, target) {
            Some(route) => route.legs(),
            None => vec![source],
        }
    }

    pub fn routes(&self) -> &[CascadeRoute] {
        &self.routes
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            routes: vec![CascadeRoute::new(SK42, WGS84, &[PZ90_11])],
        }
    }
}
