//! Application configuration.
//!
//! Values come from the environment (a `.env` file is loaded first if
//! present). Anything unset falls back to the defaults below. CLI flags
//! override whatever is read here.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};
use crate::parameters::ParameterTable;
use crate::transform::engine::TransformEngine;
use crate::transform::routing::RouteTable;

/// Default source system for requests that do not name one.
pub const DEFAULT_SOURCE: &str = "СК-42";

/// Default target system for requests that do not name one.
pub const DEFAULT_TARGET: &str = "ГСК-2011";

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8000;

/// Maximum upload size (in bytes).
///
/// 10 MB limit.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Keep-alive ping interval.
pub const DEFAULT_KEEP_ALIVE_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Parameter table file; `None` uses the embedded table.
    pub parameters_path: Option<PathBuf>,
    /// Route file; `None` uses the built-in routes.
    pub routes_path: Option<PathBuf>,
    pub default_source: String,
    pub default_target: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    /// URL pinged periodically while serving.
    pub keep_alive_url: Option<String>,
    pub keep_alive_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            parameters_path: None,
            routes_path: None,
            default_source: DEFAULT_SOURCE.to_string(),
            default_target: DEFAULT_TARGET.to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            keep_alive_url: None,
            keep_alive_interval: Duration::from_secs(DEFAULT_KEEP_ALIVE_SECS),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        // Try loading .env file
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup (tests, embedding).
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            parameters_path: get("HELMERT_PARAMETERS").map(PathBuf::from),
            routes_path: get("HELMERT_ROUTES").map(PathBuf::from),
            default_source: get("HELMERT_SOURCE").unwrap_or(defaults.default_source),
            default_target: get("HELMERT_TARGET").unwrap_or(defaults.default_target),
            port: parse_var("PORT", get("PORT"))?.unwrap_or(defaults.port),
            max_upload_bytes: parse_var("HELMERT_MAX_UPLOAD_BYTES", get("HELMERT_MAX_UPLOAD_BYTES"))?
                .unwrap_or(defaults.max_upload_bytes),
            keep_alive_url: get("HELMERT_KEEP_ALIVE_URL"),
            keep_alive_interval: match parse_var::<u64>("HELMERT_KEEP_ALIVE_SECS", get("HELMERT_KEEP_ALIVE_SECS"))? {
                Some(0) => {
                    return Err(ConfigError::Env {
                        var: "HELMERT_KEEP_ALIVE_SECS".to_string(),
                        message: "interval must be at least 1 second".to_string(),
                    })
                }
                Some(secs) => Duration::from_secs(secs),
                None => defaults.keep_alive_interval,
            },
        })
    }

    /// Load the parameter table and routes this configuration points at.
    pub fn build_engine(&self) -> ConfigResult<TransformEngine> {
        let table = ParameterTable::load_or_embedded(self.parameters_path.as_deref())?;
        let routes = RouteTable::load_or_default(self.routes_path.as_deref())?;
        Ok(TransformEngine::new(table, routes))
    }
}

fn parse_var<T>(var: &str, raw: Option<String>) -> ConfigResult<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(|v| {
        v.trim().parse::<T>().map_err(|e| ConfigError::Env {
            var: var.to_string(),
            message: format!("'{}': {}", v, e),
        })
    })
    .transpose()
}
