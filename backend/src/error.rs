//! Error types for the Helmert transformation pipeline.
//!
//! This module defines one error type per concern:
//!
//! - [`ConfigError`] - Parameter table, route table and environment errors
//! - [`TransformError`] - Transform engine errors (unknown system, bad input)
//! - [`ReportError`] - Report formatter errors
//! - [`PipelineError`] - Top-level orchestration errors
//! - [`ServerError`] - HTTP layer errors
//!
//! CSV parsing errors live next to the parser ([`crate::parser::CsvError`])
//! because they carry line/column context.
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;

use thiserror::Error;

use crate::parser::CsvError;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while loading the parameter table, routes or environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Parameter or route file could not be read.
    #[error("Cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document is not valid JSON or does not deserialize.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Document does not match the parameter table schema.
    #[error("Parameter table does not match schema: {}", errors.join("; "))]
    Schema { errors: Vec<String> },

    /// A parameter value is NaN or infinite.
    #[error("Parameter '{field}' of system '{system}' is not a finite number")]
    NonFinite { system: String, field: &'static str },

    /// Invalid cascade route definition.
    #[error("Invalid route: {0}")]
    Routes(String),

    /// Malformed environment variable.
    #[error("Invalid value for {var}: {message}")]
    Env { var: String, message: String },
}

// =============================================================================
// Transformation Errors
// =============================================================================

/// Errors raised by the transform engine.
///
/// Any error aborts the whole call; no partially transformed sequence
/// is ever returned.
#[derive(Debug, Error, PartialEq)]
pub enum TransformError {
    /// Source system (or a cascade leg) has no parameter set.
    #[error("Unknown coordinate system: {system}")]
    UnknownSystem { system: String },

    /// Input point with a NaN or infinite coordinate.
    #[error("Point {index} ('{name}') has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize, name: String },
}

// =============================================================================
// Report Errors
// =============================================================================

/// Errors raised by the report formatter.
#[derive(Debug, Error, PartialEq)]
pub enum ReportError {
    /// Report requested over zero points.
    #[error("Cannot build a report from an empty point sequence")]
    EmptyInput,

    /// Before/after sequences are not paired one-to-one.
    #[error("Point count mismatch: {before} before, {after} after")]
    LengthMismatch { before: usize, after: usize },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by [`crate::transform::pipeline`].
/// It wraps all lower-level errors and adds pipeline-specific variants.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV parsing error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Transformation error.
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Report error.
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Points rejected before reaching the engine.
    #[error("Invalid points: {}", .0.join("; "))]
    InvalidPoints(Vec<String>),

    /// File IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Whether the failure was caused by the caller's input rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PipelineError::Csv(_)
                | PipelineError::Transform(_)
                | PipelineError::Report(_)
                | PipelineError::InvalidPoints(_)
        )
    }
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for engine operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for report rendering.
pub type ReportResult<T> = Result<T, ReportError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
