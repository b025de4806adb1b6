//! # Helmert - seven-parameter coordinate transformation
//!
//! Transforms 3D Cartesian points between geodetic reference systems
//! (СК-42, СК-95, ГСК-2011, ПЗ-90.11, WGS-84) with the linearized Helmert
//! transform and renders a Markdown report of the computation.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│   Engine    │────▶│   Report    │
//! │ (UTF8/1251) │     │  (auto-enc) │     │  (cascade)  │     │ (Markdown)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!                                                ▲
//!                                         ParameterTable
//!                                          + RouteTable
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use helmert::{ParameterTable, Point};
//!
//! let table = ParameterTable::embedded()?;
//! let points = vec![Point::new("P1", 2_845_455.0, 2_160_954.0, 5_265_993.0)];
//! let moved = helmert::transform(&points, "СК-42", "WGS-84", &table)?;
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Points, parameters, requests
//! - [`parameters`] - Parameter table loading and lookup
//! - [`transform`] - Helmert math, routes, engine and pipeline
//! - [`report`] - Markdown report formatter
//! - [`parser`] - CSV parsing with auto-detection
//! - [`validation`] - Schema and point validation
//! - [`config`] - Environment configuration
//! - [`api`] - HTTP API server and log streaming

// Core modules
pub mod error;
pub mod models;

// Parameters
pub mod parameters;

// Transformation
pub mod transform;

// Reporting
pub mod report;

// Parsing
pub mod parser;

// Validation
pub mod validation;

// Configuration
pub mod config;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError,
    TransformError,
    ReportError,
    PipelineError,
    ServerError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Point, TransformParameters, TransformRequest};

// =============================================================================
// Re-exports - Parameters
// =============================================================================

pub use parameters::ParameterTable;

// =============================================================================
// Re-exports - Engine
// =============================================================================

pub use transform::{
    apply_legs,
    resolve_legs,
    transform,
    CascadeRoute,
    HelmertTransform,
    Leg,
    RouteTable,
    TransformEngine,
};

// =============================================================================
// Re-exports - Report
// =============================================================================

pub use report::{format_report, format_route_report, AxisStats, Statistics};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    parse_csv,
    parse_csv_file_auto,
    parse_bytes_auto,
    write_points_csv,
    detect_encoding,
    detect_delimiter,
    decode_content,
    CsvError,
    ParseResult,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{validate, validate_parameters, validate_points};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    run_file,
    run_bytes,
    run_points,
    PipelineOptions,
    PipelineOutput,
    CsvInfo,
};

// =============================================================================
// Re-exports - Config / API
// =============================================================================

pub use config::AppConfig;
pub use api::types::{error_response, SystemsResponse, TransformResponse};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
