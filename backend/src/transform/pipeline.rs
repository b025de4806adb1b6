//! High-level pipeline API: CSV in, transformed points and report out.
//!
//! This module combines all steps: parsing, validation, route
//! resolution, transformation, statistics and report rendering.
//!
//! # Example
//!
//! ```rust,ignore
//! use helmert::transform::pipeline::{run_file, PipelineOptions};
//! use helmert::TransformEngine;
//! use std::path::Path;
//!
//! let engine = TransformEngine::new(ParameterTable::embedded()?, RouteTable::default());
//! let output = run_file(Path::new("points.csv"), &engine, &PipelineOptions::default())?;
//! println!("{}", output.report);
//! ```

use serde::Serialize;
use std::path::Path;

use crate::api::logs::{log_error, log_info, log_info_indent, log_success, log_warning};
use crate::config::{DEFAULT_SOURCE, DEFAULT_TARGET};
use crate::error::{PipelineError, PipelineResult, ReportError};
use crate::models::{Point, TransformRequest};
use crate::parser::{parse_bytes_auto, parse_csv_file_auto, ParseResult};
use crate::report::{format_route_report, stats::Statistics};
use crate::validation::validate_points;

use super::engine::{apply_legs, TransformEngine};

/// Options for the transformation pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    /// System the input coordinates are expressed in
    pub source: String,
    /// System the caller wants to end up in
    pub target: String,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            target: DEFAULT_TARGET.to_string(),
        }
    }
}

impl PipelineOptions {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// CSV file information
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

impl CsvInfo {
    fn from_parse(parsed: &ParseResult) -> Self {
        Self {
            encoding: parsed.encoding.clone(),
            delimiter: parsed.delimiter,
            headers: parsed.headers.clone(),
            row_count: parsed.points.len(),
        }
    }
}

/// Result of a complete pipeline run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutput {
    pub request: TransformRequest,
    /// Systems whose parameters were applied, in order
    pub route: Vec<String>,
    pub before: Vec<Point>,
    pub after: Vec<Point>,
    /// Statistics of the transformed coordinates
    pub statistics: Statistics,
    /// Markdown report
    pub report: String,
    /// `None` when points were supplied directly
    pub csv_info: Option<CsvInfo>,
}

/// Transform a CSV file.
///
/// This is the main entry point for the pipeline. It:
/// 1. Parses the CSV with auto-detection
/// 2. Validates the points
/// 3. Resolves every leg of the route
/// 4. Applies the transformation
/// 5. Computes statistics and renders the report
pub fn run_file(
    path: &Path,
    engine: &TransformEngine,
    options: &PipelineOptions,
) -> PipelineResult<PipelineOutput> {
    log_info(format!("📖 Reading {}...", path.display()));
    let parsed = parse_csv_file_auto(path)?;
    run_parsed(parsed, engine, options)
}

/// Transform CSV bytes.
///
/// Same as `run_file` but accepts raw bytes instead of a file path.
pub fn run_bytes(
    bytes: &[u8],
    engine: &TransformEngine,
    options: &PipelineOptions,
) -> PipelineResult<PipelineOutput> {
    log_info(format!("📖 Reading CSV upload ({} bytes)...", bytes.len()));
    let parsed = parse_bytes_auto(bytes)?;
    run_parsed(parsed, engine, options)
}

/// Transform already-parsed points.
pub fn run_points(
    points: Vec<Point>,
    engine: &TransformEngine,
    options: &PipelineOptions,
) -> PipelineResult<PipelineOutput> {
    run_inner(points, None, engine, options)
}

fn run_parsed(
    parsed: ParseResult,
    engine: &TransformEngine,
    options: &PipelineOptions,
) -> PipelineResult<PipelineOutput> {
    log_success(format!("Detected encoding: {}", parsed.encoding));
    log_success(format!("Detected separator: '{}'", format_delimiter(parsed.delimiter)));
    log_success(format!("Read {} points", parsed.points.len()));

    let extra: Vec<&str> = parsed
        .headers
        .iter()
        .map(String::as_str)
        .filter(|h| !crate::parser::REQUIRED_COLUMNS.contains(h))
        .collect();
    if !extra.is_empty() {
        log_warning(format!("Ignoring columns: {}", extra.join(", ")));
    }

    let csv_info = CsvInfo::from_parse(&parsed);
    run_inner(parsed.points, Some(csv_info), engine, options)
}

fn run_inner(
    before: Vec<Point>,
    csv_info: Option<CsvInfo>,
    engine: &TransformEngine,
    options: &PipelineOptions,
) -> PipelineResult<PipelineOutput> {
    log_info("✔️  Validating points...");
    if let Err(errors) = validate_points(&before) {
        for err in errors.iter().take(3) {
            log_error(err.clone());
        }
        return Err(PipelineError::InvalidPoints(errors));
    }

    log_info(format!("🗺️  Resolving route {} → {}...", options.source, options.target));
    let legs = engine.resolve(&options.source, &options.target).map_err(|e| {
        log_error(e.to_string());
        e
    })?;
    let route: Vec<String> = legs.iter().map(|leg| leg.system.clone()).collect();
    if legs.len() > 1 {
        log_success(format!("Cascade via {}", route[1..].join(" → ")));
    }
    for leg in &legs {
        log_info_indent(format!("{} parameters loaded", leg.system), 1);
    }

    log_info("⚙️  Applying Helmert transformation...");
    let after = apply_legs(&before, &legs)?;
    log_success(format!("Transformed {} points", after.len()));

    let statistics = Statistics::from_points(&after).ok_or(ReportError::EmptyInput)?;
    let report = format_route_report(&before, &after, &options.source, &options.target, &legs)?;
    log_success("Report generated");

    Ok(PipelineOutput {
        request: TransformRequest::new(options.source.clone(), options.target.clone()),
        route,
        before,
        after,
        statistics,
        report,
        csv_info,
    })
}

/// Format delimiter for display
fn format_delimiter(d: char) -> &'static str {
    match d {
        ';' => ";",
        ',' => ",",
        '\t' => "TAB",
        '|' => "|",
        _ => "?",
    }
}
