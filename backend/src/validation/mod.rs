//! Input validation for parameter documents and point sequences.
//!
//! # Parameter documents
//!
//! Parameter tables are checked against a JSON Schema (Draft 7) embedded
//! at compile time from `schemas/helmert-parameters.json` before they are
//! deserialized, so every missing or non-numeric field is reported at once.
//!
//! # Points
//!
//! The engine assumes well-typed, finite input. [`validate_points`] is the
//! collaborator-side gate that rejects a batch before it reaches the engine.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use helmert::validation::validate_parameters;
//!
//! let doc = json!({
//!     "СК-42": { "ΔX": 23.557, "ΔY": -140.844, "ΔZ": -79.778,
//!                "ωx": 0.0, "ωy": 0.0, "ωz": 0.0, "m": -0.228 }
//! });
//! assert!(validate_parameters(&doc).is_ok());
//! ```

use serde_json::Value;

use crate::models::Point;

const PARAMETERS_SCHEMA: &str = include_str!("../../schemas/helmert-parameters.json");

/// Validate a JSON value against a JSON schema.
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(Vec<String>)` with every violation otherwise
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a parameter table document against the embedded schema.
pub fn validate_parameters(data: &Value) -> Result<(), Vec<String>> {
    let schema: Value = serde_json::from_str(PARAMETERS_SCHEMA)
        .map_err(|e| vec![format!("Invalid embedded schema: {}", e)])?;
    validate(&schema, data)
}

/// Check a point batch before transformation.
///
/// Rejects empty batches and any point with a NaN or infinite coordinate.
/// At most ten offending points are listed.
pub fn validate_points(points: &[Point]) -> Result<(), Vec<String>> {
    if points.is_empty() {
        return Err(vec!["no points to transform".to_string()]);
    }

    let bad: Vec<&Point> = points.iter().filter(|p| !p.is_finite()).collect();
    if bad.is_empty() {
        return Ok(());
    }

    let mut errors: Vec<String> = bad
        .iter()
        .take(10)
        .map(|p| format!("point '{}' has a non-finite coordinate ({}, {}, {})", p.name, p.x, p.y, p.z))
        .collect();
    if bad.len() > 10 {
        errors.push(format!("... and {} more", bad.len() - 10));
    }
    Err(errors)
}
