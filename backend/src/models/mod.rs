//! Domain models for the Helmert transformation pipeline.
//!
//! - [`Point`] - Named Cartesian point (X, Y, Z in meters)
//! - [`TransformParameters`] - Seven-parameter Helmert set
//! - [`TransformRequest`] - Source/target system pair

use serde::{Deserialize, Serialize};

/// Dimensionless factor per ppm.
pub const PPM: f64 = 1e-6;

// =============================================================================
// Point
// =============================================================================

/// A named point in a 3D Cartesian reference frame.
///
/// Names need not be unique; before/after points are correlated by position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub fn new(name: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self { name: name.into(), x, y, z }
    }

    /// Coordinates as a column vector.
    pub fn coords(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Same name, new coordinates.
    pub fn with_coords(&self, [x, y, z]: [f64; 3]) -> Self {
        Self { name: self.name.clone(), x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// =============================================================================
// Transformation Parameters
// =============================================================================

/// Seven Helmert parameters taking coordinates out of one system.
///
/// Field names on the wire follow the domain notation (`ΔX`, `ωx`, `m`, ...);
/// plain ASCII aliases are accepted on input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TransformParameters {
    /// Translation along X, meters.
    #[serde(rename = "ΔX", alias = "dx")]
    pub dx: f64,
    /// Translation along Y, meters.
    #[serde(rename = "ΔY", alias = "dy")]
    pub dy: f64,
    /// Translation along Z, meters.
    #[serde(rename = "ΔZ", alias = "dz")]
    pub dz: f64,
    /// Rotation about X, radians.
    #[serde(rename = "ωx", alias = "wx")]
    pub wx: f64,
    /// Rotation about Y, radians.
    #[serde(rename = "ωy", alias = "wy")]
    pub wy: f64,
    /// Rotation about Z, radians.
    #[serde(rename = "ωz", alias = "wz")]
    pub wz: f64,
    /// Scale difference in parts per million.
    #[serde(rename = "m", alias = "scale_ppm")]
    pub scale_ppm: f64,
}

impl TransformParameters {
    /// Parameters that leave every point unchanged.
    pub const IDENTITY: Self = Self {
        dx: 0.0,
        dy: 0.0,
        dz: 0.0,
        wx: 0.0,
        wy: 0.0,
        wz: 0.0,
        scale_ppm: 0.0,
    };

    /// Pure translation.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        Self { dx, dy, dz, ..Self::IDENTITY }
    }

    /// Dimensionless scale difference `m`, i.e. ppm × 1e-6.
    pub fn scale_delta(&self) -> f64 {
        self.scale_ppm * PPM
    }

    /// Multiplier `s = 1 + m`.
    pub fn scale_factor(&self) -> f64 {
        1.0 + self.scale_delta()
    }

    pub fn translation_vector(&self) -> [f64; 3] {
        [self.dx, self.dy, self.dz]
    }

    /// Named fields in canonical order, for validation and display.
    pub fn fields(&self) -> [(&'static str, f64); 7] {
        [
            ("ΔX", self.dx),
            ("ΔY", self.dy),
            ("ΔZ", self.dz),
            ("ωx", self.wx),
            ("ωy", self.wy),
            ("ωz", self.wz),
            ("m", self.scale_ppm),
        ]
    }
}

// =============================================================================
// Transformation Request
// =============================================================================

/// Which pair of systems a batch moves between.
///
/// Only `source_system` indexes the parameter table; `target_system`
/// selects cascade routes and labels the report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransformRequest {
    pub source_system: String,
    pub target_system: String,
}

impl TransformRequest {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source_system: source.into(),
            target_system: target.into(),
        }
    }
}
