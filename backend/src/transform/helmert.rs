//! Seven-parameter Helmert transformation.
//!
//! ```text
//! ┌    ┐           ┌              ┐ ┌   ┐   ┌    ┐
//! │ X' │           │  1   ωz  -ωy │ │ X │   │ ΔX │
//! │ Y' │ = (1 + m) │ -ωz   1   ωx │ │ Y │ + │ ΔY │
//! │ Z' │           │  ωy  -ωx   1 │ │ Z │   │ ΔZ │
//! └    ┘           └              ┘ └   ┘   └    ┘
//! ```
//!
//! The rotation block is the small-angle linearization used by the
//! geodetic standards, not an orthogonal rotation matrix. `m` is stored in
//! ppm and scaled by 1e-6 before use.

use crate::models::{Point, TransformParameters};

/// A 3×3 row-major matrix.
pub type Matrix3 = [[f64; 3]; 3];

/// Linearized rotation matrix for rotations `wx, wy, wz` (radians).
pub fn rotation_matrix(wx: f64, wy: f64, wz: f64) -> Matrix3 {
    [
        [1.0, wz, -wy],
        [-wz, 1.0, wx],
        [wy, -wx, 1.0],
    ]
}

/// Precomputed affine map `p ↦ s·R·p + t` for one parameter set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelmertTransform {
    /// `s·R`
    linear: Matrix3,
    translation: [f64; 3],
}

impl HelmertTransform {
    pub fn from_parameters(params: &TransformParameters) -> Self {
        let scale = params.scale_factor();
        let rotation = rotation_matrix(params.wx, params.wy, params.wz);
        let linear = rotation.map(|row| row.map(|v| v * scale));
        Self {
            linear,
            translation: params.translation_vector(),
        }
    }

    /// The effective linear part `s·R`.
    pub fn matrix(&self) -> &Matrix3 {
        &self.linear
    }

    /// Apply the linear part only (no translation).
    pub fn apply_linear(&self, v: [f64; 3]) -> [f64; 3] {
        let m = *self.matrix();
        m.map(|row| row.iter().zip(v.iter()).map(|(r, c)| r * c).sum())
    }

    /// Transform raw coordinates.
    pub fn apply_coords(&self, v: [f64; 3]) -> [f64; 3] {
        let mut out = self.apply_linear(v);
        for (o, t) in out.iter_mut().zip(self.translation.iter()) {
            *o += t;
        }
        out
    }

    /// Transform one point, keeping its name.
    pub fn apply(&self, point: &Point) -> Point {
        point.with_coords(self.apply_coords(point.coords()))
    }

    /// Transform a sequence, preserving length and order.
    pub fn apply_all(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|p| self.apply(p)).collect()
    }
}
