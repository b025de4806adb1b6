//! Per-axis summary statistics of a point sequence.

use serde::Serialize;

use crate::models::Point;

/// Mean and sample standard deviation of one axis.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct AxisStats {
    pub mean: f64,
    /// `None` with fewer than two points.
    pub std: Option<f64>,
}

impl AxisStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let n = values.len();
        if n == 0 {
            return None;
        }

        let mean = values.iter().sum::<f64>() / n as f64;
        let std = (n > 1).then(|| {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (n - 1) as f64).sqrt()
        });

        Some(Self { mean, std })
    }
}

/// Statistics of X, Y and Z over a point sequence.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Statistics {
    pub count: usize,
    pub x: AxisStats,
    pub y: AxisStats,
    pub z: AxisStats,
}

impl Statistics {
    /// `None` for an empty sequence.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
        let zs: Vec<f64> = points.iter().map(|p| p.z).collect();

        Some(Self {
            count: points.len(),
            x: AxisStats::from_values(&xs)?,
            y: AxisStats::from_values(&ys)?,
            z: AxisStats::from_values(&zs)?,
        })
    }
}
