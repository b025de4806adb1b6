//! Transformation module.
//!
//! - Helmert: the seven-parameter similarity transform
//! - Routing: cascade routes between systems
//! - Engine: route resolution and application
//! - Pipeline: CSV to transformed points and report

pub mod engine;
pub mod helmert;
pub mod pipeline;
pub mod routing;

pub use engine::{apply_legs, resolve_legs, transform, Leg, TransformEngine};
pub use helmert::HelmertTransform;
pub use pipeline::{run_bytes, run_file, run_points, CsvInfo, PipelineOptions, PipelineOutput};
pub use routing::{CascadeRoute, RouteTable};
