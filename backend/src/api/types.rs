//! REST API types for frontend integration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::Point;
use crate::report::stats::Statistics;
use crate::transform::pipeline::{CsvInfo, PipelineOutput};
use crate::transform::routing::CascadeRoute;

/// Response sent after a CSV upload is transformed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResponse {
    /// Unique job identifier
    pub job_id: String,

    /// Status: "ready" or "error"
    pub status: String,

    pub created_at: DateTime<Utc>,

    pub source_system: String,
    pub target_system: String,

    /// Parameter keys applied, in order
    pub route: Vec<String>,

    /// Transformed points, in input order
    pub points: Vec<Point>,

    pub statistics: Statistics,

    /// Markdown report
    pub report: String,

    pub csv_info: Option<CsvInfo>,
}

impl From<PipelineOutput> for TransformResponse {
    fn from(output: PipelineOutput) -> Self {
        TransformResponse {
            job_id: Uuid::new_v4().to_string(),
            status: "ready".to_string(),
            created_at: Utc::now(),
            source_system: output.request.source_system,
            target_system: output.request.target_system,
            route: output.route,
            points: output.after,
            statistics: output.statistics,
            report: output.report,
            csv_info: output.csv_info,
        }
    }
}

/// Known systems and cascade routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemsResponse {
    pub systems: Vec<String>,
    pub routes: Vec<CascadeRoute>,
    pub default_source: String,
    pub default_target: String,
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "points": [],
    })
}
