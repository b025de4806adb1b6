//! HTTP Server for the helmert API.
//!
//! Provides REST endpoints for CSV upload, transformation and reports.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                          |
//! |--------|-------------------|--------------------------------------|
//! | GET    | `/health`         | Health check                         |
//! | GET    | `/api/systems`    | Known systems and cascade routes     |
//! | POST   | `/api/transform`  | Upload CSV, get transformed points   |
//! | POST   | `/api/report`     | Upload CSV, get a Markdown report    |
//! | GET    | `/api/logs`       | SSE stream for real-time logs        |

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::keep_alive;
use super::logs::{log_error, log_info, LOG_BROADCASTER};
use super::types::{error_response, SystemsResponse, TransformResponse};
use crate::config::AppConfig;
use crate::error::{ServerError, ServerResult};
use crate::transform::engine::TransformEngine;
use crate::transform::pipeline::{run_bytes, PipelineOptions, PipelineOutput};

/// Shared, read-only server state
pub struct AppState {
    pub engine: TransformEngine,
    pub config: AppConfig,
}

type SharedState = Arc<AppState>;

/// Start the HTTP server
pub async fn start_server(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Parameters and routes are loaded once, before binding
    let engine = config.build_engine()?;
    let port = config.port;

    if let Some(url) = config.keep_alive_url.clone() {
        keep_alive::spawn(url, config.keep_alive_interval);
    }

    let state = Arc::new(AppState { engine, config });
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 Helmert server running on http://localhost:{}", port);
    println!("   GET  /api/systems   - Known systems and routes");
    println!("   POST /api/transform - Upload CSV, get JSON");
    println!("   POST /api/report    - Upload CSV, get report.md");
    println!("   GET  /api/logs      - SSE log stream");
    println!("   GET  /health        - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the application router.
pub fn router(state: SharedState) -> Router {
    // Permissive CORS
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/systems", get(systems))
        .route("/api/transform", post(transform_csv))
        .route("/api/report", post(report_csv))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state)
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::Pipeline(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Pipeline(_) | ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(error_response(&self.to_string()))).into_response()
    }
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "helmert",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "systems": "GET /api/systems",
            "transform": "POST /api/transform",
            "report": "POST /api/report",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// Known systems endpoint
async fn systems(State(state): State<SharedState>) -> Json<SystemsResponse> {
    Json(SystemsResponse {
        systems: state.engine.table().systems().map(str::to_string).collect(),
        routes: state.engine.routes().routes().to_vec(),
        default_source: state.config.default_source.clone(),
        default_target: state.config.default_target.clone(),
    })
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Upload CSV endpoint returning JSON
async fn transform_csv(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> ServerResult<Json<TransformResponse>> {
    let output = run_upload(state, multipart).await?;
    Ok(Json(TransformResponse::from(output)))
}

/// Upload CSV endpoint returning the Markdown report as a download
async fn report_csv(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> ServerResult<Response> {
    let output = run_upload(state, multipart).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"report.md\""),
        ],
        output.report,
    )
        .into_response())
}

/// Fields of a transform upload
struct Upload {
    file_name: Option<String>,
    bytes: Vec<u8>,
    source: Option<String>,
    target: Option<String>,
}

async fn read_upload(mut multipart: Multipart) -> ServerResult<Upload> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut source: Option<String> = None;
    let mut target: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        let read_err = |e: axum::extract::multipart::MultipartError| {
            ServerError::BadRequest(format!("Read error: {}", e))
        };

        match name.as_str() {
            "file" => {
                file_name = field.file_name().map(|s| s.to_string());
                file_data = Some(field.bytes().await.map_err(read_err)?.to_vec());
            }
            "source" => source = Some(field.text().await.map_err(read_err)?),
            "target" => target = Some(field.text().await.map_err(read_err)?),
            _ => {}
        }
    }

    let bytes = file_data.ok_or_else(|| ServerError::BadRequest("No file provided".to_string()))?;

    Ok(Upload {
        file_name,
        bytes,
        source: source.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
        target: target.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
    })
}

async fn run_upload(state: SharedState, multipart: Multipart) -> ServerResult<PipelineOutput> {
    let upload = read_upload(multipart).await?;

    let options = PipelineOptions::new(
        upload.source.unwrap_or_else(|| state.config.default_source.clone()),
        upload.target.unwrap_or_else(|| state.config.default_target.clone()),
    );

    log_info(format!(
        "📄 New upload: {} ({} bytes), {} → {}",
        upload.file_name.as_deref().unwrap_or("unknown"),
        upload.bytes.len(),
        options.source,
        options.target
    ));

    let bytes = upload.bytes;
    let result = tokio::task::spawn_blocking(move || run_bytes(&bytes, &state.engine, &options))
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?;

    result.map_err(|e| {
        log_error(format!("Transform error: {}", e));
        ServerError::from(e)
    })
}
