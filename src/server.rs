use crate::config::{validate_threshold, Config, ExtractionConfig};
use crate::engines::{EngineInfo, EngineRegistry};
use crate::error::OcrError;
use crate::extraction::ExtractionResult;
use crate::ocr::OcrProcessor;
use crate::preprocessing::PreprocessingResult;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

/// Room for multipart boundaries, part headers and the small text fields,
/// so an oversized file reaches the size check instead of failing mid-parse
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engines: Arc<EngineRegistry>,
    pub config: Arc<Config>,
    pub extraction: Arc<ExtractionConfig>,
}

impl AppState {
    pub fn new(engines: EngineRegistry, config: Config) -> Result<Self, OcrError> {
        let extraction = config.extraction_config()?;
        Ok(Self {
            engines: Arc::new(engines),
            config: Arc::new(config),
            extraction: Arc::new(extraction),
        })
    }
}

/// Extraction response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    #[serde(flatten)]
    pub result: ExtractionResult,
    pub engine: String,
    pub processing_time_ms: u64,
    pub preprocessing: PreprocessingResult,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Server info response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    pub version: String,
    pub default_engine: String,
    pub available_engines: Vec<EngineInfo>,
    pub max_file_size_bytes: usize,
    pub confidence_threshold: f32,
    pub engine_mode: String,
}

/// Run the HTTP server
pub async fn run(config: Config) -> anyhow::Result<()> {
    let engines = EngineRegistry::new(&config)?;
    tracing::info!(
        "Engines available: {:?} (default: {})",
        engines.list(),
        engines.default_name()
    );

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(engines, config)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router for the given state
pub fn router(state: AppState) -> Router {
    let max_file_size = state.config.max_file_size;

    Router::new()
        .route("/extract", post(handle_extract))
        .route("/health", get(handle_health))
        .route("/info", get(handle_info))
        .layer(DefaultBodyLimit::max(max_file_size.saturating_add(MULTIPART_OVERHEAD)))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle extraction requests
async fn handle_extract(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>, OcrError> {
    let start = Instant::now();

    let mut file_data: Option<Bytes> = None;
    let mut threshold: Option<String> = None;
    let mut engine_name: Option<String> = None;

    // Parse multipart form
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| OcrError::InvalidRequest(format!("Failed to parse multipart: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "file" => {
                file_data = Some(field.bytes().await.map_err(|e| {
                    OcrError::InvalidRequest(format!("Failed to read file data: {}", e))
                })?);
            }
            "threshold" => {
                threshold = Some(field.text().await.map_err(|e| {
                    OcrError::InvalidRequest(format!("Invalid threshold: {}", e))
                })?);
            }
            "engine" => {
                engine_name = Some(field.text().await.map_err(|e| {
                    OcrError::InvalidRequest(format!("Invalid engine: {}", e))
                })?);
            }
            _ => {
                // Ignore unknown fields
            }
        }
    }

    // Validate file was provided
    let data = file_data.ok_or(OcrError::MissingFile)?;

    // Check file size
    if data.len() > state.config.max_file_size {
        return Err(OcrError::ImageTooLarge {
            size: data.len(),
            max: state.config.max_file_size,
        });
    }

    let threshold = match threshold {
        Some(raw) => parse_threshold(&raw)?,
        None => state.extraction.confidence_threshold,
    };

    let engine = match engine_name.as_deref() {
        Some(name) => state
            .engines
            .get(name)
            .ok_or_else(|| OcrError::InvalidRequest(format!("Unknown engine: {}", name)))?,
        None => state
            .engines
            .default()
            .ok_or_else(|| OcrError::Internal("No default engine".to_string()))?,
    };

    let processor = OcrProcessor::new(engine, state.extraction.as_ref().clone())?;

    // Preprocessing and recognition are CPU bound; keep them off the runtime
    let p = processor.clone();
    let mut preprocessing = tokio::task::spawn_blocking(move || p.normalize(&data))
        .await
        .map_err(|e| OcrError::Internal(format!("Preprocessing task failed: {}", e)))??;

    let raster = std::mem::take(&mut preprocessing.image);
    let p = processor.clone();
    let timeout = state.config.recognition_timeout;
    let tokens = tokio::time::timeout(
        timeout,
        tokio::task::spawn_blocking(move || p.recognize(&raster)),
    )
    .await
    .map_err(|_| OcrError::Recognition(format!("timed out after {}s", timeout.as_secs_f32())))?
    .map_err(|e| OcrError::Internal(format!("Recognition task failed: {}", e)))??;

    let result = processor.finish(&tokens, threshold)?;

    let processing_time_ms = start.elapsed().as_millis() as u64;

    tracing::info!(
        "Extraction completed in {}ms with {}: {} amounts, {} auto-import, avg confidence {:.2}",
        processing_time_ms,
        processor.engine_name(),
        result.meta.count,
        result.auto_import.len(),
        result.meta.avg_confidence
    );

    Ok(Json(ExtractResponse {
        result,
        engine: processor.engine_name().to_string(),
        processing_time_ms,
        preprocessing,
    }))
}

fn parse_threshold(raw: &str) -> Result<f32, OcrError> {
    let threshold = raw
        .trim()
        .parse::<f32>()
        .map_err(|_| OcrError::Config(format!("threshold is not a number: {:?}", raw)))?;
    validate_threshold(threshold)?;
    Ok(threshold)
}

/// Handle health check requests
async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle info requests
async fn handle_info(State(state): State<AppState>) -> impl IntoResponse {
    Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        default_engine: state.engines.default_name().to_string(),
        available_engines: state.engines.info(),
        max_file_size_bytes: state.config.max_file_size,
        confidence_threshold: state.extraction.confidence_threshold,
        engine_mode: state.extraction.engine_mode.to_string(),
    })
}
