use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Recognition failed: {0}")]
    Recognition(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to initialize OCR engine: {0}")]
    InitializationError(String),

    #[error("Image too large: {size} bytes (max: {max} bytes)")]
    ImageTooLarge { size: usize, max: usize },

    #[error("Missing file in request")]
    MissingFile,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl OcrError {
    /// Name of the stage that produced the error, for logs and responses
    pub fn stage(&self) -> &'static str {
        match self {
            OcrError::Decode(_) => "decode",
            OcrError::Recognition(_) => "recognition",
            OcrError::Config(_) => "config",
            OcrError::InitializationError(_) => "initialization",
            OcrError::ImageTooLarge { .. } | OcrError::MissingFile | OcrError::InvalidRequest(_) => {
                "request"
            }
            OcrError::Internal(_) => "internal",
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub stage: String,
}

impl IntoResponse for OcrError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            OcrError::Decode(_) => (StatusCode::BAD_REQUEST, "DECODE_ERROR"),
            OcrError::Recognition(_) => (StatusCode::BAD_GATEWAY, "RECOGNITION_ERROR"),
            OcrError::Config(_) => (StatusCode::BAD_REQUEST, "CONFIG_ERROR"),
            OcrError::InitializationError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INIT_ERROR"),
            OcrError::ImageTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "IMAGE_TOO_LARGE"),
            OcrError::MissingFile => (StatusCode::BAD_REQUEST, "MISSING_FILE"),
            OcrError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            OcrError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        tracing::warn!(stage = self.stage(), "Request failed: {}", self);

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
            stage: self.stage().to_string(),
        });

        (status, body).into_response()
    }
}
