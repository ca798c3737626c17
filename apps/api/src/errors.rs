use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Errors raised by the tailoring pipeline (loader, locator, rewrite client, orchestrator).
#[derive(Debug, Error)]
pub enum TailorError {
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Document extraction failed: {0}")]
    Extraction(String),

    #[error("Inference endpoint unavailable: {0}")]
    InferenceUnavailable(String),

    #[error("Inference timed out after {0:?}")]
    InferenceTimeout(Duration),

    #[error("Inference returned an unusable response: {0}")]
    InvalidInferenceResponse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl TailorError {
    /// Failures worth another attempt: the endpoint may come back or answer faster.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TailorError::InferenceUnavailable(_) | TailorError::InferenceTimeout(_)
        )
    }
}

impl From<LlmError> for TailorError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Timeout(after) => TailorError::InferenceTimeout(after),
            LlmError::Unreachable(msg) => TailorError::InferenceUnavailable(msg),
            LlmError::Api { status, message } => {
                TailorError::InferenceUnavailable(format!("status {status}: {message}"))
            }
            LlmError::Http(e) => TailorError::InferenceUnavailable(e.to_string()),
            LlmError::EmptyContent => {
                TailorError::InvalidInferenceResponse("model returned empty content".to_string())
            }
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Tailor(#[from] TailorError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Tailor(err) => match err {
                TailorError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                TailorError::UnsupportedFormat(_) => (
                    StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    "UNSUPPORTED_FORMAT",
                    err.to_string(),
                ),
                TailorError::Extraction(_) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "EXTRACTION_ERROR",
                    err.to_string(),
                ),
                TailorError::InferenceUnavailable(_) => {
                    tracing::error!("{err}");
                    (
                        StatusCode::BAD_GATEWAY,
                        "INFERENCE_UNAVAILABLE",
                        err.to_string(),
                    )
                }
                TailorError::InferenceTimeout(_) => {
                    tracing::error!("{err}");
                    (
                        StatusCode::GATEWAY_TIMEOUT,
                        "INFERENCE_TIMEOUT",
                        err.to_string(),
                    )
                }
                TailorError::InvalidInferenceResponse(_) => {
                    tracing::error!("{err}");
                    (StatusCode::BAD_GATEWAY, "INFERENCE_ERROR", err.to_string())
                }
            },
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
