use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Input-caused failures map to 4xx, dependency-caused failures to 5xx.
/// None of them are fatal to the process.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Source document is empty or unreadable: {0}")]
    EmptySource(String),

    #[error("Structured response could not be decoded: {0}")]
    Decode(String),

    #[error("AI service error: {0}")]
    AiService(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        AppError::AiService(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg.clone()),
            AppError::EmptySource(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EMPTY_SOURCE",
                format!(
                    "Could not read enough text from the uploaded resume ({msg}). \
                     Please upload a text-based PDF or plain-text file."
                ),
            ),
            AppError::Decode(msg) => {
                tracing::warn!("Decode error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "DECODE_ERROR",
                    "The AI response could not be processed. Please try again.".to_string(),
                )
            }
            AppError::AiService(msg) => {
                tracing::error!("AI service error: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "AI_SERVICE_ERROR",
                    msg.clone(),
                )
            }
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
