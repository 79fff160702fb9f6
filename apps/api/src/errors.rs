use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::extractor::ExtractionError;
use crate::llm_client::LlmError;
use crate::resume::PdfError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upload too large: {0}")]
    UploadTooLarge(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("LLM authentication failed: {0}")]
    LlmAuth(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Extraction error: {message}")]
    Extraction {
        message: String,
        raw_response: String,
    },

    #[error("Format error: {message}")]
    Format {
        message: String,
        raw_response: String,
    },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Auth(msg) => AppError::LlmAuth(msg),
            other => AppError::Llm(other.to_string()),
        }
    }
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        let message = err.to_string();
        match err {
            ExtractionError::Parse { raw, .. } => AppError::Extraction {
                message,
                raw_response: raw,
            },
            ExtractionError::Format { raw, .. } => AppError::Format {
                message,
                raw_response: raw,
            },
        }
    }
}

impl From<PdfError> for AppError {
    fn from(err: PdfError) -> Self {
        match err {
            PdfError::Empty | PdfError::NotPdf => AppError::Validation(err.to_string()),
            other => AppError::Pdf(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut raw: Option<String> = None;

        let (status, code, message) = match self {
            AppError::MissingInput(msg) => {
                tracing::warn!("Rejected submission: {msg}");
                (StatusCode::BAD_REQUEST, "MISSING_INPUT", msg)
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            AppError::UploadTooLarge(msg) => {
                tracing::warn!("Rejected oversized upload: {msg}");
                (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    "PAYLOAD_TOO_LARGE",
                    "The upload is too large. Please submit a smaller resume.".to_string(),
                )
            }
            AppError::Pdf(msg) => {
                tracing::warn!("PDF error: {msg}");
                (StatusCode::UNPROCESSABLE_ENTITY, "PDF_ERROR", msg)
            }
            AppError::LlmAuth(msg) => {
                tracing::warn!("LLM auth error: {msg}");
                (
                    StatusCode::UNAUTHORIZED,
                    "LLM_AUTH_ERROR",
                    "The Google AI API key was rejected. Check the key and try again."
                        .to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    format!("An unexpected error occurred: {msg}"),
                )
            }
            AppError::Extraction {
                message,
                raw_response,
            } => {
                tracing::warn!("Extraction error: {message}");
                raw = Some(raw_response);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "EXTRACTION_ERROR",
                    "Failed to parse the AI's response. The format might be unexpected."
                        .to_string(),
                )
            }
            AppError::Format {
                message,
                raw_response,
            } => {
                tracing::warn!("Format error: {message}");
                raw = Some(raw_response);
                (StatusCode::UNPROCESSABLE_ENTITY, "FORMAT_ERROR", message)
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

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(raw) = raw {
            error["raw_response"] = json!(raw);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
