use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Message returned for every unanticipated failure. Internal detail is logged, never sent.
pub const GENERIC_SERVER_ERROR: &str = "Server error processing your CV";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing upload or wrong file type. Rejected before any processing.
    #[error("{0}")]
    InvalidInput(String),

    #[error("CV exceeds the maximum upload size of {0} bytes")]
    PayloadTooLarge(usize),

    /// Corrupt, encrypted or otherwise unreadable document.
    #[error("Failed to process PDF: {0}")]
    Extraction(String),

    /// The process-wide grammar-check budget is spent. Retryable.
    #[error("Grammar check rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimitExceeded { retry_after_secs: u64 },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, self.to_string()),
            AppError::Extraction(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::RateLimitExceeded { retry_after_secs } => {
                tracing::warn!("Grammar check budget exhausted, retry after {retry_after_secs}s");
                let mut response = (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({ "error": self.to_string() })),
                )
                    .into_response();
                response.headers_mut().insert(
                    header::RETRY_AFTER,
                    HeaderValue::from(*retry_after_secs),
                );
                return response;
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    GENERIC_SERVER_ERROR.to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
