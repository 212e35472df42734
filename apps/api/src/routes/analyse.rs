//! Axum route handler for CV analysis uploads.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use tracing::debug;

use crate::analysis::assembler::AnalysisResponse;
use crate::errors::AppError;
use crate::state::AppState;

/// Multipart field carrying the uploaded CV.
pub const UPLOAD_FIELD: &str = "resume";

/// POST /analyse
///
/// Accepts a single PDF in the `resume` form field and returns its ATS score
/// and feedback. Upload validation runs before any document processing.
pub async fn handle_analyse(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResponse>, AppError> {
    let document = read_upload(multipart, state.config.max_upload_bytes).await?;
    let response = state.analyzer.analyze(document).await?;
    Ok(Json(response))
}

/// Pulls the `resume` file out of the form, enforcing type and size limits.
async fn read_upload(mut multipart: Multipart, max_bytes: usize) -> Result<Bytes, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = match field.file_name() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => break,
        };
        if !filename.to_lowercase().ends_with(".pdf") {
            return Err(AppError::InvalidInput(
                "Only PDF CVs are accepted".to_string(),
            ));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, max_bytes))?;
        if data.len() > max_bytes {
            return Err(AppError::PayloadTooLarge(max_bytes));
        }

        debug!("Received '{filename}' ({} bytes)", data.len());
        return Ok(data);
    }

    Err(AppError::InvalidInput("No CV file uploaded".to_string()))
}

fn multipart_error(e: MultipartError, max_bytes: usize) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(max_bytes)
    } else {
        AppError::InvalidInput(format!("Malformed upload: {}", e.body_text()))
    }
}
