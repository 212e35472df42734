pub mod analyse;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Room for multipart boundaries and headers on top of the file itself, so an
/// oversized file hits the explicit size check rather than a bare body-limit error.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/analyse", post(analyse::handle_analyse))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
