pub mod cv;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Headroom over the configured file size for multipart framing.
const BODY_LIMIT_HEADROOM: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_file_size + BODY_LIMIT_HEADROOM;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/health", get(health::health_handler))
        .route("/api/v1/process-cv", post(cv::handle_process_cv))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
