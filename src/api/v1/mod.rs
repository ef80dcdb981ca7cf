//! v1 API endpoints

pub mod cache;
pub mod jobs;

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::state::AppState;

/// Create v1 API router
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/jobs", post(jobs::create_job))
        .route("/jobs/{job_id}", get(jobs::get_job).delete(jobs::cancel_job))
        .route("/jobs/{job_id}/download", get(jobs::download_job))
        .route("/jobs/{job_id}/skipped", get(jobs::get_skipped))
        .route("/cache", delete(cache::clear_cache))
}
