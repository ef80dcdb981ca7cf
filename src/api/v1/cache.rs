//! Geocode cache endpoint

use axum::{extract::State, Json};
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{ApiError, CacheClearedResponse};

/// DELETE /v1/cache - Forget every cached geocode, in memory and on disk
pub async fn clear_cache(
    State(state): State<AppState>,
) -> Result<Json<CacheClearedResponse>, ApiError> {
    let cleared = state.geocode_cache.len().await;
    state.geocode_cache.clear().await.map_err(ApiError::from)?;
    info!(cleared, "Geocode cache cleared");

    Ok(Json(CacheClearedResponse { cleared }))
}
