//! Cache observability routes.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::cache::CacheStats;

pub async fn cache_stats(State(state): State<AppState>) -> Result<Json<CacheStats>, ApiError> {
    Ok(Json(state.cache.stats()))
}

#[derive(Debug, Serialize)]
pub struct CleanupResponse {
    pub removed: usize,
}

pub async fn cleanup_expired(
    State(state): State<AppState>,
) -> Result<Json<CleanupResponse>, ApiError> {
    let removed = state.cache.cleanup_expired();
    Ok(Json(CleanupResponse { removed }))
}
