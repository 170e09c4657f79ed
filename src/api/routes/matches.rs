//! Match history routes.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::MatchRecord;

#[derive(Debug, Deserialize)]
pub struct MatchesParams {
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct MatchesResponse {
    pub nickname: String,
    pub matches: Vec<MatchRecord>,
}

pub async fn player_matches(
    State(state): State<AppState>,
    Path(nickname): Path<String>,
    Query(params): Query<MatchesParams>,
) -> Result<Json<MatchesResponse>, ApiError> {
    if let Some(limit) = params.limit {
        if limit == 0 || limit > 100 {
            return Err(ApiError::BadRequest(
                "limit must be between 1 and 100".to_string(),
            ));
        }
    }

    let matches = state.service.player_matches(&nickname, params.limit).await?;
    Ok(Json(MatchesResponse { nickname, matches }))
}

pub async fn lifetime_stats(
    State(state): State<AppState>,
    Path(nickname): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let stats = state.service.lifetime_stats(&nickname).await?;
    Ok(Json(stats))
}
