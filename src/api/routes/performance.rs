//! Performance and ranking routes.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::ImpactRankingEntry;
use crate::service::PlayerPerformance;

#[derive(Debug, Deserialize)]
pub struct PerformanceParams {
    pub limit: Option<u32>,
}

pub async fn player_performance(
    State(state): State<AppState>,
    Path(nickname): Path<String>,
    Query(params): Query<PerformanceParams>,
) -> Result<Json<PlayerPerformance>, ApiError> {
    let performance = state
        .service
        .player_performance(&nickname, params.limit)
        .await?;
    Ok(Json(performance))
}

#[derive(Debug, Serialize)]
pub struct RankingResponse {
    pub ranking: Vec<ImpactRankingEntry>,
}

pub async fn impact_ranking(
    State(state): State<AppState>,
) -> Result<Json<RankingResponse>, ApiError> {
    let ranking = state.service.impact_ranking().await?;
    Ok(Json(RankingResponse { ranking }))
}
