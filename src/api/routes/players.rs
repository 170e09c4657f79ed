//! Roster management routes.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::RosterEntry;
use crate::service::RefreshOutcome;

#[derive(Debug, Serialize)]
pub struct PlayersResponse {
    pub players: Vec<RosterEntry>,
}

pub async fn list_players(
    State(state): State<AppState>,
) -> Result<Json<PlayersResponse>, ApiError> {
    let players = state.service.roster()?;
    Ok(Json(PlayersResponse { players }))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub nickname: String,
}

pub async fn register_player(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<RosterEntry>, ApiError> {
    let nickname = request.nickname.trim();
    if nickname.is_empty() {
        return Err(ApiError::BadRequest("nickname must not be empty".to_string()));
    }

    let entry = state.service.register_player(nickname).await?;
    Ok(Json(entry))
}

#[derive(Debug, Serialize)]
pub struct RemoveResponse {
    pub removed: bool,
}

pub async fn remove_player(
    State(state): State<AppState>,
    Path(nickname): Path<String>,
) -> Result<Json<RemoveResponse>, ApiError> {
    let removed = state.service.remove_player(&nickname)?;
    if !removed {
        return Err(ApiError::NotFound(nickname));
    }
    Ok(Json(RemoveResponse { removed }))
}

pub async fn refresh_player(
    State(state): State<AppState>,
    Path(nickname): Path<String>,
) -> Result<Json<RosterEntry>, ApiError> {
    let entry = state.service.refresh_player(&nickname).await?;
    Ok(Json(entry))
}

pub async fn refresh_all(
    State(state): State<AppState>,
) -> Result<Json<RefreshOutcome>, ApiError> {
    let outcome = state.service.refresh_all().await?;
    Ok(Json(outcome))
}
