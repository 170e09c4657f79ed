//! REST API endpoints.
//!
//! Axum-based HTTP API exposing the roster, normalized match records,
//! aggregate performance and the impact-score ranking as plain JSON
//! values. Rendering is left entirely to consumers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::service::ServiceError;

pub mod routes;
pub mod state;

use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Upstream unavailable: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::PlayerNotFound(nickname) => ApiError::NotFound(nickname),
            ServiceError::UpstreamUnavailable(nickname) => ApiError::Upstream(nickname),
            ServiceError::Storage(e) => ApiError::Internal(e.to_string()),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_UNAVAILABLE"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/players",
            get(routes::players::list_players).post(routes::players::register_player),
        )
        .route(
            "/api/players/:nickname",
            delete(routes::players::remove_player),
        )
        .route(
            "/api/players/:nickname/refresh",
            post(routes::players::refresh_player),
        )
        .route(
            "/api/players/:nickname/matches",
            get(routes::matches::player_matches),
        )
        .route(
            "/api/players/:nickname/lifetime",
            get(routes::matches::lifetime_stats),
        )
        .route(
            "/api/players/:nickname/performance",
            get(routes::performance::player_performance),
        )
        .route("/api/ranking", get(routes::performance::impact_ranking))
        .route("/api/refresh", post(routes::players::refresh_all))
        .route("/api/cache/stats", get(routes::cache::cache_stats))
        .route("/api/cache/cleanup", post(routes::cache::cleanup_expired))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
