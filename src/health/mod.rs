/*!
 * # Health Check Module
 *
 * - Liveness (`/health`): the process is up, never touches the database
 * - Readiness (`/health/ready`): the database answers a ping
 */

use crate::{db, AppState};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LivenessResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReadinessResponse {
    pub status: String,
    pub database: String,
}

pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(liveness))
        .route("/health/ready", get(readiness))
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses((status = 200, description = "Server is running", body = LivenessResponse))
)]
pub async fn liveness() -> impl IntoResponse {
    Json(LivenessResponse {
        status: "OK".to_string(),
        message: "Server is running".to_string(),
    })
}

/// Readiness probe, 503 while the database is unreachable
#[utoipa::path(
    get,
    path = "/api/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Database reachable", body = ReadinessResponse),
        (status = 503, description = "Database unreachable", body = ReadinessResponse),
    )
)]
pub async fn readiness(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match db::check_connection(&state.db).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ReadinessResponse {
                status: "OK".to_string(),
                database: "up".to_string(),
            }),
        ),
        Err(err) => {
            warn!(error = %err, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadinessResponse {
                    status: "DEGRADED".to_string(),
                    database: "down".to_string(),
                }),
            )
        }
    }
}
