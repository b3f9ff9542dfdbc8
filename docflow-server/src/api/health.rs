//! Health Check API Handlers

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use docflow_core::dto::job::QueueHealth;

use crate::api::AppState;

/// GET /health
/// Liveness check
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /queue/health
/// Queue depth, running flag and configured worker count
pub async fn queue_health(State(state): State<AppState>) -> Json<QueueHealth> {
    Json(state.manager.queue_health().await)
}
