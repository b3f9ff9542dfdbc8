//! API Module
//!
//! HTTP API layer for the DocFlow server.

pub mod error;
pub mod health;
pub mod job;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};
use docflow_core::domain::tier::TierPolicy;
use docflow_engine::{JobStore, QueueManager};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn JobStore>,
    pub manager: Arc<QueueManager>,
    pub tier_policy: TierPolicy,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health checks
        .route("/health", get(health::health_check))
        .route("/queue/health", get(health::queue_health))
        // Job endpoints
        .route("/job/create", post(job::create_job))
        .route("/job/{id}", get(job::get_job))
        .route("/job/{id}", delete(job::delete_job))
        .route("/job/{id}/cancel", post(job::cancel_job))
        .route("/job/owner/{owner}", get(job::list_jobs_by_owner))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
