//! DocFlow Server
//!
//! Composition root for the document-processing service: builds the job
//! store, operation registry and queue manager, starts the worker pool and
//! serves the HTTP API.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docflow_engine::{
    EngineConfig, JobStore, MemoryJobStore, OperationRegistry, QueueManager,
};

pub mod api;
pub mod config;
pub mod operations;
pub mod postprocess;

use crate::api::AppState;
use crate::config::Config;
use crate::postprocess::FreeTierStamp;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docflow_server=debug,docflow_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting DocFlow server...");

    let config = Config::from_env();
    config.validate().expect("Invalid configuration");

    std::fs::create_dir_all(&config.upload_dir).expect("Failed to create upload directory");
    std::fs::create_dir_all(&config.processed_dir).expect("Failed to create processed directory");

    let store: Arc<dyn JobStore> = Arc::new(MemoryJobStore::new());

    let mut registry = OperationRegistry::new();
    operations::register_builtin(&mut registry, &config.processed_dir);
    tracing::info!("Registered {} built-in operations", registry.len());

    let manager = Arc::new(
        QueueManager::new(
            Arc::clone(&store),
            Arc::new(registry),
            EngineConfig::new(config.worker_count),
        )
        .with_post_process(Arc::new(FreeTierStamp::new())),
    );

    manager.start().await;

    let app = api::create_router(AppState {
        store,
        manager: Arc::clone(&manager),
        tier_policy: config.tier_policy,
    });

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
