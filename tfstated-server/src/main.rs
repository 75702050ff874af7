use anyhow::{Context, Result};
use axum::{http::StatusCode, response::Json, routing::get, Router};
use serde_json::json;
use std::fs;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};

use tfstated_core::{LockRegistry, StateStore};
use tfstated_server::config::Config;
use tfstated_server::handlers::api_router;
use tfstated_server::AppState;

async fn health_check() -> Result<Json<serde_json::Value>, StatusCode> {
    Ok(Json(json!({
        "status": "healthy",
        "service": "tfstated"
    })))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("Starting tfstated");

    let config =
        Config::from_env().context("Failed to load configuration from environment variables")?;

    let state_dir = config.state_dir();
    let lock_dir = config.lock_dir();
    fs::create_dir_all(&state_dir)
        .with_context(|| format!("Failed to create state directory {}", state_dir.display()))?;
    fs::create_dir_all(&lock_dir)
        .with_context(|| format!("Failed to create lock directory {}", lock_dir.display()))?;
    info!("Using data directory: {}", config.data_dir.display());

    if config.auth.is_some() {
        info!("HTTP Basic authentication enabled");
    } else {
        warn!("Authentication disabled; accepting all requests");
    }

    let app_state = Arc::new(AppState {
        state_store: StateStore::new(state_dir),
        lock_registry: LockRegistry::new(lock_dir),
        credentials: config.auth.clone(),
    });

    let app = Router::new()
        .route("/health", get(health_check))
        .merge(api_router(app_state.clone()))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(app_state);

    let listener = TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    info!("Server listening on port {}", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
