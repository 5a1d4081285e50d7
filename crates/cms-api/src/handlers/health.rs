//! Health check handlers.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use cms_core::config::DispatcherMode;

use crate::dto::HealthResponse;
use crate::state::AppState;

/// GET /api
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "CMS Pro API is running",
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let dispatcher = match state.config.plugins.dispatcher {
        DispatcherMode::Local => "local",
        DispatcherMode::Remote => "remote",
    };
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        plugins: state.plugins.hooks().registered_plugins().await.len(),
        dispatcher: dispatcher.to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}
