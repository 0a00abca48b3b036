// ABOUTME: Liveness and readiness HTTP handlers
// ABOUTME: Readiness reports the wired components so orchestration can tell instances apart
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrack

use crate::server::AppState;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

/// Health routes
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    pub fn routes() -> Router<AppState> {
        Router::new()
            .route("/health", get(health))
            .route("/ready", get(ready))
    }
}

/// Liveness: the process is up and serving.
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Readiness: the state graph is built, so the store gateway, completion
/// client, and dispatcher are all constructed. Reports the non-secret
/// configuration they were wired with.
async fn ready(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ready",
        "store": state.config.supabase.url,
        "model": state.config.openai.model,
        "scheduler_enabled": state.config.recommendations.scheduler_enabled,
        "strategy": state.config.recommendations.strategy.to_string(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
