// ABOUTME: Unguarded test trigger endpoints for the pipeline and notifications
// ABOUTME: Manual equivalents of the midnight tick and a direct push send
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrack

use crate::errors::AppResult;
use crate::server::AppState;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

/// Test trigger routes. Deliberately unguarded, matching the manual
/// operational triggers the product ships with.
pub struct TestingRoutes;

impl TestingRoutes {
    /// Create all test trigger routes
    pub fn routes() -> Router<AppState> {
        Router::new()
            .route("/test-ai-recommendations/generate", post(trigger_generation))
            .route("/test-notifications/send", post(send_test_notification))
    }
}

#[derive(Debug, Deserialize)]
struct TestNotification {
    user_id: Uuid,
    title: String,
    body: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

async fn trigger_generation(
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    state.agent.run_daily().await?;
    Ok(Json(json!({
        "success": true,
        "message": "Recommendations generation triggered"
    })))
}

async fn send_test_notification(
    State(state): State<AppState>,
    Json(request): Json<TestNotification>,
) -> AppResult<Json<serde_json::Value>> {
    state
        .dispatcher
        .send(
            request.user_id,
            &request.title,
            &request.body,
            request.data.unwrap_or_else(|| json!({})),
        )
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Test notification sent"
    })))
}
