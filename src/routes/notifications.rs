// ABOUTME: Push token registration HTTP handler
// ABOUTME: Token rows are written via service credentials, upserted per device
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrack

use crate::auth::AuthUser;
use crate::errors::AppResult;
use crate::notifications::RegisterPushToken;
use crate::server::AppState;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;

/// Notification routes
pub struct NotificationsRoutes;

impl NotificationsRoutes {
    /// Create all notification routes
    pub fn routes() -> Router<AppState> {
        Router::new().route("/notifications/register-token", post(register_token))
    }
}

async fn register_token(
    State(state): State<AppState>,
    user: AuthUser,
    Json(registration): Json<RegisterPushToken>,
) -> AppResult<Json<serde_json::Value>> {
    state
        .service_store
        .register_push_token(user.user_id, &registration)
        .await?;
    Ok(Json(json!({ "success": true })))
}
