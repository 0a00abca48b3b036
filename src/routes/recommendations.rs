// ABOUTME: AI recommendation HTTP handlers
// ABOUTME: Listing stored recommendations and marking them viewed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrack

use crate::auth::AuthUser;
use crate::errors::AppResult;
use crate::models::AiRecommendation;
use crate::server::AppState;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

/// Recommendation routes
pub struct RecommendationsRoutes;

impl RecommendationsRoutes {
    /// Create all recommendation routes
    pub fn routes() -> Router<AppState> {
        Router::new()
            .route("/ai-recommendations", get(list_recommendations))
            .route("/ai-recommendations/viewed", post(mark_viewed))
    }
}

#[derive(Debug, Deserialize)]
struct MarkViewed {
    id: Uuid,
}

async fn list_recommendations(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<AiRecommendation>>> {
    let store = state.user_store(&user)?;
    Ok(Json(store.recommendations(user.user_id).await?))
}

async fn mark_viewed(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<MarkViewed>,
) -> AppResult<Json<AiRecommendation>> {
    let store = state.user_store(&user)?;
    Ok(Json(
        store
            .mark_recommendation_viewed(user.user_id, request.id)
            .await?,
    ))
}
