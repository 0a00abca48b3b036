// ABOUTME: Dashboard HTTP handler: concurrent fan-out over independent reads
// ABOUTME: Weights and steps windows, recommendations, and recent diary feeds
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrack

use crate::auth::AuthUser;
use crate::errors::AppResult;
use crate::models::{ActivityDiary, AiRecommendation, FoodDiaryEntry, StepMeasurement, UserWeight};
use crate::server::AppState;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

/// Entries shown in each recent-activity feed
const RECENT_FEED_LIMIT: u64 = 3;

/// Dashboard routes
pub struct DashboardRoutes;

impl DashboardRoutes {
    /// Create the dashboard route
    pub fn routes() -> Router<AppState> {
        Router::new().route("/dashboard", get(get_dashboard))
    }
}

/// Aggregated dashboard payload
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    /// Weight history, trailing 7 days
    pub weight_history_7_days: Vec<UserWeight>,
    /// Weight history, trailing 30 days
    pub weight_history_30_days: Vec<UserWeight>,
    /// Step history, trailing 7 days
    pub steps_history_7_days: Vec<StepMeasurement>,
    /// Step history, trailing 30 days
    pub steps_history_30_days: Vec<StepMeasurement>,
    /// All stored recommendations, newest first
    pub ai_recommendations: Vec<AiRecommendation>,
    /// Most recent food entries
    pub recent_food_entries: Vec<FoodDiaryEntry>,
    /// Most recent workout sessions
    pub recent_activity_entries: Vec<ActivityDiary>,
}

async fn get_dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DashboardResponse>> {
    let store = state.user_store(&user)?;
    let user_id = user.user_id;

    // All seven reads are independent, so they run concurrently.
    let (
        weight_history_7_days,
        weight_history_30_days,
        steps_history_7_days,
        steps_history_30_days,
        ai_recommendations,
        recent_food_entries,
        recent_activity_entries,
    ) = tokio::try_join!(
        store.weights_since(user_id, 7),
        store.weights_since(user_id, 30),
        store.steps_since(user_id, 7),
        store.steps_since(user_id, 30),
        store.recommendations(user_id),
        store.recent_food_entries(user_id, RECENT_FEED_LIMIT),
        store.recent_activity_diaries(user_id, RECENT_FEED_LIMIT),
    )?;

    Ok(Json(DashboardResponse {
        weight_history_7_days,
        weight_history_30_days,
        steps_history_7_days,
        steps_history_30_days,
        ai_recommendations,
        recent_food_entries,
        recent_activity_entries,
    }))
}
