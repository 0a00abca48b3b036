// ABOUTME: Step measurement HTTP handlers
// ABOUTME: Per-day upsert plus full history and trailing-window reads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrack

use crate::auth::AuthUser;
use crate::errors::AppResult;
use crate::models::StepMeasurement;
use crate::server::AppState;
use crate::steps::NewStepMeasurement;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};

/// Step measurement routes
pub struct StepsRoutes;

impl StepsRoutes {
    /// Create all step routes
    pub fn routes() -> Router<AppState> {
        Router::new()
            .route("/steps", post(submit_steps).get(list_steps))
            .route("/steps/last7days", get(steps_last_7_days))
            .route("/steps/last30days", get(steps_last_30_days))
    }
}

async fn submit_steps(
    State(state): State<AppState>,
    user: AuthUser,
    Json(measurement): Json<NewStepMeasurement>,
) -> AppResult<Json<StepMeasurement>> {
    let store = state.user_store(&user)?;
    Ok(Json(store.upsert_steps(user.user_id, &measurement).await?))
}

async fn list_steps(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<StepMeasurement>>> {
    let store = state.user_store(&user)?;
    Ok(Json(store.steps(user.user_id).await?))
}

async fn steps_last_7_days(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<StepMeasurement>>> {
    let store = state.user_store(&user)?;
    Ok(Json(store.steps_since(user.user_id, 7).await?))
}

async fn steps_last_30_days(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<StepMeasurement>>> {
    let store = state.user_store(&user)?;
    Ok(Json(store.steps_since(user.user_id, 30).await?))
}
