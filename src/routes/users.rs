// ABOUTME: Profile and weight HTTP handlers
// ABOUTME: Profile create/read/update plus weight logging and history windows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrack

use crate::auth::AuthUser;
use crate::errors::{AppError, AppResult};
use crate::models::{UserProfile, UserWeight};
use crate::server::AppState;
use crate::users::{NewWeight, ProfileUpdate};
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};

/// Profile and weight routes
pub struct UsersRoutes;

impl UsersRoutes {
    /// Create all user routes
    pub fn routes() -> Router<AppState> {
        Router::new()
            .route(
                "/users/profile",
                get(get_profile).post(create_profile).patch(update_profile),
            )
            .route("/users/weights", post(add_weight).get(list_weights))
            .route("/users/weights/last7days", get(weights_last_7_days))
            .route("/users/weights/last30days", get(weights_last_30_days))
    }
}

async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<UserProfile>> {
    let store = state.user_store(&user)?;
    let profile = store
        .user_profile(user.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User profile"))?;
    Ok(Json(profile))
}

async fn create_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(update): Json<ProfileUpdate>,
) -> AppResult<Json<UserProfile>> {
    let store = state.user_store(&user)?;
    let profile = store
        .create_user_profile(user.user_id, user.email.as_deref(), &update)
        .await?;
    Ok(Json(profile))
}

async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(update): Json<ProfileUpdate>,
) -> AppResult<Json<UserProfile>> {
    let store = state.user_store(&user)?;
    let profile = store.update_user_profile(user.user_id, &update).await?;
    Ok(Json(profile))
}

async fn add_weight(
    State(state): State<AppState>,
    user: AuthUser,
    Json(weight): Json<NewWeight>,
) -> AppResult<Json<UserWeight>> {
    let store = state.user_store(&user)?;
    Ok(Json(store.add_weight(user.user_id, &weight).await?))
}

async fn list_weights(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<UserWeight>>> {
    let store = state.user_store(&user)?;
    Ok(Json(store.weights(user.user_id).await?))
}

async fn weights_last_7_days(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<UserWeight>>> {
    let store = state.user_store(&user)?;
    Ok(Json(store.weights_since(user.user_id, 7).await?))
}

async fn weights_last_30_days(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<UserWeight>>> {
    let store = state.user_store(&user)?;
    Ok(Json(store.weights_since(user.user_id, 30).await?))
}
