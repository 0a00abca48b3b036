// ABOUTME: Food catalog HTTP handlers: custom food creation and locale search
// ABOUTME: Both endpoints require an Accept-Language header naming the locale
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrack

use crate::auth::AuthUser;
use crate::errors::{AppError, AppResult};
use crate::foods::{CreateFood, Food, FoodSearchPage};
use crate::server::AppState;
use axum::extract::{Query, State};
use axum::http::header::ACCEPT_LANGUAGE;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

const DEFAULT_PAGE_SIZE: u64 = 10;
const MAX_PAGE_SIZE: u64 = 100;

/// Food catalog routes
pub struct FoodsRoutes;

impl FoodsRoutes {
    /// Create all food routes
    pub fn routes() -> Router<AppState> {
        Router::new()
            .route("/foods", post(create_food))
            .route("/foods/search", get(search_foods))
    }
}

/// Locale from `Accept-Language`; translations are keyed by it, so the header
/// is mandatory rather than defaulted.
fn require_locale(headers: &HeaderMap) -> AppResult<String> {
    headers
        .get(ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::missing_field("Language header"))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    page: Option<u64>,
    #[serde(default)]
    limit: Option<u64>,
    #[serde(default)]
    query: Option<String>,
}

async fn create_food(
    State(state): State<AppState>,
    user: AuthUser,
    headers: HeaderMap,
    Json(food): Json<CreateFood>,
) -> AppResult<Json<Food>> {
    let locale = require_locale(&headers)?;
    let store = state.user_store(&user)?;
    Ok(Json(store.create_food(user.user_id, &locale, &food).await?))
}

async fn search_foods(
    State(state): State<AppState>,
    user: AuthUser,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<FoodSearchPage>> {
    let locale = require_locale(&headers)?;
    let store = state.user_store(&user)?;

    let page = query.page.unwrap_or(1).max(1);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let term = query.query.unwrap_or_default();

    Ok(Json(store.search_foods(&locale, &term, page, limit).await?))
}
