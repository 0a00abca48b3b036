// ABOUTME: Daily and activity diary HTTP handlers
// ABOUTME: Lock-guarded food entry mutations with synchronous total recompute
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrack

use crate::auth::AuthUser;
use crate::diary::{DiaryLocks, NewFoodEntry, SaveActivityDiary};
use crate::errors::AppResult;
use crate::models::{
    ActivityDiary, ActivityDiaryWithEntries, DailyDiaryWithEntries, FoodDiaryEntry,
};
use crate::server::AppState;
use axum::extract::{Path, Query, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

/// Diary routes
pub struct DiaryRoutes;

impl DiaryRoutes {
    /// Create all diary routes
    pub fn routes() -> Router<AppState> {
        Router::new()
            .route("/diary", get(get_daily_diary))
            .route("/diary/entries", post(create_food_entry))
            .route("/diary/entries/:id", delete(delete_food_entry))
            .route(
                "/diary/activity",
                get(list_activity_diaries).post(save_activity_diary),
            )
            .route("/diary/activity/date", get(activity_diaries_by_date))
            .route("/diary/activity/:id", get(get_activity_diary))
    }
}

#[derive(Debug, Deserialize)]
struct DateQuery {
    date: NaiveDate,
}

async fn get_daily_diary(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<DateQuery>,
) -> AppResult<Json<DailyDiaryWithEntries>> {
    let store = state.user_store(&user)?;
    let diary = {
        let _guard = state
            .locks
            .acquire(&DiaryLocks::day_key(user.user_id, query.date))
            .await;
        store
            .get_or_create_daily_diary(user.user_id, query.date)
            .await?
    };
    Ok(Json(store.diary_with_entries(diary).await?))
}

async fn create_food_entry(
    State(state): State<AppState>,
    user: AuthUser,
    Json(entry): Json<NewFoodEntry>,
) -> AppResult<Json<FoodDiaryEntry>> {
    let store = state.user_store(&user)?;

    let diary = {
        let _guard = state
            .locks
            .acquire(&DiaryLocks::day_key(user.user_id, entry.date))
            .await;
        store
            .get_or_create_daily_diary(user.user_id, entry.date)
            .await?
    };

    let _guard = state.locks.acquire(&DiaryLocks::diary_key(diary.id)).await;
    let created = store.insert_food_entry(user.user_id, diary.id, &entry).await?;
    store.recompute_totals(diary.id, user.user_id).await?;
    Ok(Json(created))
}

async fn delete_food_entry(
    State(state): State<AppState>,
    user: AuthUser,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let store = state.user_store(&user)?;
    let entry = store.food_entry(user.user_id, entry_id).await?;

    let _guard = state
        .locks
        .acquire(&DiaryLocks::diary_key(entry.day_id))
        .await;
    store.delete_food_entry(user.user_id, entry_id).await?;
    store.recompute_totals(entry.day_id, user.user_id).await?;
    Ok(Json(json!({ "success": true })))
}

async fn save_activity_diary(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<SaveActivityDiary>,
) -> AppResult<Json<ActivityDiaryWithEntries>> {
    let store = state.user_store(&user)?;
    Ok(Json(store.save_activity_diary(user.user_id, &request).await?))
}

async fn list_activity_diaries(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<ActivityDiary>>> {
    let store = state.user_store(&user)?;
    Ok(Json(store.activity_diaries(user.user_id).await?))
}

async fn activity_diaries_by_date(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<DateQuery>,
) -> AppResult<Json<Vec<ActivityDiaryWithEntries>>> {
    let store = state.user_store(&user)?;
    Ok(Json(
        store
            .activity_diaries_by_date(user.user_id, query.date)
            .await?,
    ))
}

async fn get_activity_diary(
    State(state): State<AppState>,
    user: AuthUser,
    Path(diary_id): Path<Uuid>,
) -> AppResult<Json<ActivityDiaryWithEntries>> {
    let store = state.user_store(&user)?;
    Ok(Json(store.activity_diary_by_id(user.user_id, diary_id).await?))
}
