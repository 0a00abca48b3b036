// ABOUTME: Daily diary aggregation: lazy diary creation, food entry mutations, total recompute
// ABOUTME: Activity diary save with full set-reconciliation of entries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrack

//! # Diary Aggregator
//!
//! A [`DailyDiary`](crate::models::DailyDiary) is one user's nutrition ledger
//! for one calendar day, created lazily on first access and never deleted.
//! Every food entry create or delete is followed by a synchronous recompute
//! that rewrites the diary's consumed totals from the full entry set and
//! re-reads the owning user's current macro ratios.
//!
//! Mutations for the same diary are serialized through [`DiaryLocks`], an
//! in-process per-key async lock registry. Without it, concurrent first
//! access for the same (user, date) can insert duplicate diary rows and
//! interleaved recomputes are last-writer-wins.

use crate::errors::{AppError, AppResult};
use crate::models::{
    ActivityDiary, ActivityDiaryEntry, ActivityDiaryWithEntries, DailyDiary,
    DailyDiaryWithEntries, FoodDiaryEntry, MealType, NutritionTotals, ServingUnit, UserProfile,
};
use crate::store::{tables, Order, Store};
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Per-key async lock registry serializing diary mutations.
///
/// Keys are opaque strings: `(user, date)` for first-access creation and the
/// diary id for entry mutations. Entries are never evicted; the registry is
/// bounded by the set of diaries touched since process start.
#[derive(Debug, Default, Clone)]
pub struct DiaryLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl DiaryLocks {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for the given key, waiting if another task holds it
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(key.to_owned())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Lock key for first-access diary creation
    #[must_use]
    pub fn day_key(user_id: Uuid, date: NaiveDate) -> String {
        format!("day:{user_id}:{date}")
    }

    /// Lock key for mutations of one existing diary
    #[must_use]
    pub fn diary_key(diary_id: Uuid) -> String {
        format!("diary:{diary_id}")
    }
}

/// Request payload for logging one food entry
#[derive(Debug, Clone, Deserialize)]
pub struct NewFoodEntry {
    /// Diary date the entry belongs to
    pub date: NaiveDate,
    /// Food catalog reference
    pub food_id: Uuid,
    /// Food name captured at entry time
    pub food_name: String,
    /// Brand captured at entry time
    #[serde(default)]
    pub brand: Option<String>,
    /// Meal slot
    pub meal_type: MealType,
    /// Serving size in `serving_unit`
    pub serving_size: f64,
    /// Serving unit
    pub serving_unit: ServingUnit,
    /// Calories for this serving
    pub calories: f64,
    /// Protein in grams
    pub protein: f64,
    /// Carbohydrates in grams
    pub carbs: f64,
    /// Fat in grams
    pub fat: f64,
}

/// Request payload for saving a workout session
#[derive(Debug, Clone, Deserialize)]
pub struct SaveActivityDiary {
    /// Existing session to update; a new session is inserted when absent
    #[serde(default)]
    pub id: Option<Uuid>,
    /// Session start
    pub start_at: DateTime<Utc>,
    /// Session end
    pub end_at: DateTime<Utc>,
    /// Bodyweight at session time, kilograms
    #[serde(default)]
    pub bodyweight_kg: Option<f64>,
    /// Free-form notes
    #[serde(default)]
    pub notes: Option<String>,
    /// Full entry set; stored entries absent from this list are deleted
    #[serde(default)]
    pub entries: Vec<SaveActivityEntry>,
}

/// One exercise within a [`SaveActivityDiary`] request
#[derive(Debug, Clone, Deserialize)]
pub struct SaveActivityEntry {
    /// Existing entry to update; a new entry is inserted when absent
    #[serde(default)]
    pub id: Option<Uuid>,
    /// Exercise catalog reference
    pub exercise_id: Uuid,
    /// Ordered sets as `[{"reps": n, "weight_kg": x}, ...]`
    pub sets_json: serde_json::Value,
    /// Estimated energy expenditure
    #[serde(default)]
    pub est_kcal: Option<f64>,
    /// Free-form notes
    #[serde(default)]
    pub notes: Option<String>,
}

/// Stored entry ids that the request no longer carries; these get deleted on
/// save. Ids in the request that do not exist in storage are treated as
/// updates and surface as not-found from the store.
#[must_use]
pub fn stale_entry_ids(stored: &[Uuid], requested: &[Option<Uuid>]) -> Vec<Uuid> {
    let kept: HashSet<Uuid> = requested.iter().flatten().copied().collect();
    stored
        .iter()
        .filter(|id| !kept.contains(id))
        .copied()
        .collect()
}

impl Store {
    /// Fetch the diary row for (user, date), if one exists
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    pub async fn daily_diary_by_date(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Option<DailyDiary>> {
        self.from(tables::DAILY_DIARY)
            .eq("user_id", user_id)
            .eq("day_date", date)
            .fetch_optional()
            .await
    }

    /// Fetch the diary for (user, date), creating a zeroed row seeded with the
    /// profile's goals when absent. Callers mutating entries must hold the
    /// [`DiaryLocks::day_key`] lock across this call.
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails or the user has no profile.
    pub async fn get_or_create_daily_diary(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<DailyDiary> {
        if let Some(diary) = self.daily_diary_by_date(user_id, date).await? {
            return Ok(diary);
        }

        let profile = self.user_profile(user_id).await?.ok_or_else(|| {
            AppError::not_found(format!("Profile for user {user_id}"))
        })?;

        tracing::debug!(%user_id, %date, "creating daily diary");
        self.from(tables::DAILY_DIARY)
            .insert(&json!({
                "user_id": user_id,
                "day_date": date,
                "calorie_goal": profile.calorie_goal_value.unwrap_or(0.0),
                "calories_consumed": 0.0,
                "calories_burned": 0.0,
                "protein_goal_g": profile.protein_goal_g.unwrap_or(0.0),
                "carbs_goal_g": profile.carbs_goal_g.unwrap_or(0.0),
                "fat_goal_g": profile.fat_goal_g.unwrap_or(0.0),
                "protein_consumed_g": 0.0,
                "carbs_consumed_g": 0.0,
                "fat_consumed_g": 0.0,
                "protein_ratio": profile.protein_ratio,
                "carbs_ratio": profile.carbs_ratio,
                "fat_ratio": profile.fat_ratio,
            }))
            .await
    }

    /// Food entries for one diary, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    pub async fn food_entries_for_diary(&self, diary_id: Uuid) -> AppResult<Vec<FoodDiaryEntry>> {
        self.from(tables::FOOD_DIARY_ENTRY)
            .eq("day_id", diary_id)
            .order("created_at", Order::Asc)
            .fetch()
            .await
    }

    /// A diary together with its food entries
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    pub async fn diary_with_entries(&self, diary: DailyDiary) -> AppResult<DailyDiaryWithEntries> {
        let food_entries = self.food_entries_for_diary(diary.id).await?;
        Ok(DailyDiaryWithEntries {
            diary,
            food_entries,
        })
    }

    /// Recompute a diary's consumed totals from its full entry set and re-read
    /// the owning user's current macro ratios. Callers must hold the
    /// [`DiaryLocks::diary_key`] lock.
    ///
    /// # Errors
    ///
    /// Returns an error if any store request fails.
    pub async fn recompute_totals(&self, diary_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let entries = self.food_entries_for_diary(diary_id).await?;
        let totals = NutritionTotals::from_entries(&entries);
        let profile: Option<UserProfile> = self.user_profile(user_id).await?;

        let (protein_ratio, carbs_ratio, fat_ratio) = profile.map_or((None, None, None), |p| {
            (p.protein_ratio, p.carbs_ratio, p.fat_ratio)
        });

        self.from(tables::DAILY_DIARY)
            .eq("id", diary_id)
            .update_void(&json!({
                "calories_consumed": totals.calories,
                "protein_consumed_g": totals.protein_g,
                "carbs_consumed_g": totals.carbs_g,
                "fat_consumed_g": totals.fat_g,
                "protein_ratio": protein_ratio,
                "carbs_ratio": carbs_ratio,
                "fat_ratio": fat_ratio,
            }))
            .await?;

        tracing::debug!(%diary_id, entries = entries.len(), calories = totals.calories, "recomputed diary totals");
        Ok(())
    }

    /// Insert a food entry into the given diary. Nutrition values are
    /// denormalized at write time and never re-derived from the catalog.
    /// Callers must hold the diary lock and follow with a recompute.
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    pub async fn insert_food_entry(
        &self,
        user_id: Uuid,
        diary_id: Uuid,
        entry: &NewFoodEntry,
    ) -> AppResult<FoodDiaryEntry> {
        self.from(tables::FOOD_DIARY_ENTRY)
            .insert(&json!({
                "user_id": user_id,
                "day_id": diary_id,
                "food_id": entry.food_id,
                "food_name": entry.food_name,
                "brand": entry.brand,
                "meal_type": entry.meal_type,
                "serving_size": entry.serving_size,
                "serving_unit": entry.serving_unit,
                "calories": entry.calories,
                "protein": entry.protein,
                "carbs": entry.carbs,
                "fat": entry.fat,
            }))
            .await
    }

    /// Fetch one food entry scoped to its owner
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails or the entry does not exist.
    pub async fn food_entry(&self, user_id: Uuid, entry_id: Uuid) -> AppResult<FoodDiaryEntry> {
        self.from(tables::FOOD_DIARY_ENTRY)
            .eq("id", entry_id)
            .eq("user_id", user_id)
            .fetch_one()
            .await
    }

    /// Delete one food entry. Callers must hold the diary lock and follow
    /// with a recompute.
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    pub async fn delete_food_entry(&self, user_id: Uuid, entry_id: Uuid) -> AppResult<()> {
        self.from(tables::FOOD_DIARY_ENTRY)
            .eq("id", entry_id)
            .eq("user_id", user_id)
            .delete()
            .await
    }

    /// Most recent food entries across all diaries of a user
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    pub async fn recent_food_entries(
        &self,
        user_id: Uuid,
        limit: u64,
    ) -> AppResult<Vec<FoodDiaryEntry>> {
        self.from(tables::FOOD_DIARY_ENTRY)
            .eq("user_id", user_id)
            .order("created_at", Order::Desc)
            .limit(limit)
            .fetch()
            .await
    }

    /// Save a workout session with full set-reconciliation of its entries:
    /// request entries carrying ids are updated, entries without ids are
    /// inserted, and stored entries absent from the request are deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if any store request fails or an updated entry does
    /// not exist.
    pub async fn save_activity_diary(
        &self,
        user_id: Uuid,
        request: &SaveActivityDiary,
    ) -> AppResult<ActivityDiaryWithEntries> {
        let session = json!({
            "user_id": user_id,
            "start_at": request.start_at,
            "end_at": request.end_at,
            "bodyweight_kg": request.bodyweight_kg,
            "notes": request.notes,
        });

        let diary: ActivityDiary = match request.id {
            Some(id) => {
                self.from(tables::ACTIVITY_DIARY)
                    .eq("id", id)
                    .eq("user_id", user_id)
                    .update(&session)
                    .await?
            }
            None => self.from(tables::ACTIVITY_DIARY).insert(&session).await?,
        };

        let stored: Vec<ActivityDiaryEntry> = self
            .from(tables::ACTIVITY_DIARY_ENTRY)
            .eq("diary_id", diary.id)
            .fetch()
            .await?;
        let stored_ids: Vec<Uuid> = stored.iter().map(|e| e.id).collect();
        let requested_ids: Vec<Option<Uuid>> = request.entries.iter().map(|e| e.id).collect();

        for stale in stale_entry_ids(&stored_ids, &requested_ids) {
            self.from(tables::ACTIVITY_DIARY_ENTRY)
                .eq("id", stale)
                .delete()
                .await?;
        }

        for entry in &request.entries {
            let payload = json!({
                "diary_id": diary.id,
                "exercise_id": entry.exercise_id,
                "sets_json": entry.sets_json,
                "est_kcal": entry.est_kcal,
                "notes": entry.notes,
            });
            match entry.id {
                Some(id) => {
                    let _: ActivityDiaryEntry = self
                        .from(tables::ACTIVITY_DIARY_ENTRY)
                        .eq("id", id)
                        .eq("diary_id", diary.id)
                        .update(&payload)
                        .await?;
                }
                None => {
                    let _: ActivityDiaryEntry = self
                        .from(tables::ACTIVITY_DIARY_ENTRY)
                        .insert(&payload)
                        .await?;
                }
            }
        }

        self.activity_diary_with_entries(diary).await
    }

    /// Fetch one workout session with its entries, scoped to its owner
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails or the session does not
    /// exist.
    pub async fn activity_diary_by_id(
        &self,
        user_id: Uuid,
        diary_id: Uuid,
    ) -> AppResult<ActivityDiaryWithEntries> {
        let diary: ActivityDiary = self
            .from(tables::ACTIVITY_DIARY)
            .eq("id", diary_id)
            .eq("user_id", user_id)
            .fetch_one()
            .await?;
        self.activity_diary_with_entries(diary).await
    }

    /// Workout sessions starting on the given calendar day, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    pub async fn activity_diaries_by_date(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Vec<ActivityDiaryWithEntries>> {
        let day_start = date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .ok_or_else(|| AppError::invalid_input("Invalid date"))?;
        let day_end = day_start + chrono::Duration::days(1);

        let diaries: Vec<ActivityDiary> = self
            .from(tables::ACTIVITY_DIARY)
            .eq("user_id", user_id)
            .gte("start_at", day_start.to_rfc3339())
            .lt("start_at", day_end.to_rfc3339())
            .order("start_at", Order::Asc)
            .fetch()
            .await?;

        let mut sessions = Vec::with_capacity(diaries.len());
        for diary in diaries {
            sessions.push(self.activity_diary_with_entries(diary).await?);
        }
        Ok(sessions)
    }

    /// All workout sessions of a user, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    pub async fn activity_diaries(&self, user_id: Uuid) -> AppResult<Vec<ActivityDiary>> {
        self.from(tables::ACTIVITY_DIARY)
            .eq("user_id", user_id)
            .order("start_at", Order::Desc)
            .fetch()
            .await
    }

    /// Most recent workout sessions for the dashboard feed
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    pub async fn recent_activity_diaries(
        &self,
        user_id: Uuid,
        limit: u64,
    ) -> AppResult<Vec<ActivityDiary>> {
        self.from(tables::ACTIVITY_DIARY)
            .eq("user_id", user_id)
            .order("start_at", Order::Desc)
            .limit(limit)
            .fetch()
            .await
    }

    async fn activity_diary_with_entries(
        &self,
        diary: ActivityDiary,
    ) -> AppResult<ActivityDiaryWithEntries> {
        let entries = self
            .from(tables::ACTIVITY_DIARY_ENTRY)
            .eq("diary_id", diary.id)
            .order("created_at", Order::Asc)
            .fetch()
            .await?;
        Ok(ActivityDiaryWithEntries { diary, entries })
    }
}
