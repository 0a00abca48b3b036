// ABOUTME: User profile reads and writes with macro-ratio validation and goal cascade
// ABOUTME: Append-only weight log with pound-to-kilogram normalization
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrack

//! # User Profiles and Weights
//!
//! Profile lookups are always scoped by an explicit user id; there is no
//! ambient "current profile" query anywhere in the crate. Updating the
//! calorie goal, macro goals, or macro ratios rewrites those columns on every
//! existing daily diary row of the user, past days included.
//!
//! Weights are an append-only series normalized to kilograms at write time;
//! the latest row by `measured_at` is the user's current weight.

use crate::errors::{AppError, AppResult};
use crate::models::{
    ActivityLevel, CalorieUnit, ExperienceLevel, Gender, Goal, HeightUnit, UserProfile,
    UserWeight, WeightUnit,
};
use crate::store::{tables, Order, Store};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

/// Pounds to kilograms
const LBS_TO_KG: f64 = 0.453_592_37;

/// Convert a weight to kilograms for storage
#[must_use]
pub fn to_kilograms(value: f64, unit: WeightUnit) -> f64 {
    match unit {
        WeightUnit::Kg => value,
        WeightUnit::Lbs => value * LBS_TO_KG,
    }
}

/// Reject macro ratio combinations that allocate more than 100% of calories.
/// Absent ratios count as zero.
///
/// # Errors
///
/// Returns an invalid-input error when the provided ratios sum above 100.
pub fn validate_macro_ratios(
    protein: Option<f64>,
    carbs: Option<f64>,
    fat: Option<f64>,
) -> AppResult<()> {
    let total = protein.unwrap_or(0.0) + carbs.unwrap_or(0.0) + fat.unwrap_or(0.0);
    if total > 100.0 {
        return Err(AppError::invalid_input(format!(
            "Macro ratios must not exceed 100% (got {total}%)"
        )));
    }
    Ok(())
}

/// Profile fields a client may set. Everything is optional; absent fields are
/// left untouched on update. Serialized directly as the store payload, so
/// absent fields must not appear on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding_completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_unit: Option<HeightUnit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_unit: Option<WeightUnit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_weight_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_weight_unit: Option<WeightUnit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<ActivityLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<ExperienceLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<Goal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calorie_goal_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calorie_goal_unit: Option<CalorieUnit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein_goal_g: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs_goal_g: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat_goal_g: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications_enabled: Option<bool>,
}

impl ProfileUpdate {
    /// Validate the update against the stored profile: the effective ratio
    /// set after the merge must not exceed 100%.
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error when the merged ratios sum above 100.
    pub fn validate_against(&self, current: Option<&UserProfile>) -> AppResult<()> {
        let protein = self
            .protein_ratio
            .or_else(|| current.and_then(|p| p.protein_ratio));
        let carbs = self
            .carbs_ratio
            .or_else(|| current.and_then(|p| p.carbs_ratio));
        let fat = self.fat_ratio.or_else(|| current.and_then(|p| p.fat_ratio));
        validate_macro_ratios(protein, carbs, fat)
    }

    /// Diary columns affected by this update, as a store payload. Empty when
    /// no goal or ratio field is present.
    #[must_use]
    pub fn diary_cascade(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut cascade = serde_json::Map::new();
        let mut put = |key: &str, value: Option<f64>| {
            if let Some(v) = value {
                cascade.insert(key.to_owned(), json!(v));
            }
        };
        put("calorie_goal", self.calorie_goal_value);
        put("protein_goal_g", self.protein_goal_g);
        put("carbs_goal_g", self.carbs_goal_g);
        put("fat_goal_g", self.fat_goal_g);
        put("protein_ratio", self.protein_ratio);
        put("carbs_ratio", self.carbs_ratio);
        put("fat_ratio", self.fat_ratio);
        cascade
    }
}

/// Request payload for logging one weight measurement
#[derive(Debug, Clone, Deserialize)]
pub struct NewWeight {
    /// Measured value in `weight_unit`
    pub weight_value: f64,
    /// Unit of `weight_value`
    pub weight_unit: WeightUnit,
    /// When the measurement was taken; defaults to now
    #[serde(default)]
    pub measured_at: Option<DateTime<Utc>>,
    /// Reporting source
    #[serde(default)]
    pub source: Option<String>,
}

impl Store {
    /// Fetch the profile of one user
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    pub async fn user_profile(&self, user_id: Uuid) -> AppResult<Option<UserProfile>> {
        self.from(tables::USER_PROFILES)
            .eq("user_id", user_id)
            .fetch_optional()
            .await
    }

    /// Create a profile for a user who does not have one yet
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails, the update is invalid, or
    /// a profile already exists.
    pub async fn create_user_profile(
        &self,
        user_id: Uuid,
        email: Option<&str>,
        update: &ProfileUpdate,
    ) -> AppResult<UserProfile> {
        update.validate_against(None)?;
        if self.user_profile(user_id).await?.is_some() {
            return Err(AppError::invalid_input("Profile already exists"));
        }

        let mut payload = serde_json::to_value(update)
            .map_err(|e| AppError::internal(format!("Failed to serialize profile: {e}")))?;
        if let Some(map) = payload.as_object_mut() {
            map.insert("user_id".into(), json!(user_id));
            map.insert("email".into(), json!(email));
        }
        self.from(tables::USER_PROFILES).insert(&payload).await
    }

    /// Apply a partial profile update, then rewrite the goal and ratio
    /// columns on all of the user's existing daily diaries so past days
    /// reflect the new targets as well.
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails, validation fails, or the
    /// profile does not exist.
    pub async fn update_user_profile(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> AppResult<UserProfile> {
        let current = self.user_profile(user_id).await?;
        if current.is_none() {
            return Err(AppError::not_found(format!("Profile for user {user_id}")));
        }
        update.validate_against(current.as_ref())?;

        let profile: UserProfile = self
            .from(tables::USER_PROFILES)
            .eq("user_id", user_id)
            .update(update)
            .await?;

        let cascade = update.diary_cascade();
        if !cascade.is_empty() {
            tracing::debug!(%user_id, columns = cascade.len(), "cascading goal update to daily diaries");
            self.from(tables::DAILY_DIARY)
                .eq("user_id", user_id)
                .update_void(&serde_json::Value::Object(cascade))
                .await?;
        }

        Ok(profile)
    }

    /// Append a weight measurement, normalized to kilograms
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    pub async fn add_weight(&self, user_id: Uuid, weight: &NewWeight) -> AppResult<UserWeight> {
        let measured_at = weight.measured_at.unwrap_or_else(Utc::now);
        self.from(tables::USER_WEIGHTS)
            .insert(&json!({
                "user_id": user_id,
                "weight_kg": to_kilograms(weight.weight_value, weight.weight_unit),
                "measured_at": measured_at,
                "source": weight.source,
            }))
            .await
    }

    /// Full weight history, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    pub async fn weights(&self, user_id: Uuid) -> AppResult<Vec<UserWeight>> {
        self.from(tables::USER_WEIGHTS)
            .eq("user_id", user_id)
            .order("measured_at", Order::Desc)
            .fetch()
            .await
    }

    /// Weight measurements within the trailing window of `days`, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    pub async fn weights_since(&self, user_id: Uuid, days: i64) -> AppResult<Vec<UserWeight>> {
        let cutoff = Utc::now() - Duration::days(days);
        self.from(tables::USER_WEIGHTS)
            .eq("user_id", user_id)
            .gte("measured_at", cutoff.to_rfc3339())
            .order("measured_at", Order::Desc)
            .fetch()
            .await
    }
}
