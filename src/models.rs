// ABOUTME: Domain row types and enums shared across the persistence and HTTP layers
// ABOUTME: Profiles, diaries, food entries, weights, steps, recommendations, push tokens
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrack

//! Core domain models.
//!
//! Each struct mirrors one relation of the hosted store. Nutrition values on a
//! [`FoodDiaryEntry`] are denormalized at write time and never re-derived from
//! the food catalog.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Height unit for profile measurements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeightUnit {
    /// Centimetres
    Cm,
    /// Inches
    Inch,
}

/// Weight unit for profile and weight-log measurements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    /// Kilograms
    Kg,
    /// Pounds
    Lbs,
}

/// Self-reported daily activity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    /// Little to no exercise
    Sedentary,
    /// Light exercise 1-3 days a week
    Light,
    /// Moderate exercise 3-5 days a week
    Moderate,
    /// Hard exercise 6-7 days a week
    High,
    /// Athlete-level training load
    Extreme,
}

/// Training experience level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    /// New to training
    Beginner,
    /// Some consistent training history
    Intermediate,
    /// Long consistent training history
    Advanced,
}

/// User goal driving calorie targets and recommendation tone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    /// Caloric deficit
    LoseFat,
    /// Caloric maintenance
    MaintainWeight,
    /// Caloric surplus
    GainMuscle,
}

/// Calorie unit for the profile's calorie goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalorieUnit {
    /// Kilocalories
    Kcal,
    /// Kilojoules
    Kj,
}

/// User gender as used in the recommendation prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Male
    Male,
    /// Female
    Female,
    /// Other / undisclosed
    Other,
}

/// Meal slot a food entry is logged under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    /// First meal of the day
    Breakfast,
    /// Midday meal
    Lunch,
    /// Evening meal
    Dinner,
    /// Anything in between
    Snack,
}

impl MealType {
    /// Lowercase wire name, used when embedding entries into prompts
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
        }
    }
}

/// Serving unit for a logged food entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServingUnit {
    /// Grams
    G,
    /// Millilitres
    Ml,
}

/// One `user_profiles` row.
///
/// Most columns are nullable in the hosted schema because onboarding fills
/// them in incrementally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Row id
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Email copied from the auth token at profile creation
    pub email: Option<String>,
    /// Whether the onboarding flow has completed
    #[serde(default)]
    pub onboarding_completed: Option<bool>,
    /// First name
    #[serde(default)]
    pub first_name: Option<String>,
    /// Last name
    #[serde(default)]
    pub last_name: Option<String>,
    /// Age in years
    #[serde(default)]
    pub age: Option<i32>,
    /// Height in `height_unit`
    #[serde(default)]
    pub height_value: Option<f64>,
    /// Unit of `height_value`
    #[serde(default)]
    pub height_unit: Option<HeightUnit>,
    /// Current weight in `weight_unit`
    #[serde(default)]
    pub weight_value: Option<f64>,
    /// Unit of `weight_value`
    #[serde(default)]
    pub weight_unit: Option<WeightUnit>,
    /// Target weight in `target_weight_unit`
    #[serde(default)]
    pub target_weight_value: Option<f64>,
    /// Unit of `target_weight_value`
    #[serde(default)]
    pub target_weight_unit: Option<WeightUnit>,
    /// Daily activity level
    #[serde(default)]
    pub activity_level: Option<ActivityLevel>,
    /// Training experience level
    #[serde(default)]
    pub experience_level: Option<ExperienceLevel>,
    /// Current goal
    #[serde(default)]
    pub goal: Option<Goal>,
    /// Daily calorie goal in `calorie_goal_unit`
    #[serde(default)]
    pub calorie_goal_value: Option<f64>,
    /// Unit of `calorie_goal_value`
    #[serde(default)]
    pub calorie_goal_unit: Option<CalorieUnit>,
    /// Daily protein goal in grams
    #[serde(default)]
    pub protein_goal_g: Option<f64>,
    /// Daily carbohydrate goal in grams
    #[serde(default)]
    pub carbs_goal_g: Option<f64>,
    /// Daily fat goal in grams
    #[serde(default)]
    pub fat_goal_g: Option<f64>,
    /// Target share of calories from protein, percent
    #[serde(default)]
    pub protein_ratio: Option<f64>,
    /// Target share of calories from carbohydrates, percent
    #[serde(default)]
    pub carbs_ratio: Option<f64>,
    /// Target share of calories from fat, percent
    #[serde(default)]
    pub fat_ratio: Option<f64>,
    /// Gender
    #[serde(default)]
    pub gender: Option<Gender>,
    /// Whether push notifications are enabled
    #[serde(default)]
    pub notifications_enabled: Option<bool>,
}

/// One `daily_diary` row: a user's nutrition ledger for one calendar day.
///
/// Goals and ratios are copied from the profile; consumed totals are derived
/// from the day's food entries and recomputed on every entry mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyDiary {
    /// Row id
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Calendar date this diary covers
    pub day_date: NaiveDate,
    /// Calorie goal copied from the profile
    pub calorie_goal: f64,
    /// Sum of entry calories
    pub calories_consumed: f64,
    /// Calories burned (activity-side, informational)
    #[serde(default)]
    pub calories_burned: f64,
    /// Protein goal in grams
    pub protein_goal_g: f64,
    /// Carbohydrate goal in grams
    pub carbs_goal_g: f64,
    /// Fat goal in grams
    pub fat_goal_g: f64,
    /// Sum of entry protein in grams
    pub protein_consumed_g: f64,
    /// Sum of entry carbohydrates in grams
    pub carbs_consumed_g: f64,
    /// Sum of entry fat in grams
    pub fat_consumed_g: f64,
    /// Protein ratio copied from the profile at last recompute
    #[serde(default)]
    pub protein_ratio: Option<f64>,
    /// Carbohydrate ratio copied from the profile at last recompute
    #[serde(default)]
    pub carbs_ratio: Option<f64>,
    /// Fat ratio copied from the profile at last recompute
    #[serde(default)]
    pub fat_ratio: Option<f64>,
}

/// A [`DailyDiary`] together with its food entries, as served to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyDiaryWithEntries {
    /// The diary row
    #[serde(flatten)]
    pub diary: DailyDiary,
    /// Food entries for the day, oldest first
    pub food_entries: Vec<FoodDiaryEntry>,
}

/// One `food_diary_entry` row: a single logged consumption event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodDiaryEntry {
    /// Row id
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Parent daily diary
    pub day_id: Uuid,
    /// Food catalog reference (informational; values below are authoritative)
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
    /// Protein in grams for this serving
    pub protein: f64,
    /// Carbohydrates in grams for this serving
    pub carbs: f64,
    /// Fat in grams for this serving
    pub fat: f64,
    /// Creation timestamp (drives in-day ordering)
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// One `activity_diary` row: a workout session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityDiary {
    /// Row id
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
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
}

/// One `activity_diary_entry` row: one exercise within a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityDiaryEntry {
    /// Row id
    pub id: Uuid,
    /// Parent activity diary
    pub diary_id: Uuid,
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
    /// Creation timestamp (drives in-session ordering)
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// An [`ActivityDiary`] together with its entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityDiaryWithEntries {
    /// The diary row
    #[serde(flatten)]
    pub diary: ActivityDiary,
    /// Entries, oldest first
    pub entries: Vec<ActivityDiaryEntry>,
}

/// One `step_measurements` row. One row per (user, calendar day).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepMeasurement {
    /// Row id
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Measurement window start
    pub start_time: DateTime<Utc>,
    /// Measurement window end
    pub end_time: DateTime<Utc>,
    /// Step count for the window
    pub step_count: i64,
    /// Reporting source (device, app)
    #[serde(default)]
    pub source: Option<String>,
}

/// One `ai_recommendations` row. Immutable once created except `viewed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiRecommendation {
    /// Row id
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// The diary date the recommendation analyzed
    pub analyzed_date: NaiveDate,
    /// Version of the prompt template in force when generated
    pub prompt_version: i32,
    /// Exact prompt sent to the completion API
    pub prompt: String,
    /// Raw model response, stored without parsing or validation
    pub response: String,
    /// Model identifier used for generation
    pub model_used: String,
    /// Whether the user has opened the recommendation
    pub viewed: bool,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// One `user_weights` row. Append-only; the latest row by `measured_at` is
/// the user's current weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserWeight {
    /// Row id
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Weight normalized to kilograms
    pub weight_kg: f64,
    /// When the measurement was taken
    pub measured_at: DateTime<Utc>,
    /// Reporting source (manual, scale, import)
    #[serde(default)]
    pub source: Option<String>,
}

/// One `user_push_tokens` row; upserted by `(user, device)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushToken {
    /// Row id
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Provider push token for the device
    pub push_token: String,
    /// Stable device identifier
    #[serde(default)]
    pub device_id: Option<String>,
    /// Human-readable device name
    #[serde(default)]
    pub device_name: Option<String>,
}

/// Summed nutrition values over a set of food entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionTotals {
    /// Total calories
    pub calories: f64,
    /// Total protein in grams
    pub protein_g: f64,
    /// Total carbohydrates in grams
    pub carbs_g: f64,
    /// Total fat in grams
    pub fat_g: f64,
}

impl NutritionTotals {
    /// Sum the denormalized nutrition values of the given entries.
    ///
    /// The invariant maintained by the diary aggregator is that a diary's
    /// consumed columns always equal this sum over its current entries.
    #[must_use]
    pub fn from_entries(entries: &[FoodDiaryEntry]) -> Self {
        entries.iter().fold(Self::default(), |acc, entry| Self {
            calories: acc.calories + entry.calories,
            protein_g: acc.protein_g + entry.protein,
            carbs_g: acc.carbs_g + entry.carbs,
            fat_g: acc.fat_g + entry.fat,
        })
    }
}
