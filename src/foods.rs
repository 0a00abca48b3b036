// ABOUTME: Food catalog writes (base row, translation, portion, portion translation)
// ABOUTME: Compensating deletes on partial failure and locale-scoped paginated search
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrack

//! # Food Catalog
//!
//! Creating a food writes four related rows in order: the base `foods` row,
//! its locale translation, a default portion, and the portion's translation.
//! The hosted REST surface offers no multi-table transaction, so a failure
//! after the first write triggers compensating deletes of everything written
//! so far. Every compensation is attempted and its outcome logged; the
//! original error is what surfaces to the caller.
//!
//! Search joins the locale's translations and portions in one embedded
//! select and paginates with an exact server-side count.

use crate::errors::{AppError, AppResult};
use crate::models::ServingUnit;
use crate::store::{tables, Order, Store};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

/// Kilocalories to kilojoules
const KCAL_TO_KJ: f64 = 4.184;

/// Derive the kilojoule value stored alongside every kilocalorie value
#[must_use]
pub fn kcal_to_kj(kcal: f64) -> f64 {
    kcal * KCAL_TO_KJ
}

/// Request payload for creating a custom food
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFood {
    /// Display name, stored as the locale translation
    pub name: String,
    /// Category slug; must resolve to an existing `food_categories` row
    pub category: String,
    /// Brand name
    pub brand: String,
    /// Barcode, when scanned
    #[serde(default)]
    pub barcode: Option<String>,
    /// Default portion size in `serving_size_unit`
    pub serving_size_value: f64,
    /// Unit of the default portion
    pub serving_size_unit: ServingUnit,
    /// Energy per serving, kilocalories
    pub calories: f64,
    /// Protein per serving, grams
    pub protein: f64,
    /// Carbohydrates per serving, grams
    pub carbs: f64,
    /// Fat per serving, grams
    pub fats: f64,
    /// Sugar per serving, grams
    pub sugar: f64,
    /// Fiber per serving, grams
    pub fiber: f64,
    /// Salt per serving, grams
    pub salt: f64,
}

/// A catalog food as served to clients: base nutrition joined with the
/// caller's locale translation and default portion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Food {
    pub id: Uuid,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    pub name: String,
    pub category: Option<String>,
    pub serving_size_value: Option<f64>,
    pub serving_size_unit: ServingUnit,
    pub brand: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    #[serde(default)]
    pub sugar: Option<f64>,
    #[serde(default)]
    pub fiber: Option<f64>,
    #[serde(default)]
    pub salt: Option<f64>,
}

/// One page of search results
#[derive(Debug, Clone, Serialize)]
pub struct FoodSearchPage {
    /// Matching foods for this page
    pub items: Vec<Food>,
    /// Exact total match count ignoring pagination
    pub total_count: u64,
    /// 1-based page number echoed from the request
    pub page: u64,
    /// Page size echoed from the request
    pub limit: u64,
    /// Whether further pages exist
    pub has_more: bool,
}

/// Whether pages remain after the given 1-based page
#[must_use]
pub fn has_more_pages(total_count: u64, page: u64, limit: u64) -> bool {
    total_count > page.saturating_mul(limit)
}

#[derive(Debug, Deserialize)]
struct IdRow {
    id: Uuid,
}

#[derive(Debug, Deserialize)]
struct FoodRow {
    id: Uuid,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct SearchRow {
    id: Uuid,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    barcode: Option<String>,
    energy_kcal: f64,
    protein_g: f64,
    carbs_g: f64,
    fat_g: f64,
    #[serde(default)]
    sugar_g: Option<f64>,
    #[serde(default)]
    fiber_g: Option<f64>,
    #[serde(default)]
    salt_g: Option<f64>,
    #[serde(default)]
    food_translations: Vec<TranslationRow>,
    #[serde(default)]
    food_category: Option<CategorySlugRow>,
    #[serde(default)]
    food_portions: Vec<PortionJoinRow>,
}

#[derive(Debug, Deserialize)]
struct TranslationRow {
    name: String,
    #[serde(default)]
    brand: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CategorySlugRow {
    slug: String,
}

#[derive(Debug, Deserialize)]
struct PortionJoinRow {
    portion_weight_g: f64,
    #[serde(default)]
    food_portion_translations: Vec<PortionNameRow>,
}

#[derive(Debug, Deserialize)]
struct PortionNameRow {
    name: String,
}

impl SearchRow {
    fn into_food(self) -> Food {
        // First portion is the default one; the unit lives only in the
        // portion translation's display name.
        let portion = self.food_portions.first();
        let serving_size_unit = portion
            .and_then(|p| p.food_portion_translations.first())
            .map_or(ServingUnit::G, |t| {
                if t.name.to_lowercase().contains("ml") {
                    ServingUnit::Ml
                } else {
                    ServingUnit::G
                }
            });

        let translation = self.food_translations.into_iter().next();
        Food {
            id: self.id,
            created_at: self.created_at,
            name: translation.as_ref().map(|t| t.name.clone()).unwrap_or_default(),
            category: self.food_category.map(|c| c.slug),
            serving_size_value: portion.map(|p| p.portion_weight_g),
            serving_size_unit,
            brand: translation.and_then(|t| t.brand),
            barcode: self.barcode,
            calories: self.energy_kcal,
            protein: self.protein_g,
            carbs: self.carbs_g,
            fats: self.fat_g,
            sugar: self.sugar_g,
            fiber: self.fiber_g,
            salt: self.salt_g,
        }
    }
}

/// Embedded select joining translations, category, and portions
const SEARCH_SELECT: &str = "*,food_translations!inner(name,brand),\
food_category:food_categories(slug),\
food_portions(id,portion_weight_g,food_portion_translations!inner(name))";

impl Store {
    /// Create a custom food with its translation and default portion.
    ///
    /// The four writes are not atomic; on failure, already-written rows are
    /// deleted in reverse order and each compensation outcome is logged.
    ///
    /// # Errors
    ///
    /// Returns an error if the category slug is unknown or any write fails.
    pub async fn create_food(
        &self,
        user_id: Uuid,
        locale: &str,
        food: &CreateFood,
    ) -> AppResult<Food> {
        let category: IdRow = self
            .from(tables::FOOD_CATEGORIES)
            .eq("slug", &food.category)
            .fetch_optional()
            .await?
            .ok_or_else(|| {
                AppError::invalid_input(format!("Unknown food category '{}'", food.category))
            })?;

        let base: FoodRow = self
            .from(tables::FOODS)
            .insert(&json!({
                "food_category_id": category.id,
                "food_name": food.name,
                "barcode": food.barcode,
                "energy_kcal": food.calories,
                "energy_kj": kcal_to_kj(food.calories),
                "protein_g": food.protein,
                "carbs_g": food.carbs,
                "fat_g": food.fats,
                "fiber_g": food.fiber,
                "sugar_g": food.sugar,
                "salt_g": food.salt,
                "created_by": user_id,
                "is_custom": true,
            }))
            .await?;

        if let Err(e) = self
            .from(tables::FOOD_TRANSLATIONS)
            .insert::<serde_json::Value>(&json!({
                "food_id": base.id,
                "locale": locale,
                "name": food.name,
                "brand": food.brand,
            }))
            .await
        {
            self.compensate_food(base.id, None, false).await;
            return Err(e);
        }

        let portion: IdRow = match self
            .from(tables::FOOD_PORTIONS)
            .insert(&json!({
                "food_id": base.id,
                "portion_weight_g": food.serving_size_value,
            }))
            .await
        {
            Ok(row) => row,
            Err(e) => {
                self.compensate_food(base.id, None, true).await;
                return Err(e);
            }
        };

        if let Err(e) = self
            .from(tables::FOOD_PORTION_TRANSLATIONS)
            .insert::<serde_json::Value>(&json!({
                "food_portion_id": portion.id,
                "locale": locale,
                "name": format!("{} {}", food.serving_size_value, unit_label(food.serving_size_unit)),
            }))
            .await
        {
            self.compensate_food(base.id, Some(portion.id), true).await;
            return Err(e);
        }

        Ok(Food {
            id: base.id,
            created_at: base.created_at,
            name: food.name.clone(),
            category: Some(food.category.clone()),
            serving_size_value: Some(food.serving_size_value),
            serving_size_unit: food.serving_size_unit,
            brand: Some(food.brand.clone()),
            barcode: food.barcode.clone(),
            calories: food.calories,
            protein: food.protein,
            carbs: food.carbs,
            fats: food.fats,
            sugar: Some(food.sugar),
            fiber: Some(food.fiber),
            salt: Some(food.salt),
        })
    }

    /// Delete the rows written so far for a failed food creation, in reverse
    /// write order. Every delete is attempted; failures are logged and do not
    /// stop the remaining compensations.
    async fn compensate_food(&self, food_id: Uuid, portion_id: Option<Uuid>, translation: bool) {
        if let Some(portion_id) = portion_id {
            if let Err(e) = self
                .from(tables::FOOD_PORTIONS)
                .eq("id", portion_id)
                .delete()
                .await
            {
                tracing::error!(%food_id, %portion_id, error = %e, "failed to compensate food portion");
            }
        }
        if translation {
            if let Err(e) = self
                .from(tables::FOOD_TRANSLATIONS)
                .eq("food_id", food_id)
                .delete()
                .await
            {
                tracing::error!(%food_id, error = %e, "failed to compensate food translation");
            }
        }
        if let Err(e) = self.from(tables::FOODS).eq("id", food_id).delete().await {
            tracing::error!(%food_id, error = %e, "failed to compensate food row");
        } else {
            tracing::warn!(%food_id, "rolled back partial food creation");
        }
    }

    /// Search the catalog in the caller's locale with exact-count pagination.
    /// `page` is 1-based; an empty query lists everything newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    pub async fn search_foods(
        &self,
        locale: &str,
        query: &str,
        page: u64,
        limit: u64,
    ) -> AppResult<FoodSearchPage> {
        let page = page.max(1);
        let offset = (page - 1) * limit;

        let mut builder = self
            .from(tables::FOODS)
            .select(SEARCH_SELECT)
            .eq("food_translations.locale", locale)
            .eq("food_portions.food_portion_translations.locale", locale);

        let trimmed = query.trim();
        if !trimmed.is_empty() {
            builder = builder.ilike("food_translations.name", &format!("%{trimmed}%"));
        }

        let (rows, total_count): (Vec<SearchRow>, u64) = builder
            .order("created_at", Order::Desc)
            .limit(limit)
            .offset(offset)
            .fetch_with_count()
            .await?;

        Ok(FoodSearchPage {
            items: rows.into_iter().map(SearchRow::into_food).collect(),
            total_count,
            page,
            limit,
            has_more: has_more_pages(total_count, page, limit),
        })
    }
}

const fn unit_label(unit: ServingUnit) -> &'static str {
    match unit {
        ServingUnit::G => "g",
        ServingUnit::Ml => "ml",
    }
}
