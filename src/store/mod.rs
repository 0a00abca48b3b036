// ABOUTME: Persistence gateway over the hosted Postgres REST service
// ABOUTME: Scoped store handles (user bearer vs service role) and table names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrack

//! # Persistence Gateway
//!
//! All persistence flows through [`Store`], a scoped handle on the hosted
//! Postgres REST service. A store is either user-scoped (anon key plus the
//! caller's forwarded bearer token, so row-level security applies) or
//! service-scoped (service-role key, used by the nightly pipeline and other
//! paths with no per-request user context).
//!
//! Domain operations live in `impl Store` blocks spread across the domain
//! modules (`diary`, `users`, `steps`, `foods`, `notifications`,
//! `recommendations`); this module only provides the handle and the table
//! name constants.

pub mod postgrest;

pub use postgrest::{Order, PostgrestClient, QueryBuilder};

use crate::config::SupabaseConfig;
use crate::errors::AppResult;

/// Table names on the hosted Postgres REST service
pub mod tables {
    pub const USER_PROFILES: &str = "user_profiles";
    pub const DAILY_DIARY: &str = "daily_diary";
    pub const FOOD_DIARY_ENTRY: &str = "food_diary_entry";
    pub const ACTIVITY_DIARY: &str = "activity_diary";
    pub const ACTIVITY_DIARY_ENTRY: &str = "activity_diary_entry";
    pub const STEP_MEASUREMENTS: &str = "step_measurements";
    pub const USER_WEIGHTS: &str = "user_weights";
    pub const AI_RECOMMENDATIONS: &str = "ai_recommendations";
    pub const USER_PUSH_TOKENS: &str = "user_push_tokens";
    pub const FOODS: &str = "foods";
    pub const FOOD_CATEGORIES: &str = "food_categories";
    pub const FOOD_TRANSLATIONS: &str = "food_translations";
    pub const FOOD_PORTIONS: &str = "food_portions";
    pub const FOOD_PORTION_TRANSLATIONS: &str = "food_portion_translations";
}

/// Scoped handle on the persistence service
#[derive(Debug, Clone)]
pub struct Store {
    client: PostgrestClient,
}

impl Store {
    /// Store scoped to one authenticated user. The caller's bearer token is
    /// forwarded on every request so row-level security applies.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn for_user(config: &SupabaseConfig, bearer: &str) -> AppResult<Self> {
        Ok(Self {
            client: PostgrestClient::new(&config.url, &config.anon_key, bearer)?,
        })
    }

    /// Store with service-role access, bypassing row-level security. Only for
    /// flows with no per-request user context.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn for_service(config: &SupabaseConfig) -> AppResult<Self> {
        Ok(Self {
            client: PostgrestClient::new(
                &config.url,
                &config.service_role_key,
                &config.service_role_key,
            )?,
        })
    }

    /// Begin a query against the given table
    #[must_use]
    pub fn from(&self, table: &str) -> QueryBuilder<'_> {
        self.client.from(table)
    }
}
