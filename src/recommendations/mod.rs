// ABOUTME: AI recommendation storage: list, insert, viewed flag
// ABOUTME: Candidate-user enumeration for the nightly pipeline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrack

//! # Recommendations
//!
//! A recommendation row is immutable once created except for its `viewed`
//! flag: the exact prompt, the raw model response, the model id, and the
//! prompt template version are all frozen at generation time so later
//! template changes never reinterpret old artifacts.

pub mod agent;

pub use agent::{RecommendationAgent, PROMPT_VERSION};

use crate::config::RecommendationStrategy;
use crate::errors::AppResult;
use crate::models::AiRecommendation;
use crate::store::{tables, Order, Store};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

impl Store {
    /// All recommendations of one user, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    pub async fn recommendations(&self, user_id: Uuid) -> AppResult<Vec<AiRecommendation>> {
        self.from(tables::AI_RECOMMENDATIONS)
            .eq("user_id", user_id)
            .order("created_at", Order::Desc)
            .fetch()
            .await
    }

    /// Persist a freshly generated recommendation with `viewed = false`
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    pub async fn insert_recommendation(
        &self,
        user_id: Uuid,
        analyzed_date: NaiveDate,
        prompt: &str,
        response: &str,
        model_used: &str,
        prompt_version: i32,
    ) -> AppResult<AiRecommendation> {
        self.from(tables::AI_RECOMMENDATIONS)
            .insert(&json!({
                "user_id": user_id,
                "analyzed_date": analyzed_date,
                "prompt_version": prompt_version,
                "prompt": prompt,
                "response": response,
                "model_used": model_used,
                "viewed": false,
            }))
            .await
    }

    /// Mark a recommendation viewed, scoped to its owner
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails or the row does not exist.
    pub async fn mark_recommendation_viewed(
        &self,
        user_id: Uuid,
        recommendation_id: Uuid,
    ) -> AppResult<AiRecommendation> {
        self.from(tables::AI_RECOMMENDATIONS)
            .eq("id", recommendation_id)
            .eq("user_id", user_id)
            .update(&json!({ "viewed": true }))
            .await
    }

    /// Candidate user ids for the nightly pipeline, per the configured
    /// strategy
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    pub async fn recommendation_candidates(
        &self,
        strategy: RecommendationStrategy,
    ) -> AppResult<Vec<Uuid>> {
        match strategy {
            RecommendationStrategy::Profiles => self.profile_user_ids().await,
            RecommendationStrategy::PushTokens => self.users_with_push_tokens().await,
        }
    }

    /// User ids holding a profile row
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    pub async fn profile_user_ids(&self) -> AppResult<Vec<Uuid>> {
        #[derive(Deserialize)]
        struct UserIdRow {
            user_id: Uuid,
        }

        let rows: Vec<UserIdRow> = self
            .from(tables::USER_PROFILES)
            .select("user_id")
            .fetch()
            .await?;
        Ok(rows.into_iter().map(|r| r.user_id).collect())
    }
}
