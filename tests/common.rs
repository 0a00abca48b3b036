// ABOUTME: Shared test utilities for integration tests
// ABOUTME: Config builders, token signing, and canned store row payloads
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrack

use chrono::NaiveDate;
use jsonwebtoken::{encode, EncodingKey, Header};
use nutrack::config::{
    AuthConfig, OpenAiConfig, RecommendationConfig, RecommendationStrategy, ServerConfig,
    SupabaseConfig,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Once;
use uuid::Uuid;

/// Shared JWT secret for tests
pub const TEST_JWT_SECRET: &str = "test-secret";

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_test_writer()
            .try_init();
    });
}

/// Server configuration pointed at a mock store endpoint
pub fn test_config(store_url: &str) -> ServerConfig {
    ServerConfig {
        http_port: 0,
        supabase: supabase_config(store_url),
        openai: OpenAiConfig {
            api_key: "sk-test".into(),
            model: "gpt-4o-mini".into(),
        },
        auth: AuthConfig {
            jwt_secret: TEST_JWT_SECRET.into(),
        },
        recommendations: RecommendationConfig {
            strategy: RecommendationStrategy::Profiles,
            scheduler_enabled: false,
        },
    }
}

/// Store configuration pointed at a mock endpoint
pub fn supabase_config(store_url: &str) -> SupabaseConfig {
    SupabaseConfig {
        url: store_url.into(),
        anon_key: "anon-key".into(),
        service_role_key: "service-key".into(),
    }
}

#[derive(Serialize)]
struct TestClaims {
    sub: String,
    email: String,
    aud: String,
    exp: i64,
}

/// Sign a bearer token the auth manager accepts
pub fn sign_token(user_id: Uuid) -> String {
    let claims = TestClaims {
        sub: user_id.to_string(),
        email: "user@example.com".into(),
        aud: "authenticated".into(),
        exp: chrono::Utc::now().timestamp() + 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

/// A `user_profiles` row with goals and ratios filled in
pub fn profile_row(user_id: Uuid) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "user_id": user_id,
        "email": "user@example.com",
        "weight_value": 85.0,
        "weight_unit": "kg",
        "target_weight_value": 78.0,
        "goal": "lose_fat",
        "gender": "male",
        "calorie_goal_value": 2000.0,
        "protein_goal_g": 150.0,
        "carbs_goal_g": 200.0,
        "fat_goal_g": 70.0,
        "protein_ratio": 30.0,
        "carbs_ratio": 45.0,
        "fat_ratio": 25.0
    })
}

/// A `daily_diary` row with zeroed consumed totals
pub fn diary_row(diary_id: Uuid, user_id: Uuid, date: NaiveDate) -> Value {
    json!({
        "id": diary_id,
        "user_id": user_id,
        "day_date": date,
        "calorie_goal": 2000.0,
        "calories_consumed": 0.0,
        "calories_burned": 0.0,
        "protein_goal_g": 150.0,
        "carbs_goal_g": 200.0,
        "fat_goal_g": 70.0,
        "protein_consumed_g": 0.0,
        "carbs_consumed_g": 0.0,
        "fat_consumed_g": 0.0,
        "protein_ratio": 30.0,
        "carbs_ratio": 45.0,
        "fat_ratio": 25.0
    })
}

/// A `food_diary_entry` row with the given nutrition values
pub fn entry_row(
    day_id: Uuid,
    user_id: Uuid,
    name: &str,
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "user_id": user_id,
        "day_id": day_id,
        "food_id": Uuid::new_v4(),
        "food_name": name,
        "meal_type": "breakfast",
        "serving_size": 100.0,
        "serving_unit": "g",
        "calories": calories,
        "protein": protein,
        "carbs": carbs,
        "fat": fat,
        "created_at": "2025-06-01T08:00:00Z"
    })
}

/// An `ai_recommendations` row as the store returns it after insert
pub fn recommendation_row(user_id: Uuid, analyzed_date: NaiveDate) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "user_id": user_id,
        "analyzed_date": analyzed_date,
        "prompt_version": 1,
        "prompt": "prompt",
        "response": "{\"summary\":\"ok\"}",
        "model_used": "gpt-4o-mini",
        "viewed": false,
        "created_at": "2025-06-02T00:00:05Z"
    })
}

/// A `user_push_tokens` row
pub fn push_token_row(user_id: Uuid, token: &str) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "user_id": user_id,
        "push_token": token,
        "device_id": "device-1",
        "device_name": "Test Phone"
    })
}
