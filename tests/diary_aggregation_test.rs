// ABOUTME: Integration tests for daily diary creation and total recompute
// ABOUTME: Mocks the hosted Postgres REST service with wiremock
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrack

mod common;

use chrono::NaiveDate;
use common::{diary_row, entry_row, init_test_logging, profile_row, supabase_config};
use nutrack::store::Store;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_recompute_writes_entry_sums_and_current_ratios() {
    init_test_logging();
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();
    let diary_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/food_diary_entry"))
        .and(query_param("day_id", format!("eq.{diary_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            entry_row(diary_id, user_id, "Oatmeal", 389.0, 16.9, 66.3, 6.9),
            entry_row(diary_id, user_id, "Chicken", 165.0, 31.0, 0.0, 3.6),
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/user_profiles"))
        .and(query_param("user_id", format!("eq.{user_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([profile_row(user_id)])))
        .mount(&server)
        .await;

    // The rewrite must carry the entry sums and the profile's current ratios.
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/daily_diary"))
        .and(query_param("id", format!("eq.{diary_id}")))
        .and(body_partial_json(json!({
            "calories_consumed": 554.0,
            "protein_consumed_g": 47.9,
            "carbs_consumed_g": 66.3,
            "fat_consumed_g": 10.5,
            "protein_ratio": 30.0,
            "carbs_ratio": 45.0,
            "fat_ratio": 25.0
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let store = Store::for_service(&supabase_config(&server.uri())).unwrap();
    store.recompute_totals(diary_id, user_id).await.unwrap();
}

#[tokio::test]
async fn test_recompute_with_no_entries_resets_totals_to_zero() {
    init_test_logging();
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();
    let diary_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/food_diary_entry"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/user_profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([profile_row(user_id)])))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/daily_diary"))
        .and(body_partial_json(json!({
            "calories_consumed": 0.0,
            "protein_consumed_g": 0.0,
            "carbs_consumed_g": 0.0,
            "fat_consumed_g": 0.0
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let store = Store::for_service(&supabase_config(&server.uri())).unwrap();
    store.recompute_totals(diary_id, user_id).await.unwrap();
}

#[tokio::test]
async fn test_get_or_create_returns_existing_diary_without_insert() {
    init_test_logging();
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();
    let diary_id = Uuid::new_v4();
    let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/daily_diary"))
        .and(query_param("user_id", format!("eq.{user_id}")))
        .and(query_param("day_date", format!("eq.{date}")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([diary_row(diary_id, user_id, date)])),
        )
        .mount(&server)
        .await;

    // No POST mock is mounted: an insert attempt would fail the test.
    let store = Store::for_service(&supabase_config(&server.uri())).unwrap();
    let first = store.get_or_create_daily_diary(user_id, date).await.unwrap();
    let second = store.get_or_create_daily_diary(user_id, date).await.unwrap();
    assert_eq!(first.id, diary_id);
    assert_eq!(first.id, second.id);
}

#[tokio::test]
async fn test_get_or_create_seeds_new_diary_from_profile_goals() {
    init_test_logging();
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();
    let diary_id = Uuid::new_v4();
    let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/daily_diary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/user_profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([profile_row(user_id)])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/daily_diary"))
        .and(body_partial_json(json!({
            "user_id": user_id,
            "day_date": date,
            "calorie_goal": 2000.0,
            "protein_goal_g": 150.0,
            "calories_consumed": 0.0
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!([diary_row(diary_id, user_id, date)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = Store::for_service(&supabase_config(&server.uri())).unwrap();
    let diary = store.get_or_create_daily_diary(user_id, date).await.unwrap();
    assert_eq!(diary.id, diary_id);
    assert!((diary.calorie_goal - 2000.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_activity_save_deletes_entries_missing_from_request() {
    init_test_logging();
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();
    let diary_id = Uuid::new_v4();
    let kept = Uuid::new_v4();
    let stale = Uuid::new_v4();

    let session = json!({
        "id": diary_id,
        "user_id": user_id,
        "start_at": "2025-06-01T18:00:00Z",
        "end_at": "2025-06-01T19:00:00Z"
    });
    let entry = |id: Uuid| {
        json!({
            "id": id,
            "diary_id": diary_id,
            "exercise_id": Uuid::new_v4(),
            "sets_json": [{"reps": 5, "weight_kg": 100.0}],
            "created_at": "2025-06-01T18:05:00Z"
        })
    };

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/activity_diary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([session])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/activity_diary_entry"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([entry(kept), entry(stale)])),
        )
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/activity_diary_entry"))
        .and(query_param("id", format!("eq.{stale}")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/activity_diary_entry"))
        .and(query_param("id", format!("eq.{kept}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([entry(kept)])))
        .expect(1)
        .mount(&server)
        .await;

    let request: nutrack::diary::SaveActivityDiary = serde_json::from_value(json!({
        "id": diary_id,
        "start_at": "2025-06-01T18:00:00Z",
        "end_at": "2025-06-01T19:00:00Z",
        "entries": [{
            "id": kept,
            "exercise_id": Uuid::new_v4(),
            "sets_json": [{"reps": 5, "weight_kg": 100.0}]
        }]
    }))
    .unwrap();

    let store = Store::for_service(&supabase_config(&server.uri())).unwrap();
    let saved = store.save_activity_diary(user_id, &request).await.unwrap();
    assert_eq!(saved.diary.id, diary_id);
}

#[tokio::test]
async fn test_activity_date_window_excludes_next_midnight() {
    init_test_logging();
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();
    let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

    // A session starting exactly at the next midnight belongs to June 2; the
    // June 1 query must use a strict upper bound.
    Mock::given(method("GET"))
        .and(path("/rest/v1/activity_diary"))
        .and(query_param("start_at", "gte.2025-06-01T00:00:00+00:00"))
        .and(query_param("start_at", "lt.2025-06-02T00:00:00+00:00"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let store = Store::for_service(&supabase_config(&server.uri())).unwrap();
    let sessions = store.activity_diaries_by_date(user_id, date).await.unwrap();
    assert!(sessions.is_empty());
}
