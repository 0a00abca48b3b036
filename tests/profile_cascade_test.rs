// ABOUTME: Integration tests for profile updates, goal cascade, and step upserts
// ABOUTME: Mocks the hosted Postgres REST service with wiremock
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrack

mod common;

use common::{init_test_logging, profile_row, supabase_config};
use nutrack::steps::NewStepMeasurement;
use nutrack::store::Store;
use nutrack::users::ProfileUpdate;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_calorie_goal_update_cascades_to_all_diaries() {
    init_test_logging();
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/user_profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([profile_row(user_id)])))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/user_profiles"))
        .and(body_partial_json(json!({ "calorie_goal_value": 1800.0 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([profile_row(user_id)])))
        .expect(1)
        .mount(&server)
        .await;

    // Every diary row of the user is rewritten, past days included.
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/daily_diary"))
        .and(query_param("user_id", format!("eq.{user_id}")))
        .and(body_partial_json(json!({ "calorie_goal": 1800.0 })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let store = Store::for_service(&supabase_config(&server.uri())).unwrap();
    let update: ProfileUpdate =
        serde_json::from_value(json!({ "calorie_goal_value": 1800.0 })).unwrap();
    store.update_user_profile(user_id, &update).await.unwrap();
}

#[tokio::test]
async fn test_name_only_update_skips_diary_cascade() {
    init_test_logging();
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/user_profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([profile_row(user_id)])))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/user_profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([profile_row(user_id)])))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/daily_diary"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let store = Store::for_service(&supabase_config(&server.uri())).unwrap();
    let update: ProfileUpdate = serde_json::from_value(json!({ "first_name": "Jana" })).unwrap();
    store.update_user_profile(user_id, &update).await.unwrap();
}

#[tokio::test]
async fn test_over_allocated_ratios_rejected_before_any_write() {
    init_test_logging();
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/user_profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([profile_row(user_id)])))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/user_profiles"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = Store::for_service(&supabase_config(&server.uri())).unwrap();
    let update: ProfileUpdate = serde_json::from_value(json!({
        "protein_ratio": 50.0,
        "carbs_ratio": 40.0,
        "fat_ratio": 30.0
    }))
    .unwrap();
    let result = store.update_user_profile(user_id, &update).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_second_step_submission_same_day_updates_existing_row() {
    init_test_logging();
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();
    let row_id = Uuid::new_v4();

    let existing = json!({
        "id": row_id,
        "user_id": user_id,
        "start_time": "2025-06-01T00:00:00Z",
        "end_time": "2025-06-01T12:00:00Z",
        "step_count": 4200
    });

    Mock::given(method("GET"))
        .and(path("/rest/v1/step_measurements"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([existing])))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/step_measurements"))
        .and(query_param("id", format!("eq.{row_id}")))
        .and(body_partial_json(json!({ "step_count": 9000 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": row_id,
            "user_id": user_id,
            "start_time": "2025-06-01T00:00:00Z",
            "end_time": "2025-06-01T20:00:00Z",
            "step_count": 9000
        }])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/step_measurements"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let store = Store::for_service(&supabase_config(&server.uri())).unwrap();
    let measurement: NewStepMeasurement = serde_json::from_value(json!({
        "start_time": "2025-06-01T00:00:00Z",
        "end_time": "2025-06-01T20:00:00Z",
        "step_count": 9000
    }))
    .unwrap();
    let updated = store.upsert_steps(user_id, &measurement).await.unwrap();
    assert_eq!(updated.step_count, 9000);
}

#[tokio::test]
async fn test_step_upsert_window_excludes_next_midnight() {
    init_test_logging();
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    // The day window must be half-open: a row starting exactly at the next
    // midnight belongs to the following day and must not be rewritten.
    Mock::given(method("GET"))
        .and(path("/rest/v1/step_measurements"))
        .and(query_param("start_time", "gte.2025-06-01T00:00:00+00:00"))
        .and(query_param("start_time", "lt.2025-06-02T00:00:00+00:00"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/step_measurements"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/step_measurements"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": Uuid::new_v4(),
            "user_id": user_id,
            "start_time": "2025-06-01T08:00:00Z",
            "end_time": "2025-06-01T20:00:00Z",
            "step_count": 7500
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let store = Store::for_service(&supabase_config(&server.uri())).unwrap();
    let measurement: NewStepMeasurement = serde_json::from_value(json!({
        "start_time": "2025-06-01T08:00:00Z",
        "end_time": "2025-06-01T20:00:00Z",
        "step_count": 7500
    }))
    .unwrap();
    let inserted = store.upsert_steps(user_id, &measurement).await.unwrap();
    assert_eq!(inserted.step_count, 7500);
}
