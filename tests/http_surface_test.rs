// ABOUTME: Integration tests for the HTTP surface: auth guard, error bodies, headers
// ABOUTME: Drives the assembled router directly with tower oneshot
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrack

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{init_test_logging, profile_row, sign_token, test_config};
use http_body_util::BodyExt;
use nutrack::server::{router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn app_for(store_url: &str) -> axum::Router {
    init_test_logging();
    router(AppState::new(test_config(store_url)).unwrap())
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_missing_bearer_token_is_401_with_error_body() {
    let server = MockServer::start().await;
    let app = app_for(&server.uri()).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/users/profile")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["statusCode"], 401);
    assert_eq!(body["path"], "/users/profile");
    assert!(body["timestamp"].is_string());
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_garbage_bearer_token_rejected() {
    let server = MockServer::start().await;
    let app = app_for(&server.uri()).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/users/profile")
                .header("authorization", "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_valid_token_reads_profile() {
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/user_profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([profile_row(user_id)])))
        .mount(&server)
        .await;

    let app = app_for(&server.uri()).await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/users/profile")
                .header("authorization", format!("Bearer {}", sign_token(user_id)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user_id"], json!(user_id));
    assert_eq!(body["goal"], "lose_fat");
}

#[tokio::test]
async fn test_food_search_requires_language_header() {
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();
    let app = app_for(&server.uri()).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/foods/search?query=jablko")
                .header("authorization", format!("Bearer {}", sign_token(user_id)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["statusCode"], 400);
    assert_eq!(body["message"], "Language header is required");
}

#[tokio::test]
async fn test_missing_profile_maps_to_404() {
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/user_profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let app = app_for(&server.uri()).await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/users/profile")
                .header("authorization", format!("Bearer {}", sign_token(user_id)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_endpoints_are_unguarded() {
    let server = MockServer::start().await;
    let app = app_for(&server.uri()).await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_readiness_reports_wired_configuration() {
    let server = MockServer::start().await;
    let app = app_for(&server.uri()).await;

    let response = app
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["scheduler_enabled"], false);
    assert_eq!(body["strategy"], "profiles");
}

#[tokio::test]
async fn test_weight_submission_converts_pounds() {
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/rest/v1/user_weights"))
        .and(wiremock::matchers::body_partial_json(json!({
            "user_id": user_id
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": Uuid::new_v4(),
            "user_id": user_id,
            "weight_kg": 68.0388555,
            "measured_at": "2025-06-01T08:00:00Z"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_for(&server.uri()).await;
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/users/weights")
                .header("authorization", format!("Bearer {}", sign_token(user_id)))
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({"weight_value": 150.0, "weight_unit": "lbs"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!((body["weight_kg"].as_f64().unwrap() - 68.04).abs() < 0.01);
}
