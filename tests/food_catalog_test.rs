// ABOUTME: Integration tests for food creation rollback and locale search
// ABOUTME: Mocks the hosted Postgres REST service with wiremock
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrack

mod common;

use common::{init_test_logging, supabase_config};
use nutrack::foods::CreateFood;
use nutrack::store::Store;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn apple() -> CreateFood {
    serde_json::from_value(json!({
        "name": "Jablko",
        "category": "fruit",
        "brand": "Sadové",
        "serving_size_value": 100.0,
        "serving_size_unit": "g",
        "calories": 52.0,
        "protein": 0.3,
        "carbs": 14.0,
        "fats": 0.2,
        "sugar": 10.0,
        "fiber": 2.4,
        "salt": 0.0
    }))
    .unwrap()
}

#[tokio::test]
async fn test_unknown_category_rejected_before_any_write() {
    init_test_logging();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/food_categories"))
        .and(query_param("slug", "eq.fruit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/foods"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let store = Store::for_service(&supabase_config(&server.uri())).unwrap();
    let result = store.create_food(Uuid::new_v4(), "cs", &apple()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_failed_translation_insert_rolls_back_base_row() {
    init_test_logging();
    let server = MockServer::start().await;
    let food_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/food_categories"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": Uuid::new_v4() }])),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/foods"))
        .and(body_partial_json(json!({ "food_name": "Jablko", "is_custom": true })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{ "id": food_id }])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/food_translations"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    // Only the base row exists at this point, so only it is deleted.
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/foods"))
        .and(query_param("id", format!("eq.{food_id}")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/food_portions"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let store = Store::for_service(&supabase_config(&server.uri())).unwrap();
    let result = store.create_food(Uuid::new_v4(), "cs", &apple()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_failed_portion_translation_rolls_back_all_written_rows() {
    init_test_logging();
    let server = MockServer::start().await;
    let food_id = Uuid::new_v4();
    let portion_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/food_categories"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": Uuid::new_v4() }])),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/foods"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{ "id": food_id }])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/food_translations"))
        .and(body_partial_json(json!({ "locale": "cs", "name": "Jablko" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{ "id": Uuid::new_v4() }])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/food_portions"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{ "id": portion_id }])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/food_portion_translations"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    // Rollback walks the writes in reverse: portion, translation, base row.
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/food_portions"))
        .and(query_param("id", format!("eq.{portion_id}")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/food_translations"))
        .and(query_param("food_id", format!("eq.{food_id}")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/foods"))
        .and(query_param("id", format!("eq.{food_id}")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let store = Store::for_service(&supabase_config(&server.uri())).unwrap();
    let result = store.create_food(Uuid::new_v4(), "cs", &apple()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_search_paginates_with_exact_count() {
    init_test_logging();
    let server = MockServer::start().await;

    let row = json!({
        "id": Uuid::new_v4(),
        "energy_kcal": 52.0,
        "protein_g": 0.3,
        "carbs_g": 14.0,
        "fat_g": 0.2,
        "sugar_g": 10.0,
        "fiber_g": 2.4,
        "food_translations": [{ "name": "Jablko", "brand": "Sadové" }],
        "food_category": { "slug": "fruit" },
        "food_portions": [{
            "id": Uuid::new_v4(),
            "portion_weight_g": 100.0,
            "food_portion_translations": [{ "name": "100 g" }]
        }]
    });

    Mock::given(method("GET"))
        .and(path("/rest/v1/foods"))
        .and(header("Prefer", "count=exact"))
        .and(query_param("food_translations.locale", "eq.cs"))
        .and(query_param("food_translations.name", "ilike.%jablko%"))
        .and(query_param("limit", "10"))
        .and(query_param("offset", "0"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Range", "0-0/12")
                .set_body_json(json!([row])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = Store::for_service(&supabase_config(&server.uri())).unwrap();
    let page = store.search_foods("cs", "jablko", 1, 10).await.unwrap();

    assert_eq!(page.total_count, 12);
    assert_eq!(page.page, 1);
    assert!(page.has_more);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "Jablko");
    assert_eq!(page.items[0].brand.as_deref(), Some("Sadové"));
    assert_eq!(page.items[0].category.as_deref(), Some("fruit"));
    assert_eq!(page.items[0].serving_size_value, Some(100.0));
}
