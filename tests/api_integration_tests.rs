//! Integration Tests for API Endpoints
//!
//! Drives full request/response cycles through the router, including the
//! lock / after-update protocol a transactional caller runs.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use region_cache::{api::create_router, AppState, Config};
use serde_json::{json, Value};
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    let config = Config {
        regions: vec![
            ("users".to_string(), "read-write".to_string()),
            ("countries".to_string(), "read-only".to_string()),
            ("sessions".to_string(), "nonstrict-read-write".to_string()),
        ],
        ..Config::default()
    };
    create_router(AppState::from_config(&config).unwrap())
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

// == Read-Write Protocol ==

#[tokio::test]
async fn test_read_write_update_cycle() {
    let app = create_test_app();

    let (status, json) = post(
        &app,
        "/regions/users/put_from_load",
        json!({"key": "user#1", "value": {"name": "alice"}, "version": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["written"], true);

    let (_, json) = post(&app, "/regions/users/get", json!({"key": "user#1"})).await;
    assert_eq!(json["value"]["name"], "alice");

    // Lock fences the key
    let (status, json) = post(
        &app,
        "/regions/users/lock",
        json!({"key": "user#1", "version": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let lock = json["lock"].clone();
    assert_eq!(lock["holders"], 1);

    let (_, json) = post(&app, "/regions/users/get", json!({"key": "user#1"})).await;
    assert!(json["value"].is_null());

    let (_, json) = post(
        &app,
        "/regions/users/put_from_load",
        json!({"key": "user#1", "value": {"name": "stale"}, "version": 1}),
    )
    .await;
    assert_eq!(json["written"], false);

    let (status, json) = post(
        &app,
        "/regions/users/update",
        json!({"key": "user#1", "value": {"name": "bob"}, "version": 2, "previous_version": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["written"], true);

    // Committed release writes the new value
    let (_, json) = post(
        &app,
        "/regions/users/after_update",
        json!({"key": "user#1", "value": {"name": "bob"}, "version": 2, "lock": lock}),
    )
    .await;
    assert_eq!(json["written"], true);

    let (_, json) = post(&app, "/regions/users/get", json!({"key": "user#1"})).await;
    assert_eq!(json["value"]["name"], "bob");
}

#[tokio::test]
async fn test_rolled_back_lock_leaves_key_empty() {
    let app = create_test_app();

    post(
        &app,
        "/regions/users/put_from_load",
        json!({"key": "user#2", "value": 1, "version": 1}),
    )
    .await;
    let (_, json) = post(&app, "/regions/users/lock", json!({"key": "user#2"})).await;
    let lock = json["lock"].clone();

    let (status, _) = post(
        &app,
        "/regions/users/unlock",
        json!({"key": "user#2", "lock": lock}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = post(&app, "/regions/users/get", json!({"key": "user#2"})).await;
    assert!(json["value"].is_null());
}

#[tokio::test]
async fn test_tenants_do_not_collide() {
    let app = create_test_app();

    post(
        &app,
        "/regions/users/put_from_load",
        json!({"key": "user#1", "tenant": "acme", "value": "acme user"}),
    )
    .await;

    let (_, json) = post(
        &app,
        "/regions/users/get",
        json!({"key": "user#1", "tenant": "acme"}),
    )
    .await;
    assert_eq!(json["value"], "acme user");

    let (_, json) = post(&app, "/regions/users/get", json!({"key": "user#1"})).await;
    assert!(json["value"].is_null());
}

// == Read-Only and Non-Strict Regions ==

#[tokio::test]
async fn test_read_only_update_conflict() {
    let app = create_test_app();

    let (status, json) = post(
        &app,
        "/regions/countries/insert",
        json!({"key": "fr", "value": "France", "version": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["written"], true);

    let (status, json) = post(
        &app,
        "/regions/countries/update",
        json!({"key": "fr", "value": "République française", "version": 2}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("Unsupported operation"));

    let (_, json) = post(&app, "/regions/countries/get", json!({"key": "fr"})).await;
    assert_eq!(json["value"], "France");
}

#[tokio::test]
async fn test_nonstrict_update_invalidates() {
    let app = create_test_app();

    post(
        &app,
        "/regions/sessions/put_from_load",
        json!({"key": "s1", "value": "v1", "version": 1}),
    )
    .await;

    let (status, json) = post(
        &app,
        "/regions/sessions/update",
        json!({"key": "s1", "value": "v2", "version": 2}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["written"], false);

    let (_, json) = post(&app, "/regions/sessions/get", json!({"key": "s1"})).await;
    assert!(json["value"].is_null());

    let (_, json) = post(&app, "/regions/sessions/lock", json!({"key": "s1"})).await;
    assert!(json["lock"].is_null());
}

// == Removal ==

#[tokio::test]
async fn test_remove_and_remove_all() {
    let app = create_test_app();

    for key in ["a", "b", "c"] {
        post(
            &app,
            "/regions/users/put_from_load",
            json!({"key": key, "value": key}),
        )
        .await;
    }

    let (status, json) = post(&app, "/regions/users/remove", json!({"key": "a"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], 1);

    let (_, json) = post(&app, "/regions/users/evict", json!({"key": "a"})).await;
    assert_eq!(json["removed"], 0);

    let (_, json) = post(&app, "/regions/users/remove_all", json!({})).await;
    assert_eq!(json["region"], "users");
    assert_eq!(json["removed"], 2);
}

// == Errors ==

#[tokio::test]
async fn test_unknown_region_not_found() {
    let app = create_test_app();

    let (status, json) = post(&app, "/regions/orders/get", json!({"key": "o1"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("orders"));

    let (status, _) = get(&app, "/regions/orders/timestamp").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_key_bad_request() {
    let app = create_test_app();

    let (status, json) = post(&app, "/regions/users/get", json!({"key": ""})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("empty"));
}

// == Introspection ==

#[tokio::test]
async fn test_stats_endpoint() {
    let app = create_test_app();

    post(
        &app,
        "/regions/users/put_from_load",
        json!({"key": "user#1", "value": 1}),
    )
    .await;
    post(&app, "/regions/users/get", json!({"key": "user#1"})).await;
    post(&app, "/regions/users/get", json!({"key": "user#9"})).await;

    let (status, json) = get(&app, "/stats").await;
    assert_eq!(status, StatusCode::OK);

    let regions = json["regions"].as_array().unwrap();
    assert_eq!(regions.len(), 3);
    let users = regions.iter().find(|r| r["region"] == "users").unwrap();
    assert_eq!(users["access_type"], "read-write");
    assert_eq!(users["hits"], 1);
    assert_eq!(users["misses"], 1);
    assert_eq!(users["total_entries"], 1);
}

#[tokio::test]
async fn test_health_and_timestamp() {
    let app = create_test_app();

    let (status, json) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");

    let (status, json) = get(&app, "/regions/users/timestamp").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["timestamp"].as_u64().unwrap() > 0);
}
