//! Users API Contract Tests
//!
//! Drives the full router (middleware included) against an in-memory
//! database:
//! - Status codes and bodies for every route
//! - Allow-listing of write payloads
//! - Cascade from users to profiles
//! - Id counter reset on delete-all
//! - Filter join semantics

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use userbase::clock::FixedClock;
use userbase::http_server::{HttpServer, HttpServerConfig};
use userbase::store::{Database, NewProfile, ProfileStore, UserStore};

// =============================================================================
// Helper Functions
// =============================================================================

struct TestApp {
    router: Router,
    profiles: ProfileStore,
    clock: Arc<FixedClock>,
}

fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 11, 7, 12, 0, 0).unwrap()
}

async fn setup_app() -> TestApp {
    let db = Database::in_memory().await.unwrap();
    let clock = Arc::new(FixedClock::new(start_time()));

    let users = UserStore::new(db.clone(), clock.clone());
    let profiles = ProfileStore::new(db, clock.clone());
    let router = HttpServer::new(HttpServerConfig::default(), users).router();

    TestApp {
        router,
        profiles,
        clock,
    }
}

async fn send(app: &TestApp, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    send_request(app, request).await
}

async fn send_request(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn create_user(app: &TestApp, name: &str, email: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/users",
        Some(json!({ "name": name, "email": email })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

async fn list_users(app: &TestApp) -> Vec<Value> {
    let (status, body) = send(app, Method::GET, "/users", None).await;
    assert_eq!(status, StatusCode::OK);
    body.as_array().unwrap().clone()
}

fn id_of(user: &Value) -> i64 {
    user["id"].as_i64().unwrap()
}

// =============================================================================
// Create / List
// =============================================================================

/// Created row appears once in the list with equal timestamps.
#[tokio::test]
async fn test_create_then_list() {
    let app = setup_app().await;

    let created = create_user(&app, "Alice", "alice@example.com").await;
    assert_eq!(id_of(&created), 1);
    assert_eq!(created["name"], "Alice");
    assert_eq!(created["email"], "alice@example.com");
    assert_eq!(created["created_at"], created["updated_at"]);

    let users = list_users(&app).await;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0], created);
}

#[tokio::test]
async fn test_list_empty() {
    let app = setup_app().await;
    assert!(list_users(&app).await.is_empty());
}

/// Duplicate email is rejected and leaves one row.
#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let app = setup_app().await;
    create_user(&app, "Alice", "shared@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/users",
        Some(json!({ "name": "Bob", "email": "shared@example.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 409);
    assert_eq!(list_users(&app).await.len(), 1);
}

/// Names and emails over 100 characters are rejected by the schema.
#[tokio::test]
async fn test_overlong_fields_are_unprocessable() {
    let app = setup_app().await;
    let long = "x".repeat(101);

    let (status, body) = send(
        &app,
        Method::POST,
        "/users",
        Some(json!({ "name": long, "email": "a@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], 422);

    let (status, _) = send(
        &app,
        Method::POST,
        "/users",
        Some(json!({ "name": "Alice", "email": "x".repeat(101) })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(
        &app,
        Method::POST,
        "/users",
        Some(json!({ "name": "x".repeat(100), "email": "a@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_missing_field_is_bad_request() {
    let app = setup_app().await;

    let (status, body) = send(&app, Method::POST, "/users", Some(json!({ "name": "Alice" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
    assert!(list_users(&app).await.is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = setup_app().await;

    let request = Request::post("/users")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send_request(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Keys outside name/email never reach the row.
#[tokio::test]
async fn test_create_ignores_unknown_fields() {
    let app = setup_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/users",
        Some(json!({
            "name": "Mallory",
            "email": "mallory@example.com",
            "is_admin": true,
            "id": 999,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(id_of(&body), 1);
    assert!(body.get("is_admin").is_none());
}

// =============================================================================
// Update
// =============================================================================

#[tokio::test]
async fn test_update_changes_given_fields_only() {
    let app = setup_app().await;
    let created = create_user(&app, "Alice", "alice@example.com").await;

    app.clock.advance(Duration::seconds(30));
    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/users/{}", id_of(&created)),
        Some(json!({ "name": "Alicia", "is_admin": true })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Alicia");
    assert_eq!(updated["email"], "alice@example.com");
    assert_eq!(updated["created_at"], created["created_at"]);
    assert_ne!(updated["updated_at"], created["updated_at"]);
    assert!(updated.get("is_admin").is_none());

    let users = list_users(&app).await;
    assert_eq!(users, vec![updated]);
}

/// An update that changes nothing keeps `updated_at`.
#[tokio::test]
async fn test_noop_update_keeps_timestamp() {
    let app = setup_app().await;
    let created = create_user(&app, "Alice", "alice@example.com").await;

    app.clock.advance(Duration::seconds(30));
    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/users/{}", id_of(&created)),
        Some(json!({ "is_admin": true })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated, created);
}

#[tokio::test]
async fn test_update_missing_user_is_not_found() {
    let app = setup_app().await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/users/42",
        Some(json!({ "name": "Nobody" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
    assert_eq!(body["code"], 404);
}

#[tokio::test]
async fn test_update_to_taken_email_conflicts() {
    let app = setup_app().await;
    create_user(&app, "Alice", "alice@example.com").await;
    let bob = create_user(&app, "Bob", "bob@example.com").await;

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/users/{}", id_of(&bob)),
        Some(json!({ "email": "alice@example.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

// =============================================================================
// Delete
// =============================================================================

/// Deleting a user removes its profiles too.
#[tokio::test]
async fn test_delete_cascades_to_profiles() {
    let app = setup_app().await;
    let alice = create_user(&app, "Alice", "alice@example.com").await;
    let bob = create_user(&app, "Bob", "bob@example.com").await;
    app.profiles
        .create(NewProfile {
            user_id: id_of(&alice),
            bio: Some("Rustacean".to_string()),
        })
        .await
        .unwrap();

    let (status, body) = send(&app, Method::DELETE, &format!("/users/{}", id_of(&alice)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "User deleted successfully" }));
    assert!(app.profiles.all().await.unwrap().is_empty());

    let (status, _) = send(&app, Method::DELETE, &format!("/users/{}", id_of(&bob)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(list_users(&app).await.is_empty());
}

#[tokio::test]
async fn test_delete_missing_user_is_not_found() {
    let app = setup_app().await;

    let (status, body) = send(&app, Method::DELETE, "/users/7", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn test_non_numeric_id_is_not_found() {
    let app = setup_app().await;

    let (status, _) = send(&app, Method::DELETE, "/users/abc", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/users/abc",
        Some(json!({ "name": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// "filter" in the id position is just another unknown id.
#[tokio::test]
async fn test_filter_segment_as_id_is_not_found() {
    let app = setup_app().await;
    create_user(&app, "Alice", "alice@example.com").await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/users/filter",
        Some(json!({ "name": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");

    let (status, body) = send(&app, Method::DELETE, "/users/filter", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);

    assert_eq!(list_users(&app).await.len(), 1);
}

/// Delete-all empties both tables and restarts ids at 1.
#[tokio::test]
async fn test_delete_all_resets_ids() {
    let app = setup_app().await;
    let alice = create_user(&app, "Alice", "alice@example.com").await;
    create_user(&app, "Bob", "bob@example.com").await;
    app.profiles
        .create(NewProfile {
            user_id: id_of(&alice),
            bio: None,
        })
        .await
        .unwrap();

    let (status, body) = send(&app, Method::DELETE, "/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "All users cleared successfully" }));
    assert!(list_users(&app).await.is_empty());
    assert!(app.profiles.all().await.unwrap().is_empty());

    let next = create_user(&app, "Carol", "carol@example.com").await;
    assert_eq!(id_of(&next), 1);
}

#[tokio::test]
async fn test_delete_all_on_empty_table() {
    let app = setup_app().await;

    let (status, _) = send(&app, Method::DELETE, "/users", None).await;

    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Filter
// =============================================================================

/// Only users with a profile match, each carrying its bio.
#[tokio::test]
async fn test_filter_requires_profile() {
    let app = setup_app().await;
    let with_profile = create_user(&app, "Alice", "alice1@example.com").await;
    create_user(&app, "Alice", "alice2@example.com").await;
    create_user(&app, "Bob", "bob@example.com").await;
    app.profiles
        .create(NewProfile {
            user_id: id_of(&with_profile),
            bio: Some("Likes ferris".to_string()),
        })
        .await
        .unwrap();

    let (status, body) = send(&app, Method::GET, "/users/filter?name=Alice", None).await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], with_profile["id"]);
    assert_eq!(rows[0]["email"], "alice1@example.com");
    assert_eq!(rows[0]["bio"], "Likes ferris");
}

/// A user with two profiles appears once per profile.
#[tokio::test]
async fn test_filter_returns_row_per_profile() {
    let app = setup_app().await;
    let alice = create_user(&app, "Alice", "alice@example.com").await;
    for bio in ["first", "second"] {
        app.profiles
            .create(NewProfile {
                user_id: id_of(&alice),
                bio: Some(bio.to_string()),
            })
            .await
            .unwrap();
    }

    let (_, body) = send(&app, Method::GET, "/users/filter?name=Alice", None).await;

    let bios: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["bio"].as_str().unwrap())
        .collect();
    assert_eq!(bios, vec!["first", "second"]);
}

#[tokio::test]
async fn test_filter_without_name_is_empty() {
    let app = setup_app().await;
    let alice = create_user(&app, "Alice", "alice@example.com").await;
    app.profiles
        .create(NewProfile {
            user_id: id_of(&alice),
            bio: None,
        })
        .await
        .unwrap();

    let (status, body) = send(&app, Method::GET, "/users/filter", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = send(&app, Method::GET, "/users/filter?name=", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_filter_is_exact_match() {
    let app = setup_app().await;
    let alice = create_user(&app, "Alice", "alice@example.com").await;
    app.profiles
        .create(NewProfile {
            user_id: id_of(&alice),
            bio: None,
        })
        .await
        .unwrap();

    let (_, body) = send(&app, Method::GET, "/users/filter?name=Ali", None).await;
    assert_eq!(body, json!([]));

    let (_, body) = send(&app, Method::GET, "/users/filter?name=Alice", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["bio"], Value::Null);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_reports_database() {
    let app = setup_app().await;

    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
}
