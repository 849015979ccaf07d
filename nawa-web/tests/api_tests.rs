//! HTTP API integration tests
//!
//! Every test drives the full router (auth layers included) against a fresh
//! in-memory database with mail disabled.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use nawa_common::db;
use nawa_web::email::Mailer;
use nawa_web::{build_router, ApiSecrets, AppState};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::path::PathBuf;
use tower::ServiceExt;

const DEV_KEY: &str = "dev-secret";
const DELETE_KEY: &str = "delete-secret";

fn secrets() -> ApiSecrets {
    ApiSecrets {
        developer: Some(DEV_KEY.to_string()),
        delete: Some(DELETE_KEY.to_string()),
    }
}

async fn test_pool() -> SqlitePool {
    db::connect("sqlite::memory:").await.unwrap()
}

fn app_with(pool: SqlitePool, secrets: ApiSecrets, assets_dir: PathBuf) -> Router {
    build_router(AppState::new(pool, secrets, Mailer::disabled(), assets_dir))
}

async fn test_app() -> Router {
    app_with(test_pool().await, secrets(), PathBuf::from("/nonexistent"))
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder().method("DELETE").uri(uri).body(Body::empty()).unwrap()
}

fn delete_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn contact(name: &str, email: &str) -> Value {
    json!({
        "name": name,
        "organization": "Acme",
        "email": email,
        "interest": "Workshops",
        "message": "Hello there",
    })
}

async fn create(app: &Router, uri: &str, body: Value) -> i64 {
    let response = send(app, post_json(uri, body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

fn detail_fields(body: &Value) -> Vec<String> {
    body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap().to_string())
        .collect()
}

// ========================================
// Create
// ========================================

#[tokio::test]
async fn test_contact_create_then_list() {
    let app = test_app().await;

    let response = send(&app, post_json("/api/contact", contact("Ada", "ada@example.com"))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    let id = body["id"].as_i64().unwrap();

    let response = send(&app, get(&format!("/api/contact?apiKey={}", DEV_KEY))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let list = body_json(response).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], id);
    assert_eq!(list[0]["name"], "Ada");
    assert_eq!(list[0]["organization"], "Acme");
    assert_eq!(list[0]["phone"], Value::Null);
    assert!(list[0]["createdAt"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_list_is_oldest_first() {
    let app = test_app().await;
    let first = create(&app, "/api/contact", contact("First", "first@example.com")).await;
    let second = create(&app, "/api/contact", contact("Second", "second@example.com")).await;
    let third = create(&app, "/api/contact", contact("Third", "third@example.com")).await;

    let response = send(&app, get(&format!("/api/contact?apiKey={}", DEV_KEY))).await;
    let list = body_json(response).await;
    let ids: Vec<i64> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![first, second, third]);
}

#[tokio::test]
async fn test_contact_missing_fields_rejected() {
    let app = test_app().await;

    let response = send(&app, post_json("/api/contact", json!({ "name": "Ada" }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Validation failed");
    assert_eq!(detail_fields(&body), vec!["email", "interest", "message"]);

    // Nothing stored
    let response = send(&app, get(&format!("/api/contact?apiKey={}", DEV_KEY))).await;
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_blank_and_malformed_values_rejected() {
    let app = test_app().await;

    let mut body = contact("   ", "not-an-email");
    body["message"] = json!("");
    let response = send(&app, post_json("/api/contact", body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(detail_fields(&body), vec!["name", "email", "message"]);
    assert_eq!(body["details"][1]["message"], "must be a valid email address");
}

#[tokio::test]
async fn test_non_json_body_is_validation_error() {
    let app = test_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/newsletter")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(detail_fields(&body), vec!["body"]);

    let response = send(&app, post_json("/api/newsletter", json!({ "email": 42 }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(detail_fields(&body_json(response).await), vec!["body"]);
}

#[tokio::test]
async fn test_unknown_fields_ignored() {
    let app = test_app().await;
    let response = send(
        &app,
        post_json("/api/newsletter", json!({ "email": "x@example.com", "source": "footer" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_newsletter_duplicate_email() {
    let app = test_app().await;

    let response = send(&app, post_json("/api/newsletter", json!({ "email": "a@b.co" }))).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(&app, post_json("/api/newsletter", json!({ "email": "a@b.co" }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Validation failed");
    assert_eq!(body["details"][0]["field"], "email");
    assert_eq!(body["details"][0]["message"], "is already registered");

    let response = send(&app, get(&format!("/api/newsletter?apiKey={}", DEV_KEY))).await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_newsletter_duplicate_email_differs_only_in_case() {
    let app = test_app().await;

    let response = send(&app, post_json("/api/newsletter", json!({ "email": "a@b.com" }))).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(&app, post_json("/api/newsletter", json!({ "email": "A@B.com" }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["details"][0]["field"], "email");
    assert_eq!(body["details"][0]["message"], "is already registered");

    let response = send(&app, get(&format!("/api/newsletter?apiKey={}", DEV_KEY))).await;
    let list = body_json(response).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["email"], "a@b.com");
}

#[tokio::test]
async fn test_workshop_blank_friend_slots() {
    let app = test_app().await;

    let response = send(
        &app,
        post_json(
            "/api/workshop",
            json!({
                "name": "Ada",
                "email": "ada@example.com",
                "phone": "+49 30 1234",
                "payment": "online",
                "bundle": "89",
                "friend1": { "name": "", "email": "", "phone": "" },
                "friend2": { "name": "", "email": "", "phone": "" },
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(&app, get(&format!("/api/workshop?apiKey={}", DEV_KEY))).await;
    let list = body_json(response).await;
    assert_eq!(list[0]["friend1"], Value::Null);
    assert_eq!(list[0]["friend2"], Value::Null);
}

#[tokio::test]
async fn test_workshop_with_friends() {
    let app = test_app().await;

    let response = send(
        &app,
        post_json(
            "/api/workshop",
            json!({
                "name": "Ada",
                "email": "ada@example.com",
                "phone": "+49 30 1234",
                "payment": "venue",
                "bundle": "199",
                "friend1": { "name": "Grace", "email": "grace@example.com" },
                "friend2": { "name": "Linus", "phone": "555" },
            }),
        ),
    )
    .await;
    // Mail is disabled; the registration still succeeds
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(&app, get(&format!("/api/workshop?apiKey={}", DEV_KEY))).await;
    let list = body_json(response).await;
    let record = &list[0];
    assert_eq!(record["bundle"], "199");
    assert_eq!(record["friend1"]["name"], "Grace");
    assert_eq!(record["friend1"]["email"], "grace@example.com");
    assert_eq!(record["friend1"]["phone"], Value::Null);
    assert_eq!(record["friend2"]["name"], "Linus");
    assert_eq!(record["friend2"]["phone"], "555");
}

#[tokio::test]
async fn test_workshop_friend_validation() {
    let app = test_app().await;

    let response = send(
        &app,
        post_json(
            "/api/workshop",
            json!({
                "name": "Ada",
                "email": "ada@example.com",
                "phone": "+49 30 1234",
                "payment": "online",
                "bundle": "89",
                "friend1": { "email": "bad" },
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(detail_fields(&body), vec!["friend1.name", "friend1.email"]);
}

// ========================================
// Auth
// ========================================

#[tokio::test]
async fn test_list_requires_key() {
    let app = test_app().await;

    let response = send(&app, get("/api/contact")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["success"], false);

    let response = send(&app, get("/api/contact?apiKey=")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app, get("/api/contact?apiKey=wrong")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The delete secret does not grant read access
    let response = send(&app, get(&format!("/api/contact?apiKey={}", DELETE_KEY))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unconfigured_secret_is_server_error() {
    let app = app_with(test_pool().await, ApiSecrets::default(), PathBuf::from("/nonexistent"));

    // Missing credential is still reported first
    let response = send(&app, get("/api/workshop")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app, get("/api/workshop?apiKey=anything")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = send(&app, delete("/api/workshop/1?apiKey=anything")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // Public routes are unaffected
    let response = send(&app, post_json("/api/newsletter", json!({ "email": "a@b.co" }))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_delete_requires_delete_key() {
    let app = test_app().await;
    let id = create(&app, "/api/contact", contact("Ada", "ada@example.com")).await;

    let response = send(&app, delete(&format!("/api/contact/{}", id))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app, delete(&format!("/api/contact/{}?apiKey={}", id, DEV_KEY))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(&app, delete(&format!("/api/contact/{}?apiKey={}", id, DELETE_KEY))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_counts_bearer() {
    let app = test_app().await;
    create(&app, "/api/contact", contact("Ada", "ada@example.com")).await;
    create(&app, "/api/newsletter", json!({ "email": "a@b.co" })).await;
    create(&app, "/api/newsletter", json!({ "email": "c@d.co" })).await;

    let response = send(&app, get("/api/admin/counts")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/api/admin/counts")
        .header(header::AUTHORIZATION, "Bearer nope")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app, request).await.status(), StatusCode::FORBIDDEN);

    // Query key is not accepted on the bearer route
    let response = send(&app, get(&format!("/api/admin/counts?apiKey={}", DEV_KEY))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/api/admin/counts")
        .header(header::AUTHORIZATION, format!("Bearer {}", DEV_KEY))
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "contacts": 1, "newsletters": 2, "workshops": 0 })
    );
}

// ========================================
// Delete
// ========================================

#[tokio::test]
async fn test_delete_by_id_then_not_found() {
    let app = test_app().await;
    let id = create(&app, "/api/newsletter", json!({ "email": "a@b.co" })).await;
    let uri = format!("/api/newsletter/{}?apiKey={}", id, DELETE_KEY);

    let response = send(&app, delete(&uri)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);

    let response = send(&app, delete(&uri)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "newsletter subscription not found");
}

#[tokio::test]
async fn test_delete_non_numeric_id() {
    let app = test_app().await;
    let response = send(&app, delete(&format!("/api/contact/abc?apiKey={}", DELETE_KEY))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["success"], false);
}

#[tokio::test]
async fn test_delete_by_ids() {
    let app = test_app().await;
    let a = create(&app, "/api/contact", contact("A", "a@example.com")).await;
    let b = create(&app, "/api/contact", contact("B", "b@example.com")).await;
    let c = create(&app, "/api/contact", contact("C", "c@example.com")).await;
    let uri = format!("/api/contact?apiKey={}", DELETE_KEY);

    let response = send(&app, delete_json(&uri, json!({ "ids": [a, c, 9999] }))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "success": true, "deleted": 2 }));

    let response = send(&app, get(&format!("/api/contact?apiKey={}", DEV_KEY))).await;
    let list = body_json(response).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["id"], b);
}

#[tokio::test]
async fn test_delete_by_empty_ids() {
    let app = test_app().await;
    create(&app, "/api/workshop", json!({
        "name": "Ada",
        "email": "ada@example.com",
        "phone": "1",
        "payment": "venue",
        "bundle": "59",
    }))
    .await;

    let uri = format!("/api/workshop?apiKey={}", DELETE_KEY);
    let response = send(&app, delete_json(&uri, json!({ "ids": [] }))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["deleted"], 0);

    let response = send(&app, get(&format!("/api/workshop?apiKey={}", DEV_KEY))).await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_by_ids_malformed_body() {
    let app = test_app().await;
    let uri = format!("/api/contact?apiKey={}", DELETE_KEY);

    let response = send(&app, delete_json(&uri, json!({ "ids": ["one"] }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app, delete_json(&uri, json!({}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app, delete(&uri)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========================================
// Health
// ========================================

#[tokio::test]
async fn test_health_ok() {
    let app = test_app().await;

    let response = send(&app, get(&format!("/api/health?apiKey={}", DEV_KEY))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["smtp"], "not_configured");
    assert_eq!(body["module"], "nawa-web");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["uptimeSeconds"].is_u64());
}

#[tokio::test]
async fn test_health_database_down() {
    let pool = test_pool().await;
    let app = app_with(pool.clone(), secrets(), PathBuf::from("/nonexistent"));
    pool.close().await;

    let response = send(&app, get(&format!("/api/health?apiKey={}", DEV_KEY))).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "error");
}

#[tokio::test]
async fn test_health_requires_key() {
    let app = test_app().await;
    assert_eq!(send(&app, get("/api/health")).await.status(), StatusCode::UNAUTHORIZED);
}

// ========================================
// Developer utilities
// ========================================

#[tokio::test]
async fn test_preview_email_html() {
    let app = test_app().await;

    let response = send(
        &app,
        get(&format!(
            "/api/preview-email?apiKey={}&name=%3Cb%3EEve%3C%2Fb%3E&bundle=199&friends=2",
            DEV_KEY
        )),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));

    let html = body_text(response).await;
    assert!(html.contains("&lt;b&gt;Eve&lt;/b&gt;"));
    assert!(!html.contains("<b>Eve</b>"));
    assert!(html.contains("Group bundle for 3"));
    assert!(html.contains("Friend 1"));
    assert!(html.contains("Friend 2"));
}

#[tokio::test]
async fn test_preview_email_text() {
    let app = test_app().await;

    let response = send(
        &app,
        get(&format!("/api/preview-email?apiKey={}&format=text", DEV_KEY)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"));

    let text = body_text(response).await;
    assert!(text.contains("Alex Example"));
    assert!(text.contains("Standard ticket"));
    assert!(!text.contains("<html"));
}

#[tokio::test]
async fn test_background_image_missing() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(test_pool().await, secrets(), dir.path().to_path_buf());

    let response = send(
        &app,
        get(&format!("/api/assets/nawa-background?apiKey={}", DEV_KEY)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_background_image_served() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("nawa-background.png"), b"\x89PNG fake image").unwrap();
    let app = app_with(test_pool().await, secrets(), dir.path().to_path_buf());

    let response = send(&app, get("/api/assets/nawa-background")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(
        &app,
        get(&format!("/api/assets/nawa-background?apiKey={}", DEV_KEY)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"\x89PNG fake image");
}

#[tokio::test]
async fn test_unknown_route() {
    let app = test_app().await;
    assert_eq!(send(&app, get("/api/unknown")).await.status(), StatusCode::NOT_FOUND);
}
