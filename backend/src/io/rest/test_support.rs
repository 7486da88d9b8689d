//! Router fixtures for the handler tests.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot`

use crate::config::AppConfig;
use crate::storage::DbConnection;
use crate::{create_router, AppState};

pub const TEST_ADMIN_KEY: &str = "test-admin-key";

pub async fn setup_test_app() -> Router {
    let db = DbConnection::init_test().await.expect("Failed to create test database");
    let mut config = AppConfig::default();
    config.admin.access_key = TEST_ADMIN_KEY.to_string();
    config.dues.default_monthly_cents = 1000;
    create_router(AppState::new(db, config))
}

/// Send a request through the full router and decode the JSON body
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>, admin: bool) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if admin {
        builder = builder.header("x-admin-key", TEST_ADMIN_KEY);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

/// Sign up and approve a household head, returning the resident id
pub async fn approved_resident(app: &Router, email: &str, lot_id: Option<&str>) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/residents",
        Some(serde_json::json!({
            "first_name": "Ana",
            "last_name": "Reyes",
            "email": email,
            "phone": "555-123-4567",
            "lot_id": lot_id,
            "is_household_head": true,
            "move_in_date": "2025-01-01"
        })),
        false,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let id = body["resident"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(app, Method::POST, &format!("/api/residents/{}/approve", id), None, true).await;
    assert_eq!(status, StatusCode::OK);
    id
}
