//! End-to-end walk through a resident's first months in the community.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::util::ServiceExt;

use hoa_backend::config::AppConfig;
use hoa_backend::storage::DbConnection;
use hoa_backend::{create_router, AppState};

const ADMIN_KEY: &str = "board-key";

async fn app() -> Router {
    let db = DbConnection::init_test().await.expect("Failed to create test database");
    let mut config = AppConfig::default();
    config.admin.access_key = ADMIN_KEY.to_string();
    config.dues.default_monthly_cents = 150_000;
    create_router(AppState::new(db, config))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>, admin: bool) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if admin {
        builder = builder.header("x-admin-key", ADMIN_KEY);
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
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let app = app().await;
    let (status, body) = call(&app, Method::GET, "/api/health", None, false).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_resident_lifecycle() {
    let app = app().await;

    // Board sets up a lot and the clubhouse
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/lots",
        Some(json!({
            "block": "3",
            "lot_number": "12",
            "area_sqm": 240.0,
            "map_x": 0.0,
            "map_y": 0.0,
            "map_width": 16.0,
            "map_height": 15.0
        })),
        true,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let lot_id = body["lot"]["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/amenities",
        Some(json!({
            "name": "Clubhouse",
            "kind": "Clubhouse",
            "open_time": "08:00",
            "close_time": "22:00",
            "hourly_rate_cents": 50_000,
            "max_hours_per_booking": 6
        })),
        true,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let clubhouse_id = body["amenity"]["id"].as_str().unwrap().to_string();

    // Household head signs up and is approved
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/residents",
        Some(json!({
            "first_name": "Maria",
            "last_name": "Santos",
            "email": "maria@example.com",
            "phone": "+63 917 555 0101",
            "lot_id": lot_id,
            "is_household_head": true,
            "move_in_date": "2025-01-15"
        })),
        false,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let resident_id = body["resident"]["id"].as_str().unwrap().to_string();

    let (status, _) = call(&app, Method::POST, &format!("/api/residents/{}/approve", resident_id), None, true).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = call(&app, Method::GET, &format!("/api/lots/{}", lot_id), None, false).await;
    assert_eq!(body["status"], "Occupied");

    // January and part of February paid
    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/api/dues/{}/payments", resident_id),
        Some(json!({ "year": 2025, "month": 1, "amount_cents": 150_000, "reference": "OR-0001" })),
        true,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/api/dues/{}/payments", resident_id),
        Some(json!({ "year": 2025, "month": 2, "amount_cents": 50_000, "reference": "OR-0002" })),
        true,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(
        &app,
        Method::GET,
        &format!("/api/dues/{}/statement?year=2025&month=3", resident_id),
        None,
        false,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"][0]["status"], "Paid");
    assert_eq!(body["rows"][1]["status"], "Partial");
    assert_eq!(body["rows"][2]["carried_in_cents"], 100_000);
    assert_eq!(body["balance_cents"], 250_000);

    let (_, body) = call(
        &app,
        Method::GET,
        "/api/admin/reports/delinquency?year=2025&month=3",
        None,
        true,
    )
    .await;
    assert_eq!(body["rows"][0]["lot_label"], "Block 3 Lot 12");
    assert_eq!(body["rows"][0]["months_unpaid"], 2);
    assert_eq!(body["total_outstanding_cents"], 250_000);

    // Car registration and sticker
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/vehicles",
        Some(json!({
            "resident_id": resident_id,
            "plate_number": "NAB 4521",
            "make": "Honda",
            "model": "City",
            "color": "White"
        })),
        false,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let vehicle_id = body["vehicle"]["id"].as_str().unwrap().to_string();
    let (status, body) = call(&app, Method::POST, &format!("/api/vehicles/{}/approve", vehicle_id), None, true).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["vehicle"]["sticker_number"].as_str().unwrap().starts_with("HOA-"));

    // Clubhouse booking
    let date = (Utc::now().date_naive() + Duration::days(5)).format("%Y-%m-%d").to_string();
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/reservations",
        Some(json!({
            "amenity_id": clubhouse_id,
            "resident_id": resident_id,
            "date": date,
            "start_time": "14:00",
            "end_time": "18:00",
            "purpose": "Birthday party"
        })),
        false,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["reservation"]["fee_cents"], 200_000);
    let reservation_id = body["reservation"]["id"].as_str().unwrap().to_string();

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/api/reservations/{}/confirm", reservation_id),
        None,
        false,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, Method::GET, "/api/admin/dashboard", None, true).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["residents"]["approved"], 1);
    assert_eq!(body["lots"]["occupied"], 1);
    assert_eq!(body["active_vehicles"], 1);
    assert_eq!(body["upcoming_reservations"], 1);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = app().await;
    let (status, _) = call(&app, Method::GET, "/api/nope", None, false).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
