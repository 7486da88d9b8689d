//! # REST API for Vehicles
//!
//! Residents register their vehicles; admins approve them, which issues a
//! gate sticker, and look plates up at the gate.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use super::mappers::VehicleMapper;
use super::ApiResult;
use crate::AppState;
use shared::{RegisterVehicleRequest, Vehicle, VehicleListResponse, VehicleResponse};

pub fn router() -> Router<AppState> {
    Router::new().route("/vehicles", post(register_vehicle))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/vehicles", get(list_vehicles))
        .route("/vehicles/plate/:plate", get(lookup_plate))
        .route("/vehicles/:vehicle_id", get(get_vehicle))
        .route("/vehicles/:vehicle_id/approve", post(approve_vehicle))
        .route("/vehicles/:vehicle_id/revoke", post(revoke_vehicle))
}

#[derive(Debug, Deserialize)]
pub struct VehicleListQuery {
    pub resident_id: Option<String>,
}

pub async fn register_vehicle(
    State(state): State<AppState>,
    Json(request): Json<RegisterVehicleRequest>,
) -> ApiResult<(StatusCode, Json<VehicleResponse>)> {
    info!("POST /api/vehicles - request: {:?}", request);
    let vehicle = state
        .vehicle_service
        .register(VehicleMapper::to_register_command(request))
        .await?;
    let success_message = format!("{} registered and awaiting approval", vehicle.plate_number);
    Ok((
        StatusCode::CREATED,
        Json(VehicleResponse {
            vehicle: VehicleMapper::to_dto(vehicle),
            success_message,
        }),
    ))
}

pub async fn list_vehicles(
    State(state): State<AppState>,
    Query(query): Query<VehicleListQuery>,
) -> ApiResult<Json<VehicleListResponse>> {
    info!("GET /api/vehicles - query: {:?}", query);
    let vehicles = state.vehicle_service.list_vehicles(query.resident_id.as_deref()).await?;
    Ok(Json(VehicleListResponse {
        vehicles: vehicles.into_iter().map(VehicleMapper::to_dto).collect(),
    }))
}

pub async fn get_vehicle(State(state): State<AppState>, Path(vehicle_id): Path<String>) -> ApiResult<Json<Vehicle>> {
    info!("GET /api/vehicles/{}", vehicle_id);
    let vehicle = state.vehicle_service.get_vehicle(&vehicle_id).await?;
    Ok(Json(VehicleMapper::to_dto(vehicle)))
}

pub async fn lookup_plate(State(state): State<AppState>, Path(plate): Path<String>) -> ApiResult<Json<Vehicle>> {
    info!("GET /api/vehicles/plate/{}", plate);
    let vehicle = state.vehicle_service.lookup_plate(&plate).await?;
    Ok(Json(VehicleMapper::to_dto(vehicle)))
}

pub async fn approve_vehicle(
    State(state): State<AppState>,
    Path(vehicle_id): Path<String>,
) -> ApiResult<Json<VehicleResponse>> {
    info!("POST /api/vehicles/{}/approve", vehicle_id);
    let vehicle = state.vehicle_service.approve(&vehicle_id).await?;
    let success_message = format!(
        "Issued sticker {} to {}",
        vehicle.sticker_number.as_deref().unwrap_or_default(),
        vehicle.plate_number
    );
    Ok(Json(VehicleResponse {
        vehicle: VehicleMapper::to_dto(vehicle),
        success_message,
    }))
}

pub async fn revoke_vehicle(
    State(state): State<AppState>,
    Path(vehicle_id): Path<String>,
) -> ApiResult<Json<VehicleResponse>> {
    info!("POST /api/vehicles/{}/revoke", vehicle_id);
    let vehicle = state.vehicle_service.revoke(&vehicle_id).await?;
    let success_message = format!("Revoked {}", vehicle.plate_number);
    Ok(Json(VehicleResponse {
        vehicle: VehicleMapper::to_dto(vehicle),
        success_message,
    }))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{approved_resident, send, setup_test_app};
    use axum::http::{Method, StatusCode};
    use chrono::{Datelike, Utc};
    use serde_json::json;

    fn car(resident_id: &str, plate: &str) -> serde_json::Value {
        json!({
            "resident_id": resident_id,
            "plate_number": plate,
            "make": "Toyota",
            "model": "Vios",
            "color": "Silver"
        })
    }

    #[tokio::test]
    async fn test_register_approve_and_look_up() {
        let app = setup_test_app().await;
        let resident_id = approved_resident(&app, "ana@example.com", None).await;

        let (status, body) = send(&app, Method::POST, "/api/vehicles", Some(car(&resident_id, "abc 1234")), false).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["vehicle"]["plate_number"], "ABC1234");
        assert_eq!(body["vehicle"]["status"], "Pending");
        assert!(body["vehicle"]["sticker_number"].is_null());
        let id = body["vehicle"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(&app, Method::POST, &format!("/api/vehicles/{}/approve", id), None, true).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["vehicle"]["status"], "Active");
        assert_eq!(
            body["vehicle"]["sticker_number"],
            format!("HOA-{}-0001", Utc::now().year()).as_str()
        );

        let (status, body) = send(&app, Method::GET, "/api/vehicles/plate/abc-1234", None, true).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], id.as_str());

        let (status, _) = send(&app, Method::GET, "/api/vehicles/plate/abc-1234", None, false).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_duplicate_plate_is_conflict() {
        let app = setup_test_app().await;
        let ana = approved_resident(&app, "ana@example.com", None).await;
        let ben = approved_resident(&app, "ben@example.com", None).await;

        send(&app, Method::POST, "/api/vehicles", Some(car(&ana, "ABC1234")), false).await;
        let (status, body) = send(&app, Method::POST, "/api/vehicles", Some(car(&ben, "abc-1234")), false).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Plate ABC1234 is already registered");
    }

    #[tokio::test]
    async fn test_vehicle_limit_per_resident() {
        let app = setup_test_app().await;
        let ana = approved_resident(&app, "ana@example.com", None).await;

        for plate in ["AAA111", "BBB222", "CCC333"] {
            let (status, _) = send(&app, Method::POST, "/api/vehicles", Some(car(&ana, plate)), false).await;
            assert_eq!(status, StatusCode::CREATED);
        }
        let (status, _) = send(&app, Method::POST, "/api/vehicles", Some(car(&ana, "DDD444")), false).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = send(&app, Method::GET, &format!("/api/vehicles?resident_id={}", ana), None, true).await;
        assert_eq!(body["vehicles"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_revoke_keeps_sticker() {
        let app = setup_test_app().await;
        let ana = approved_resident(&app, "ana@example.com", None).await;
        let (_, body) = send(&app, Method::POST, "/api/vehicles", Some(car(&ana, "XYZ987")), false).await;
        let id = body["vehicle"]["id"].as_str().unwrap().to_string();
        send(&app, Method::POST, &format!("/api/vehicles/{}/approve", id), None, true).await;

        let (status, body) = send(&app, Method::POST, &format!("/api/vehicles/{}/revoke", id), None, true).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["vehicle"]["status"], "Revoked");
        assert!(body["vehicle"]["sticker_number"].is_string());

        let (status, _) = send(&app, Method::POST, &format!("/api/vehicles/{}/approve", id), None, true).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
