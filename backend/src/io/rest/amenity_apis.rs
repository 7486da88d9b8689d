//! # REST API for Amenities
//!
//! Residents browse amenities and their free windows; admins manage the
//! catalogue.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use super::mappers::{AmenityMapper, ReservationMapper};
use super::ApiResult;
use crate::domain::validation::parse_date;
use crate::AppState;
use shared::{
    Amenity, AmenityListResponse, AmenityResponse, AvailabilityResponse, CreateAmenityRequest, UpdateAmenityRequest,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/amenities", get(list_amenities))
        .route("/amenities/:amenity_id", get(get_amenity))
        .route("/amenities/:amenity_id/availability", get(get_availability))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/amenities", post(create_amenity))
        .route("/amenities/:amenity_id", put(update_amenity))
        .route("/amenities/:amenity_id/deactivate", post(deactivate_amenity))
}

#[derive(Debug, Deserialize)]
pub struct AmenityListQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: Option<String>,
}

pub async fn list_amenities(
    State(state): State<AppState>,
    Query(query): Query<AmenityListQuery>,
) -> ApiResult<Json<AmenityListResponse>> {
    info!("GET /api/amenities - include_inactive: {}", query.include_inactive);
    let amenities = state.amenity_service.list_amenities(query.include_inactive).await?;
    Ok(Json(AmenityListResponse {
        amenities: amenities.into_iter().map(AmenityMapper::to_dto).collect(),
    }))
}

pub async fn get_amenity(State(state): State<AppState>, Path(amenity_id): Path<String>) -> ApiResult<Json<Amenity>> {
    info!("GET /api/amenities/{}", amenity_id);
    let amenity = state.amenity_service.get_amenity(&amenity_id).await?;
    Ok(Json(AmenityMapper::to_dto(amenity)))
}

/// Booked and free windows on `?date=YYYY-MM-DD` (default: today)
pub async fn get_availability(
    State(state): State<AppState>,
    Path(amenity_id): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> ApiResult<Json<AvailabilityResponse>> {
    info!("GET /api/amenities/{}/availability - date: {:?}", amenity_id, query.date);
    let date = match query.date.as_deref() {
        Some(date) => parse_date("Date", date)?,
        None => Utc::now().date_naive(),
    };
    let availability = state.reservation_service.availability(&amenity_id, date).await?;
    Ok(Json(ReservationMapper::to_availability_dto(availability)))
}

pub async fn create_amenity(
    State(state): State<AppState>,
    Json(request): Json<CreateAmenityRequest>,
) -> ApiResult<(StatusCode, Json<AmenityResponse>)> {
    info!("POST /api/amenities - request: {:?}", request);
    let command = AmenityMapper::to_create_command(request)?;
    let amenity = state.amenity_service.create_amenity(command).await?;
    let success_message = format!("{} is now available for booking", amenity.name);
    Ok((
        StatusCode::CREATED,
        Json(AmenityResponse {
            amenity: AmenityMapper::to_dto(amenity),
            success_message,
        }),
    ))
}

pub async fn update_amenity(
    State(state): State<AppState>,
    Path(amenity_id): Path<String>,
    Json(request): Json<UpdateAmenityRequest>,
) -> ApiResult<Json<AmenityResponse>> {
    info!("PUT /api/amenities/{} - request: {:?}", amenity_id, request);
    let command = AmenityMapper::to_update_command(request)?;
    let amenity = state.amenity_service.update_amenity(&amenity_id, command).await?;
    let success_message = format!("{} updated", amenity.name);
    Ok(Json(AmenityResponse {
        amenity: AmenityMapper::to_dto(amenity),
        success_message,
    }))
}

pub async fn deactivate_amenity(
    State(state): State<AppState>,
    Path(amenity_id): Path<String>,
) -> ApiResult<Json<AmenityResponse>> {
    info!("POST /api/amenities/{}/deactivate", amenity_id);
    let amenity = state.amenity_service.deactivate_amenity(&amenity_id).await?;
    let success_message = format!("{} is no longer bookable", amenity.name);
    Ok(Json(AmenityResponse {
        amenity: AmenityMapper::to_dto(amenity),
        success_message,
    }))
}
