//! # REST API for Residents
//!
//! Sign-up is public. Listing, editing and the approval workflow are
//! admin-only.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use super::mappers::ResidentMapper;
use super::ApiResult;
use crate::AppState;
use shared::{
    Resident, ResidentListResponse, ResidentResponse, ResidentStatus, SignUpRequest, UpdateResidentRequest,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/residents", post(sign_up))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/residents", get(list_residents))
        .route("/residents/:resident_id", get(get_resident).put(update_resident))
        .route("/residents/:resident_id/approve", post(approve_resident))
        .route("/residents/:resident_id/reject", post(reject_resident))
        .route("/residents/:resident_id/deactivate", post(deactivate_resident))
}

#[derive(Debug, Deserialize)]
pub struct ResidentListQuery {
    pub status: Option<ResidentStatus>,
}

pub async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> ApiResult<(StatusCode, Json<ResidentResponse>)> {
    info!("POST /api/residents - email: {}", request.email);
    let command = ResidentMapper::to_sign_up_command(request)?;
    let resident = state.resident_service.sign_up(command).await?;

    let success_message = format!("Welcome, {}! Your sign-up is awaiting approval.", resident.first_name);
    Ok((
        StatusCode::CREATED,
        Json(ResidentResponse {
            resident: ResidentMapper::to_dto(resident),
            success_message,
        }),
    ))
}

pub async fn list_residents(
    State(state): State<AppState>,
    Query(query): Query<ResidentListQuery>,
) -> ApiResult<Json<ResidentListResponse>> {
    info!("GET /api/residents - query: {:?}", query);
    let status = query.status.map(ResidentMapper::status_to_domain);
    let residents = state.resident_service.list_residents(status).await?;
    Ok(Json(ResidentListResponse {
        residents: residents.into_iter().map(ResidentMapper::to_dto).collect(),
    }))
}

pub async fn get_resident(
    State(state): State<AppState>,
    Path(resident_id): Path<String>,
) -> ApiResult<Json<Resident>> {
    info!("GET /api/residents/{}", resident_id);
    let resident = state.resident_service.get_resident(&resident_id).await?;
    Ok(Json(ResidentMapper::to_dto(resident)))
}

pub async fn update_resident(
    State(state): State<AppState>,
    Path(resident_id): Path<String>,
    Json(request): Json<UpdateResidentRequest>,
) -> ApiResult<Json<ResidentResponse>> {
    info!("PUT /api/residents/{}", resident_id);
    let resident = state
        .resident_service
        .update_resident(&resident_id, ResidentMapper::to_update_command(request))
        .await?;
    Ok(Json(ResidentResponse {
        success_message: format!("Updated {}", resident.full_name()),
        resident: ResidentMapper::to_dto(resident),
    }))
}

pub async fn approve_resident(
    State(state): State<AppState>,
    Path(resident_id): Path<String>,
) -> ApiResult<Json<ResidentResponse>> {
    info!("POST /api/residents/{}/approve", resident_id);
    let resident = state.resident_service.approve(&resident_id).await?;
    Ok(Json(ResidentResponse {
        success_message: format!("Approved {}", resident.full_name()),
        resident: ResidentMapper::to_dto(resident),
    }))
}

pub async fn reject_resident(
    State(state): State<AppState>,
    Path(resident_id): Path<String>,
) -> ApiResult<Json<ResidentResponse>> {
    info!("POST /api/residents/{}/reject", resident_id);
    let resident = state.resident_service.reject(&resident_id).await?;
    Ok(Json(ResidentResponse {
        success_message: format!("Rejected {}", resident.full_name()),
        resident: ResidentMapper::to_dto(resident),
    }))
}

pub async fn deactivate_resident(
    State(state): State<AppState>,
    Path(resident_id): Path<String>,
) -> ApiResult<Json<ResidentResponse>> {
    info!("POST /api/residents/{}/deactivate", resident_id);
    let resident = state.resident_service.deactivate(&resident_id).await?;
    Ok(Json(ResidentResponse {
        success_message: format!("Deactivated {}", resident.full_name()),
        resident: ResidentMapper::to_dto(resident),
    }))
}
