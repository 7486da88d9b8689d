//! # REST API for Reservations
//!
//! A booking is created as a hold with `POST /reservations`, then confirmed
//! or cancelled. A hold that is not confirmed in time stops blocking its
//! slot and confirming it fails with 409.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use super::mappers::ReservationMapper;
use super::ApiResult;
use crate::domain::error::DomainResult;
use crate::domain::validation::parse_date;
use crate::storage::repositories::reservation_repository::ReservationFilter;
use crate::AppState;
use shared::{CreateReservationRequest, Reservation, ReservationListResponse, ReservationResponse, ReservationStatus};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reservations", post(hold_reservation).get(list_reservations))
        .route("/reservations/:reservation_id", get(get_reservation))
        .route("/reservations/:reservation_id/confirm", post(confirm_reservation))
        .route("/reservations/:reservation_id/cancel", post(cancel_reservation))
}

#[derive(Debug, Default, Deserialize)]
pub struct ReservationQuery {
    pub amenity_id: Option<String>,
    pub resident_id: Option<String>,
    pub date: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub status: Option<ReservationStatus>,
}

impl ReservationQuery {
    fn into_filter(self) -> DomainResult<ReservationFilter> {
        let parse = |field: &str, value: Option<String>| value.as_deref().map(|d| parse_date(field, d)).transpose();
        Ok(ReservationFilter {
            date: parse("Date", self.date)?,
            from_date: parse("From date", self.from_date)?,
            to_date: parse("To date", self.to_date)?,
            amenity_id: self.amenity_id,
            resident_id: self.resident_id,
            status: self.status.map(ReservationMapper::status_to_domain),
        })
    }
}

pub async fn hold_reservation(
    State(state): State<AppState>,
    Json(request): Json<CreateReservationRequest>,
) -> ApiResult<(StatusCode, Json<ReservationResponse>)> {
    info!("POST /api/reservations - request: {:?}", request);
    let command = ReservationMapper::to_hold_command(request)?;
    let reservation = state.reservation_service.hold(command).await?;

    let success_message = match reservation.hold_expires_at {
        Some(expires) => format!("Slot held until {}. Confirm to keep it.", expires.format("%H:%M UTC")),
        None => "Reservation confirmed".to_string(),
    };
    Ok((
        StatusCode::CREATED,
        Json(ReservationResponse {
            reservation: ReservationMapper::to_dto(reservation),
            success_message,
        }),
    ))
}

pub async fn list_reservations(
    State(state): State<AppState>,
    Query(query): Query<ReservationQuery>,
) -> ApiResult<Json<ReservationListResponse>> {
    info!("GET /api/reservations - query: {:?}", query);
    let reservations = state.reservation_service.list_reservations(query.into_filter()?).await?;
    Ok(Json(ReservationListResponse {
        reservations: reservations.into_iter().map(ReservationMapper::to_dto).collect(),
    }))
}

pub async fn get_reservation(
    State(state): State<AppState>,
    Path(reservation_id): Path<String>,
) -> ApiResult<Json<Reservation>> {
    info!("GET /api/reservations/{}", reservation_id);
    let reservation = state.reservation_service.get_reservation(&reservation_id).await?;
    Ok(Json(ReservationMapper::to_dto(reservation)))
}

pub async fn confirm_reservation(
    State(state): State<AppState>,
    Path(reservation_id): Path<String>,
) -> ApiResult<Json<ReservationResponse>> {
    info!("POST /api/reservations/{}/confirm", reservation_id);
    let reservation = state.reservation_service.confirm(&reservation_id).await?;
    Ok(Json(ReservationResponse {
        reservation: ReservationMapper::to_dto(reservation),
        success_message: "Reservation confirmed".to_string(),
    }))
}

pub async fn cancel_reservation(
    State(state): State<AppState>,
    Path(reservation_id): Path<String>,
) -> ApiResult<Json<ReservationResponse>> {
    info!("POST /api/reservations/{}/cancel", reservation_id);
    let reservation = state.reservation_service.cancel(&reservation_id).await?;
    Ok(Json(ReservationResponse {
        reservation: ReservationMapper::to_dto(reservation),
        success_message: "Reservation cancelled".to_string(),
    }))
}
