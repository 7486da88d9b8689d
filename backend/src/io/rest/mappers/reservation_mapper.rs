use crate::domain::commands::reservation::{Availability, HoldReservationCommand};
use crate::domain::conflict::{TimeSlot, TIME_FORMAT};
use crate::domain::error::DomainResult;
use crate::domain::models::reservation::{Reservation as DomainReservation, ReservationStatus as DomainReservationStatus};
use crate::domain::validation::{parse_date, parse_time};
use shared::{
    AvailabilityResponse, CreateReservationRequest, Reservation as SharedReservation,
    ReservationStatus as SharedReservationStatus, TimeWindow,
};

/// Mapper between shared Reservation DTOs and domain reservations.
pub struct ReservationMapper;

impl ReservationMapper {
    pub fn to_dto(domain: DomainReservation) -> SharedReservation {
        SharedReservation {
            id: domain.id,
            amenity_id: domain.amenity_id,
            resident_id: domain.resident_id,
            date: domain.date.format("%Y-%m-%d").to_string(),
            start_time: domain.slot.start.format(TIME_FORMAT).to_string(),
            end_time: domain.slot.end.format(TIME_FORMAT).to_string(),
            status: Self::status_to_dto(domain.status),
            fee_cents: domain.fee_cents,
            hold_expires_at: domain.hold_expires_at.map(|t| t.to_rfc3339()),
            purpose: domain.purpose,
            created_at: domain.created_at.to_rfc3339(),
            updated_at: domain.updated_at.to_rfc3339(),
        }
    }

    pub fn status_to_dto(status: DomainReservationStatus) -> SharedReservationStatus {
        match status {
            DomainReservationStatus::Held => SharedReservationStatus::Held,
            DomainReservationStatus::Confirmed => SharedReservationStatus::Confirmed,
            DomainReservationStatus::Cancelled => SharedReservationStatus::Cancelled,
        }
    }

    pub fn status_to_domain(status: SharedReservationStatus) -> DomainReservationStatus {
        match status {
            SharedReservationStatus::Held => DomainReservationStatus::Held,
            SharedReservationStatus::Confirmed => DomainReservationStatus::Confirmed,
            SharedReservationStatus::Cancelled => DomainReservationStatus::Cancelled,
        }
    }

    pub fn to_hold_command(request: CreateReservationRequest) -> DomainResult<HoldReservationCommand> {
        Ok(HoldReservationCommand {
            amenity_id: request.amenity_id,
            resident_id: request.resident_id,
            date: parse_date("Date", &request.date)?,
            start_time: parse_time("Start time", &request.start_time)?,
            end_time: parse_time("End time", &request.end_time)?,
            purpose: request.purpose,
        })
    }

    fn window(slot: TimeSlot) -> TimeWindow {
        TimeWindow {
            start_time: slot.start.format(TIME_FORMAT).to_string(),
            end_time: slot.end.format(TIME_FORMAT).to_string(),
        }
    }

    pub fn to_availability_dto(availability: Availability) -> AvailabilityResponse {
        AvailabilityResponse {
            amenity_id: availability.amenity_id,
            date: availability.date.format("%Y-%m-%d").to_string(),
            open_time: availability.open_time.format(TIME_FORMAT).to_string(),
            close_time: availability.close_time.format(TIME_FORMAT).to_string(),
            booked: availability.booked.into_iter().map(|r| Self::window(r.slot)).collect(),
            free: availability.free.into_iter().map(Self::window).collect(),
        }
    }
}
