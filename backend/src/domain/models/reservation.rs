//! Domain model for an amenity reservation.
use chrono::{DateTime, NaiveDate, Utc};

use super::text_enum;
use crate::domain::conflict::TimeSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationStatus {
    Held,
    Confirmed,
    Cancelled,
}

text_enum!(ReservationStatus {
    Held => "held",
    Confirmed => "confirmed",
    Cancelled => "cancelled",
});

#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    pub id: String,
    pub amenity_id: String,
    pub resident_id: String,
    pub date: NaiveDate,
    pub slot: TimeSlot,
    pub status: ReservationStatus,
    pub fee_cents: i64,
    pub hold_expires_at: Option<DateTime<Utc>>,
    pub purpose: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    pub fn hold_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == ReservationStatus::Held
            && self.hold_expires_at.map_or(false, |expires| expires <= now)
    }

    /// Confirmed reservations and live holds keep their slot
    pub fn blocks_slot(&self, now: DateTime<Utc>) -> bool {
        match self.status {
            ReservationStatus::Confirmed => true,
            ReservationStatus::Held => !self.hold_expired(now),
            ReservationStatus::Cancelled => false,
        }
    }
}
