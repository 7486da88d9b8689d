//! SQLite repositories, one per table.

pub mod admin_access_repository;
pub mod amenity_repository;
pub mod dues_repository;
pub mod lot_repository;
pub mod reservation_repository;
pub mod resident_repository;
pub mod vehicle_repository;

pub use admin_access_repository::AdminAccessRepository;
pub use amenity_repository::AmenityRepository;
pub use dues_repository::DuesRepository;
pub use lot_repository::LotRepository;
pub use reservation_repository::ReservationRepository;
pub use resident_repository::ResidentRepository;
pub use vehicle_repository::VehicleRepository;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";
pub(crate) const TIME_FORMAT: &str = "%H:%M";

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("Invalid stored timestamp: {}", value))?
        .with_timezone(&Utc))
}

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).with_context(|| format!("Invalid stored date: {}", value))
}

pub(crate) fn parse_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, TIME_FORMAT).with_context(|| format!("Invalid stored time: {}", value))
}

/// Fixed-width RFC 3339 so stored timestamps compare correctly as text
pub(crate) fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}
