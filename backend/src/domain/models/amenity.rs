//! Domain model for a bookable amenity.
use chrono::NaiveTime;

use super::text_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmenityKind {
    Court,
    Gazebo,
    Parking,
    Pool,
    Clubhouse,
    Other,
}

text_enum!(AmenityKind {
    Court => "court",
    Gazebo => "gazebo",
    Parking => "parking",
    Pool => "pool",
    Clubhouse => "clubhouse",
    Other => "other",
});

#[derive(Debug, Clone, PartialEq)]
pub struct Amenity {
    pub id: String,
    pub name: String,
    pub kind: AmenityKind,
    pub open_time: NaiveTime,
    pub close_time: NaiveTime,
    pub hourly_rate_cents: i64,
    pub max_hours_per_booking: u32,
    pub is_active: bool,
}

impl Amenity {
    /// Fee for a booking of `minutes`, rounded up to the cent; None on overflow
    pub fn fee_for_minutes(&self, minutes: i64) -> Option<i64> {
        let numerator = self.hourly_rate_cents.checked_mul(minutes)?.checked_add(59)?;
        Some(numerator / 60)
    }
}
