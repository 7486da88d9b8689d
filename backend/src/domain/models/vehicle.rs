//! Domain model for a registered vehicle.
use chrono::{DateTime, Utc};

use super::text_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleStatus {
    Pending,
    Active,
    Revoked,
}

text_enum!(VehicleStatus {
    Pending => "pending",
    Active => "active",
    Revoked => "revoked",
});

#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub id: String,
    pub resident_id: String,
    pub plate_number: String,
    pub make: String,
    pub model: String,
    pub color: String,
    pub sticker_number: Option<String>,
    pub status: VehicleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    /// Format a sticker number for the `seq`th approval of `year`
    pub fn sticker_for(year: i32, seq: u32) -> String {
        format!("HOA-{}-{:04}", year, seq)
    }
}
