//! Domain model for a resident.
use chrono::{DateTime, NaiveDate, Utc};

use super::text_enum;
use crate::domain::ledger::Period;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResidentStatus {
    Pending,
    Approved,
    Rejected,
    Inactive,
}

text_enum!(ResidentStatus {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
    Inactive => "inactive",
});

#[derive(Debug, Clone, PartialEq)]
pub struct Resident {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub lot_id: Option<String>,
    pub is_household_head: bool,
    pub status: ResidentStatus,
    pub move_in_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resident {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Approved household heads owe monthly dues
    pub fn is_billable(&self) -> bool {
        self.is_household_head && self.status == ResidentStatus::Approved
    }

    /// First month dues accrue for this resident
    pub fn billing_start(&self) -> Period {
        Period::from_date(self.move_in_date)
    }
}
