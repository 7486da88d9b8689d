//! Domain models for dues rates and payment events.
use chrono::{DateTime, Utc};

use super::text_enum;
use crate::domain::ledger::Period;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentKind {
    Regular,
    Advance,
}

text_enum!(PaymentKind {
    Regular => "regular",
    Advance => "advance",
});

/// An append-only record of money received for one (resident, period)
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentEvent {
    pub id: String,
    pub resident_id: String,
    pub period: Period,
    pub amount_cents: i64,
    pub kind: PaymentKind,
    pub reference: Option<String>,
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Monthly due in force from `effective` until the next rate
#[derive(Debug, Clone, PartialEq)]
pub struct DuesRate {
    pub id: String,
    pub effective: Period,
    pub amount_cents: i64,
}
