//! # Storage Traits
//!
//! Abstractions the domain depends on where more than one backing store is
//! useful. The dues ledger is the only such seam today: the SQLite
//! repository serves production and tests can substitute their own.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::ledger::Period;
use crate::domain::models::dues::{DuesRate, PaymentEvent};

/// Append-only store of payment events plus the dues rate schedule
#[async_trait]
pub trait PaymentLedgerStore: Send + Sync {
    /// All configured rates, any order
    async fn list_rates(&self) -> Result<Vec<DuesRate>>;

    /// Insert or replace the rate effective from `rate.effective`
    async fn upsert_rate(&self, rate: &DuesRate) -> Result<()>;

    /// Every event for a resident in chronological period order
    async fn list_events(&self, resident_id: &str) -> Result<Vec<PaymentEvent>>;

    /// Events previously recorded under an idempotency reference
    async fn find_events_by_reference(&self, resident_id: &str, reference: &str) -> Result<Vec<PaymentEvent>>;

    /// Append events atomically: either all are stored or none are
    async fn append_events(&self, events: &[PaymentEvent]) -> Result<()>;

    /// Every event recorded against a period, across residents
    async fn list_events_for_period(&self, period: Period) -> Result<Vec<PaymentEvent>>;

    /// Every event recorded against any month of `year`
    async fn list_events_for_year(&self, year: i32) -> Result<Vec<PaymentEvent>>;
}
