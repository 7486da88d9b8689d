//! # Dues Service
//!
//! Records payments against the append-only ledger and projects statements
//! through the pure engine in `domain::ledger`.
//!
//! ## Idempotency
//!
//! A payment carrying a `reference` is applied at most once per resident,
//! whatever period it names. Replaying the same reference returns the events
//! recorded the first time with `applied = false`. The replay check and the
//! append run under `payment_lock`, and the `payment_references` primary key
//! on `(resident_id, reference)` rejects any second claim at the store.

use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::commands::dues::{AdvancePaymentCommand, PaymentResult, RecordPaymentCommand, SetRateCommand};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::ledger::{plan_advance, project, LedgerSummary, Period, RateTable};
use crate::domain::models::dues::{DuesRate, PaymentEvent, PaymentKind};
use crate::domain::models::generate_id;
use crate::domain::models::resident::Resident;
use crate::domain::validation::amount_cents;
use crate::storage::connection::is_unique_violation;
use crate::storage::{DbConnection, DuesRepository, PaymentLedgerStore, ResidentRepository};

pub const MAX_ADVANCE_MONTHS: u32 = 24;
const MAX_REFERENCE_LEN: usize = 64;

#[derive(Clone)]
pub struct DuesService {
    ledger: Arc<dyn PaymentLedgerStore>,
    resident_repository: ResidentRepository,
    default_monthly_cents: i64,
    // Serialises replay checks, advance planning and appends
    payment_lock: Arc<Mutex<()>>,
}

impl DuesService {
    pub fn new(db: DbConnection, default_monthly_cents: i64) -> Self {
        let ledger: Arc<dyn PaymentLedgerStore> = Arc::new(DuesRepository::new(db.clone()));
        Self::with_store(ledger, db, default_monthly_cents)
    }

    /// Build over an arbitrary ledger store
    pub fn with_store(ledger: Arc<dyn PaymentLedgerStore>, db: DbConnection, default_monthly_cents: i64) -> Self {
        Self {
            ledger,
            resident_repository: ResidentRepository::new(db),
            default_monthly_cents,
            payment_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn default_monthly_cents(&self) -> i64 {
        self.default_monthly_cents
    }

    pub async fn record_payment(&self, command: RecordPaymentCommand) -> DomainResult<PaymentResult> {
        info!(
            "Recording payment: resident={}, period={}, amount={}",
            command.resident_id, command.period, command.amount_cents
        );

        amount_cents("Payment amount", command.amount_cents, 1)?;
        let reference = normalize_reference(command.reference.as_deref())?;

        let resident = self.billable_resident(&command.resident_id).await?;
        if command.period < resident.billing_start() {
            return Err(DomainError::validation(format!(
                "Period {} is before billing start {}",
                command.period,
                resident.billing_start()
            )));
        }

        let _guard = self.payment_lock.lock().await;
        if let Some(reference) = &reference {
            if let Some(replay) = self.replay(&resident.id, reference).await? {
                return Ok(replay);
            }
        }

        let event = PaymentEvent {
            id: generate_id("payment"),
            resident_id: resident.id.clone(),
            period: command.period,
            amount_cents: command.amount_cents,
            kind: PaymentKind::Regular,
            reference: reference.clone(),
            note: command.note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            recorded_at: Utc::now(),
        };

        self.append(&resident.id, reference.as_deref(), vec![event]).await
    }

    /// Pay `months` periods starting at `from` in full, one Advance event per period
    pub async fn apply_advance_payment(&self, command: AdvancePaymentCommand) -> DomainResult<PaymentResult> {
        info!(
            "Applying advance payment: resident={}, from={}, months={}",
            command.resident_id, command.from, command.months
        );

        if command.months == 0 || command.months > MAX_ADVANCE_MONTHS {
            return Err(DomainError::validation(format!(
                "Months must be between 1 and {}",
                MAX_ADVANCE_MONTHS
            )));
        }
        let reference = normalize_reference(Some(&command.reference))?
            .ok_or_else(|| DomainError::validation("Advance payments require a reference"))?;

        let resident = self.billable_resident(&command.resident_id).await?;
        let start = resident.billing_start();
        if command.from < start {
            return Err(DomainError::validation(format!(
                "Period {} is before billing start {}",
                command.from, start
            )));
        }

        let _guard = self.payment_lock.lock().await;
        if let Some(replay) = self.replay(&resident.id, &reference).await? {
            return Ok(replay);
        }

        let rates = self.rate_table().await?;
        let events = self.ledger.list_events(&resident.id).await?;
        let plan = plan_advance(start, command.from, command.months, &rates, &events);

        if plan.is_empty() {
            return Err(DomainError::validation(format!(
                "Nothing is owed for {} month(s) from {}",
                command.months, command.from
            )));
        }

        let recorded_at = Utc::now();
        let new_events: Vec<PaymentEvent> = plan
            .into_iter()
            .map(|(period, amount_cents)| PaymentEvent {
                id: generate_id("payment"),
                resident_id: resident.id.clone(),
                period,
                amount_cents,
                kind: PaymentKind::Advance,
                reference: Some(reference.clone()),
                note: None,
                recorded_at,
            })
            .collect();

        self.append(&resident.id, Some(&reference), new_events).await
    }

    /// Month-by-month statement from billing start through `through`
    pub async fn statement(&self, resident_id: &str, through: Period) -> DomainResult<LedgerSummary> {
        let resident = self.billable_resident(resident_id).await?;
        self.summary_for(&resident, through).await
    }

    /// Project a resident already known to be billable
    pub async fn summary_for(&self, resident: &Resident, through: Period) -> DomainResult<LedgerSummary> {
        let rates = self.rate_table().await?;
        let events = self.ledger.list_events(&resident.id).await?;
        let summary = project(resident.billing_start(), through, &rates, &events);
        debug!(
            "Projected {} months for {}: balance={}, credit={}",
            summary.lines.len(),
            resident.id,
            summary.balance_cents,
            summary.credit_cents
        );
        Ok(summary)
    }

    pub async fn current_balance(&self, resident_id: &str) -> DomainResult<(Period, LedgerSummary)> {
        self.current_balance_at(resident_id, Utc::now().date_naive()).await
    }

    /// Balance as of the month containing `today`
    pub async fn current_balance_at(&self, resident_id: &str, today: NaiveDate) -> DomainResult<(Period, LedgerSummary)> {
        let period = Period::from_date(today);
        let summary = self.statement(resident_id, period).await?;
        Ok((period, summary))
    }

    pub async fn set_rate(&self, command: SetRateCommand) -> DomainResult<DuesRate> {
        info!("Setting dues rate from {}: {}", command.effective, command.amount_cents);

        amount_cents("Dues rate", command.amount_cents, 0)?;

        let existing = self.ledger.list_rates().await?;
        let id = existing
            .iter()
            .find(|r| r.effective == command.effective)
            .map(|r| r.id.clone())
            .unwrap_or_else(|| generate_id("rate"));

        let rate = DuesRate {
            id,
            effective: command.effective,
            amount_cents: command.amount_cents,
        };
        self.ledger.upsert_rate(&rate).await?;
        Ok(rate)
    }

    pub async fn list_rates(&self) -> DomainResult<Vec<DuesRate>> {
        Ok(self.ledger.list_rates().await?)
    }

    pub async fn rate_table(&self) -> DomainResult<RateTable> {
        let rates = self.ledger.list_rates().await?;
        Ok(RateTable::new(&rates, self.default_monthly_cents))
    }

    /// Payment events for one period across all residents
    pub async fn events_for_period(&self, period: Period) -> DomainResult<Vec<PaymentEvent>> {
        Ok(self.ledger.list_events_for_period(period).await?)
    }

    pub async fn events_for_year(&self, year: i32) -> DomainResult<Vec<PaymentEvent>> {
        Ok(self.ledger.list_events_for_year(year).await?)
    }

    async fn billable_resident(&self, resident_id: &str) -> DomainResult<Resident> {
        let resident = self
            .resident_repository
            .get_resident(resident_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Resident", resident_id))?;

        if !resident.is_billable() {
            return Err(DomainError::validation(format!(
                "Resident {} is not an approved household head",
                resident_id
            )));
        }
        Ok(resident)
    }

    async fn replay(&self, resident_id: &str, reference: &str) -> DomainResult<Option<PaymentResult>> {
        let existing = self.ledger.find_events_by_reference(resident_id, reference).await?;
        if existing.is_empty() {
            return Ok(None);
        }
        info!("Reference {} already applied for {}, returning {} events", reference, resident_id, existing.len());
        Ok(Some(PaymentResult {
            events: existing,
            applied: false,
        }))
    }

    async fn append(
        &self,
        resident_id: &str,
        reference: Option<&str>,
        events: Vec<PaymentEvent>,
    ) -> DomainResult<PaymentResult> {
        match self.ledger.append_events(&events).await {
            Ok(()) => {
                info!("Appended {} payment event(s) for {}", events.len(), resident_id);
                Ok(PaymentResult { events, applied: true })
            }
            Err(e) if is_unique_violation(&e) => {
                // A concurrent request with the same reference won
                let reference = reference.ok_or(DomainError::Storage(e))?;
                warn!("Concurrent replay of reference {} for {}", reference, resident_id);
                self.replay(resident_id, reference)
                    .await?
                    .ok_or_else(|| DomainError::conflict(format!("Reference {} is already in use", reference)))
            }
            Err(e) => Err(DomainError::Storage(e)),
        }
    }
}

fn normalize_reference(reference: Option<&str>) -> DomainResult<Option<String>> {
    let Some(reference) = reference.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };
    if reference.chars().count() > MAX_REFERENCE_LEN {
        return Err(DomainError::validation(format!(
            "Reference cannot exceed {} characters",
            MAX_REFERENCE_LEN
        )));
    }
    Ok(Some(reference.to_string()))
}
