//! # Dues Ledger Engine
//!
//! Pure projection of a resident's monthly dues from the append-only list of
//! payment events. Nothing in this module touches storage.
//!
//! For every month from billing start through the requested period:
//!
//! ```text
//! required  = rate(month) + carried_in
//! available = paid(month) + credit_in
//! balance   = max(required - available, 0)   -> next month's carried_in
//! credit    = max(available - required, 0)   -> next month's credit_in
//! ```
//!
//! The balance never goes negative. Overpayment becomes credit, which is how
//! advance payments are applied.

use chrono::{Datelike, NaiveDate};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::models::dues::{DuesRate, PaymentEvent};

/// A calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Ord for Period {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.year, self.month).cmp(&(other.year, other.month))
    }
}

impl PartialOrd for Period {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Period {
    pub fn new(year: i32, month: u32) -> DomainResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(DomainError::validation(format!(
                "Month must be between 1 and 12, got {}",
                month
            )));
        }
        if !(1900..=2200).contains(&year) {
            return Err(DomainError::validation(format!(
                "Year must be between 1900 and 2200, got {}",
                year
            )));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    pub fn prev(self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    /// Add `n` months
    pub fn plus(self, n: u32) -> Self {
        let index = self.index() + n as i64;
        Self::from_index(index)
    }

    fn index(self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    fn from_index(index: i64) -> Self {
        Self {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    /// Inclusive list of months from `self` through `end`; empty if `end` is earlier
    pub fn through(self, end: Period) -> Vec<Period> {
        (self.index()..=end.index()).map(Self::from_index).collect()
    }
}

/// Monthly due amounts in force over time
#[derive(Debug, Clone)]
pub struct RateTable {
    rates: Vec<(Period, i64)>,
    default_cents: i64,
}

impl RateTable {
    pub fn new(rates: &[DuesRate], default_cents: i64) -> Self {
        let mut rates: Vec<(Period, i64)> = rates.iter().map(|r| (r.effective, r.amount_cents)).collect();
        rates.sort_by_key(|(period, _)| *period);
        Self { rates, default_cents }
    }

    pub fn flat(amount_cents: i64) -> Self {
        Self {
            rates: Vec::new(),
            default_cents: amount_cents,
        }
    }

    /// Latest rate effective on or before `period`, else the default
    pub fn rate_for(&self, period: Period) -> i64 {
        let idx = self.rates.partition_point(|(effective, _)| *effective <= period);
        if idx == 0 {
            self.default_cents
        } else {
            self.rates[idx - 1].1
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
    Paid,
    Partial,
    Unpaid,
}

/// One month of a projected statement
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerLine {
    pub period: Period,
    pub rate_cents: i64,
    pub carried_in_cents: i64,
    pub credit_in_cents: i64,
    pub required_cents: i64,
    pub paid_cents: i64,
    pub balance_cents: i64,
    pub credit_out_cents: i64,
    pub status: LineStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSummary {
    pub lines: Vec<LedgerLine>,
    pub total_billed_cents: i64,
    pub total_paid_cents: i64,
    pub balance_cents: i64,
    pub credit_cents: i64,
}

impl LedgerSummary {
    /// Consecutive months at the end of the statement that are not fully paid
    pub fn trailing_unpaid_months(&self) -> u32 {
        self.lines
            .iter()
            .rev()
            .take_while(|line| line.status != LineStatus::Paid)
            .count() as u32
    }

    pub fn line_for(&self, period: Period) -> Option<&LedgerLine> {
        self.lines.iter().find(|line| line.period == period)
    }
}

fn paid_by_period(events: &[PaymentEvent]) -> BTreeMap<Period, i64> {
    let mut paid = BTreeMap::new();
    for event in events {
        let total = paid.entry(event.period).or_insert(0i64);
        *total = total.saturating_add(event.amount_cents);
    }
    paid
}

fn step(period: Period, rate: i64, carried_in: i64, credit_in: i64, paid: i64) -> LedgerLine {
    let required = rate.saturating_add(carried_in);
    let available = paid.saturating_add(credit_in);
    let balance = (required - available).max(0);
    let credit_out = (available - required).max(0);

    let status = if balance == 0 {
        LineStatus::Paid
    } else if available > 0 {
        LineStatus::Partial
    } else {
        LineStatus::Unpaid
    };

    LedgerLine {
        period,
        rate_cents: rate,
        carried_in_cents: carried_in,
        credit_in_cents: credit_in,
        required_cents: required,
        paid_cents: paid,
        balance_cents: balance,
        credit_out_cents: credit_out,
        status,
    }
}

/// Project the ledger from `start` through `through` (inclusive)
///
/// Events outside that window are ignored.
pub fn project(start: Period, through: Period, rates: &RateTable, events: &[PaymentEvent]) -> LedgerSummary {
    let paid = paid_by_period(events);
    let mut lines = Vec::new();
    let mut carried = 0;
    let mut credit = 0;
    let mut total_billed: i64 = 0;
    let mut total_paid: i64 = 0;

    for period in start.through(through) {
        let rate = rates.rate_for(period);
        let paid_now = paid.get(&period).copied().unwrap_or(0);
        let line = step(period, rate, carried, credit, paid_now);

        carried = line.balance_cents;
        credit = line.credit_out_cents;
        total_billed = total_billed.saturating_add(rate);
        total_paid = total_paid.saturating_add(paid_now);
        lines.push(line);
    }

    LedgerSummary {
        lines,
        total_billed_cents: total_billed,
        total_paid_cents: total_paid,
        balance_cents: carried,
        credit_cents: credit,
    }
}

/// Amounts to record so that `months` periods starting at `from` are fully paid
///
/// Outstanding carry from before `from` is folded into the first period's
/// amount, existing payments and credit are taken into account, and periods
/// that are already covered are skipped.
pub fn plan_advance(
    start: Period,
    from: Period,
    months: u32,
    rates: &RateTable,
    events: &[PaymentEvent],
) -> Vec<(Period, i64)> {
    let before = if from > start {
        project(start, from.prev(), rates, events)
    } else {
        project(start, start.prev(), rates, events)
    };

    let paid = paid_by_period(events);
    let mut carried = before.balance_cents;
    let mut credit = before.credit_cents;
    let mut plan = Vec::new();

    for offset in 0..months {
        let period = from.plus(offset);
        let rate = rates.rate_for(period);
        let paid_now = paid.get(&period).copied().unwrap_or(0);
        let line = step(period, rate, carried, credit, paid_now);

        if line.balance_cents > 0 {
            plan.push((period, line.balance_cents));
        }

        // After the advance lands the month is settled
        carried = 0;
        credit = line.credit_out_cents;
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::dues::PaymentKind;
    use chrono::Utc;

    fn p(year: i32, month: u32) -> Period {
        Period::new(year, month).unwrap()
    }

    fn payment(period: Period, amount: i64) -> PaymentEvent {
        PaymentEvent {
            id: format!("payment::{}::{}", period, amount),
            resident_id: "resident::1".to_string(),
            period,
            amount_cents: amount,
            kind: PaymentKind::Regular,
            reference: None,
            note: None,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_period_arithmetic_wraps_years() {
        assert_eq!(p(2024, 12).next(), p(2025, 1));
        assert_eq!(p(2025, 1).prev(), p(2024, 12));
        assert_eq!(p(2024, 11).plus(3), p(2025, 2));
        assert_eq!(p(2024, 11).through(p(2025, 1)), vec![p(2024, 11), p(2024, 12), p(2025, 1)]);
        assert!(p(2025, 1).through(p(2024, 12)).is_empty());
    }

    #[test]
    fn test_period_validation() {
        assert!(Period::new(2025, 0).is_err());
        assert!(Period::new(2025, 13).is_err());
        assert!(Period::new(1800, 5).is_err());
    }

    #[test]
    fn test_rate_table_picks_latest_effective_rate() {
        let rates = vec![
            DuesRate { id: "r2".into(), effective: p(2025, 6), amount_cents: 2000 },
            DuesRate { id: "r1".into(), effective: p(2025, 1), amount_cents: 1500 },
        ];
        let table = RateTable::new(&rates, 1000);

        assert_eq!(table.rate_for(p(2024, 12)), 1000);
        assert_eq!(table.rate_for(p(2025, 1)), 1500);
        assert_eq!(table.rate_for(p(2025, 5)), 1500);
        assert_eq!(table.rate_for(p(2025, 6)), 2000);
        assert_eq!(table.rate_for(p(2030, 1)), 2000);
    }

    #[test]
    fn test_unpaid_months_accumulate() {
        let summary = project(p(2025, 1), p(2025, 4), &RateTable::flat(1000), &[]);

        let balances: Vec<i64> = summary.lines.iter().map(|l| l.balance_cents).collect();
        assert_eq!(balances, vec![1000, 2000, 3000, 4000]);
        assert_eq!(summary.balance_cents, 4000);
        assert_eq!(summary.total_billed_cents, 4000);
        assert_eq!(summary.trailing_unpaid_months(), 4);
        assert!(summary.lines.iter().all(|l| l.status == LineStatus::Unpaid));
    }

    #[test]
    fn test_shortfall_carries_forward() {
        let events = vec![payment(p(2025, 1), 600), payment(p(2025, 2), 1400)];
        let summary = project(p(2025, 1), p(2025, 3), &RateTable::flat(1000), &events);

        let jan = &summary.lines[0];
        assert_eq!(jan.balance_cents, 400);
        assert_eq!(jan.status, LineStatus::Partial);

        let feb = &summary.lines[1];
        assert_eq!(feb.carried_in_cents, 400);
        assert_eq!(feb.required_cents, 1400);
        assert_eq!(feb.balance_cents, 0);
        assert_eq!(feb.status, LineStatus::Paid);

        let mar = &summary.lines[2];
        assert_eq!(mar.required_cents, 1000);
        assert_eq!(summary.trailing_unpaid_months(), 1);
    }

    #[test]
    fn test_overpayment_becomes_credit_and_balance_never_negative() {
        let events = vec![payment(p(2025, 1), 2500)];
        let summary = project(p(2025, 1), p(2025, 3), &RateTable::flat(1000), &events);

        assert_eq!(summary.lines[0].balance_cents, 0);
        assert_eq!(summary.lines[0].credit_out_cents, 1500);
        assert_eq!(summary.lines[1].status, LineStatus::Paid);
        assert_eq!(summary.lines[1].credit_out_cents, 500);
        assert_eq!(summary.lines[2].balance_cents, 500);
        assert_eq!(summary.lines[2].status, LineStatus::Partial);
        assert!(summary.lines.iter().all(|l| l.balance_cents >= 0));
    }

    #[test]
    fn test_events_outside_window_ignored() {
        let events = vec![payment(p(2024, 12), 5000), payment(p(2025, 5), 5000)];
        let summary = project(p(2025, 1), p(2025, 2), &RateTable::flat(1000), &events);
        assert_eq!(summary.total_paid_cents, 0);
        assert_eq!(summary.balance_cents, 2000);
    }

    #[test]
    fn test_plan_advance_folds_arrears_into_first_month() {
        let events = vec![payment(p(2025, 1), 400)];
        let plan = plan_advance(p(2025, 1), p(2025, 2), 3, &RateTable::flat(1000), &events);

        assert_eq!(plan, vec![(p(2025, 2), 1600), (p(2025, 3), 1000), (p(2025, 4), 1000)]);
    }

    #[test]
    fn test_plan_advance_skips_covered_months() {
        let events = vec![payment(p(2025, 1), 1000), payment(p(2025, 2), 1500)];
        let plan = plan_advance(p(2025, 1), p(2025, 2), 3, &RateTable::flat(1000), &events);

        // February is covered with 500 left over for March
        assert_eq!(plan, vec![(p(2025, 3), 500), (p(2025, 4), 1000)]);
    }

    #[test]
    fn test_plan_then_project_settles_every_month() {
        let rates = RateTable::flat(1000);
        let mut events = vec![payment(p(2025, 1), 300)];
        for (period, amount) in plan_advance(p(2025, 1), p(2025, 1), 6, &rates, &events) {
            events.push(payment(period, amount));
        }

        let summary = project(p(2025, 1), p(2025, 6), &rates, &events);
        assert!(summary.lines.iter().all(|l| l.status == LineStatus::Paid));
        assert_eq!(summary.balance_cents, 0);
        assert_eq!(summary.total_paid_cents, 6000);
    }
}
