//! Reporting for the admin dashboard.
//!
//! Reports are read-only aggregations over residents, lots, vehicles,
//! reservations and the dues ledger. They are returned directly as the
//! `shared` response types since nothing downstream needs a domain form.

use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

use shared::{
    CollectionMonth, CollectionReport, DashboardResponse, DelinquencyReport, DelinquencyRow, LotOccupancy,
    ResidentCounts,
};

use crate::domain::dues_service::DuesService;
use crate::domain::error::DomainResult;
use crate::domain::ledger::{LineStatus, Period};
use crate::domain::models::lot::LotStatus;
use crate::domain::models::reservation::ReservationStatus;
use crate::domain::models::resident::{Resident, ResidentStatus};
use crate::domain::models::vehicle::VehicleStatus;
use crate::storage::repositories::reservation_repository::ReservationFilter;
use crate::storage::{DbConnection, LotRepository, ReservationRepository, ResidentRepository, VehicleRepository};

/// Upcoming window length in calendar days, today included
const UPCOMING_DAYS: i64 = 7;

/// A rendered CSV export ready to send as a download
#[derive(Debug, Clone)]
pub struct DuesExport {
    pub filename: String,
    pub content: String,
    pub row_count: usize,
}

#[derive(Debug, Serialize)]
struct DuesCsvRow<'a> {
    resident_id: &'a str,
    name: String,
    lot: String,
    period: String,
    required_cents: i64,
    paid_cents: i64,
    balance_cents: i64,
    status: &'static str,
}

#[derive(Clone)]
pub struct ReportService {
    dues_service: DuesService,
    resident_repository: ResidentRepository,
    lot_repository: LotRepository,
    vehicle_repository: VehicleRepository,
    reservation_repository: ReservationRepository,
}

impl ReportService {
    pub fn new(db: DbConnection, dues_service: DuesService) -> Self {
        Self {
            dues_service,
            resident_repository: ResidentRepository::new(db.clone()),
            lot_repository: LotRepository::new(db.clone()),
            vehicle_repository: VehicleRepository::new(db.clone()),
            reservation_repository: ReservationRepository::new(db),
        }
    }

    pub async fn dashboard(&self, period: Period) -> DomainResult<DashboardResponse> {
        self.dashboard_at(period, Utc::now().date_naive()).await
    }

    /// Dashboard for `period`, counting confirmed reservations in the seven days from `today`
    pub async fn dashboard_at(&self, period: Period, today: NaiveDate) -> DomainResult<DashboardResponse> {
        info!("Building dashboard for {}", period);

        let residents = self.resident_repository.list_residents(None).await?;
        let mut resident_counts = ResidentCounts::default();
        for resident in &residents {
            match resident.status {
                ResidentStatus::Pending => resident_counts.pending += 1,
                ResidentStatus::Approved => resident_counts.approved += 1,
                ResidentStatus::Rejected => resident_counts.rejected += 1,
                ResidentStatus::Inactive => resident_counts.inactive += 1,
            }
        }

        let lots = self.lot_repository.list_lots().await?;
        let mut occupancy = LotOccupancy {
            total: lots.len(),
            ..Default::default()
        };
        for lot in &lots {
            match lot.status {
                LotStatus::Vacant => occupancy.vacant += 1,
                LotStatus::Occupied => occupancy.occupied += 1,
                LotStatus::ForSale => occupancy.for_sale += 1,
                LotStatus::UnderConstruction => occupancy.under_construction += 1,
            }
        }
        occupancy.occupancy_rate = if occupancy.total > 0 {
            (occupancy.occupied as f64 / occupancy.total as f64) * 100.0
        } else {
            0.0
        };

        let active_vehicles = self
            .vehicle_repository
            .list_vehicles(None)
            .await?
            .iter()
            .filter(|v| v.status == VehicleStatus::Active)
            .count();

        let collected_cents: i64 = self
            .dues_service
            .events_for_period(period)
            .await?
            .iter()
            .map(|e| e.amount_cents)
            .sum();

        let balances = self.outstanding_balances(residents, period).await?;
        let outstanding_cents: i64 = balances.iter().map(|(_, balance, _)| balance).sum();

        let upcoming = self
            .reservation_repository
            .list_reservations(&ReservationFilter {
                from_date: Some(today),
                to_date: Some(today + Duration::days(UPCOMING_DAYS - 1)),
                status: Some(ReservationStatus::Confirmed),
                ..Default::default()
            })
            .await?;

        Ok(DashboardResponse {
            year: period.year,
            month: period.month,
            residents: resident_counts,
            lots: occupancy,
            active_vehicles,
            collected_cents,
            outstanding_cents,
            delinquent_residents: balances.len(),
            upcoming_reservations: upcoming.len(),
        })
    }

    /// Billable residents owing money as of `period`, largest balance first
    pub async fn delinquency_report(&self, period: Period) -> DomainResult<DelinquencyReport> {
        info!("Building delinquency report for {}", period);

        let residents = self.resident_repository.list_residents(Some(ResidentStatus::Approved)).await?;
        let lot_labels = self.lot_labels().await?;
        let balances = self.outstanding_balances(residents, period).await?;

        let mut rows: Vec<DelinquencyRow> = balances
            .into_iter()
            .map(|(resident, balance_cents, months_unpaid)| DelinquencyRow {
                name: resident.full_name(),
                lot_label: resident.lot_id.as_ref().and_then(|id| lot_labels.get(id).cloned()),
                resident_id: resident.id,
                balance_cents,
                months_unpaid,
            })
            .collect();
        rows.sort_by(|a, b| b.balance_cents.cmp(&a.balance_cents).then_with(|| a.name.cmp(&b.name)));

        let total_outstanding_cents = rows.iter().map(|r| r.balance_cents).sum();
        Ok(DelinquencyReport {
            year: period.year,
            month: period.month,
            rows,
            total_outstanding_cents,
        })
    }

    /// Payments received per month of `year`, all twelve months listed
    pub async fn collection_report(&self, year: i32) -> DomainResult<CollectionReport> {
        info!("Building collection report for {}", year);
        Period::new(year, 1)?;

        let events = self.dues_service.events_for_year(year).await?;
        let mut months: Vec<CollectionMonth> = (1..=12)
            .map(|month| CollectionMonth {
                month,
                collected_cents: 0,
                payment_count: 0,
            })
            .collect();

        for event in events.iter().filter(|e| e.period.year == year) {
            let entry = &mut months[(event.period.month - 1) as usize];
            entry.collected_cents += event.amount_cents;
            entry.payment_count += 1;
        }

        let total_cents = months.iter().map(|m| m.collected_cents).sum();
        Ok(CollectionReport { year, months, total_cents })
    }

    /// CSV of every billable resident's statement line for `period`
    pub async fn export_dues_csv(&self, period: Period) -> DomainResult<DuesExport> {
        info!("Exporting dues CSV for {}", period);

        let residents = self.resident_repository.list_residents(Some(ResidentStatus::Approved)).await?;
        let lot_labels = self.lot_labels().await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        let mut row_count = 0;

        for resident in residents.iter().filter(|r| r.is_billable()) {
            let summary = self.dues_service.summary_for(resident, period).await?;
            let Some(line) = summary.line_for(period) else {
                // Billing starts after this period
                continue;
            };

            writer
                .serialize(DuesCsvRow {
                    resident_id: &resident.id,
                    name: resident.full_name(),
                    lot: resident
                        .lot_id
                        .as_ref()
                        .and_then(|id| lot_labels.get(id).cloned())
                        .unwrap_or_default(),
                    period: period.to_string(),
                    required_cents: line.required_cents,
                    paid_cents: line.paid_cents,
                    balance_cents: line.balance_cents,
                    status: status_label(line.status),
                })
                .map_err(anyhow::Error::from)?;
            row_count += 1;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to finish CSV export: {}", e.error()))?;
        let content = String::from_utf8(bytes).map_err(anyhow::Error::from)?;

        info!("Exported {} dues rows for {}", row_count, period);
        Ok(DuesExport {
            filename: format!("dues_{}.csv", period),
            content,
            row_count,
        })
    }

    /// Billable residents with a positive balance, with trailing unpaid months
    async fn outstanding_balances(
        &self,
        residents: Vec<Resident>,
        period: Period,
    ) -> DomainResult<Vec<(Resident, i64, u32)>> {
        let mut owing = Vec::new();
        for resident in residents.into_iter().filter(Resident::is_billable) {
            let summary = self.dues_service.summary_for(&resident, period).await?;
            if summary.balance_cents > 0 {
                let months_unpaid = summary.trailing_unpaid_months();
                owing.push((resident, summary.balance_cents, months_unpaid));
            }
        }
        Ok(owing)
    }

    async fn lot_labels(&self) -> DomainResult<HashMap<String, String>> {
        Ok(self
            .lot_repository
            .list_lots()
            .await?
            .into_iter()
            .map(|lot| (lot.id.clone(), lot.label()))
            .collect())
    }
}

fn status_label(status: LineStatus) -> &'static str {
    match status {
        LineStatus::Paid => "paid",
        LineStatus::Partial => "partial",
        LineStatus::Unpaid => "unpaid",
    }
}
