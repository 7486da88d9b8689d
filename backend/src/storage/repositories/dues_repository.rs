use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row};

use super::{format_timestamp, parse_timestamp};
use crate::domain::ledger::Period;
use crate::domain::models::dues::{DuesRate, PaymentEvent, PaymentKind};
use crate::storage::connection::DbConnection;
use crate::storage::traits::PaymentLedgerStore;

const EVENT_COLUMNS: &str = "id, resident_id, year, month, amount_cents, kind, reference, note, recorded_at";

/// SQLite-backed dues rates and payment events
#[derive(Clone)]
pub struct DuesRepository {
    db: DbConnection,
}

impl DuesRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_event(row: &SqliteRow) -> Result<PaymentEvent> {
        Ok(PaymentEvent {
            id: row.get("id"),
            resident_id: row.get("resident_id"),
            period: Period {
                year: row.get::<i64, _>("year") as i32,
                month: row.get::<i64, _>("month") as u32,
            },
            amount_cents: row.get("amount_cents"),
            kind: PaymentKind::parse(row.get::<&str, _>("kind"))?,
            reference: row.get("reference"),
            note: row.get("note"),
            recorded_at: parse_timestamp(row.get("recorded_at"))?,
        })
    }
}

#[async_trait]
impl PaymentLedgerStore for DuesRepository {
    async fn list_rates(&self) -> Result<Vec<DuesRate>> {
        let rows = sqlx::query(
            r#"
            SELECT id, effective_year, effective_month, amount_cents
            FROM dues_rates
            ORDER BY effective_year ASC, effective_month ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows
            .iter()
            .map(|row| DuesRate {
                id: row.get("id"),
                effective: Period {
                    year: row.get::<i64, _>("effective_year") as i32,
                    month: row.get::<i64, _>("effective_month") as u32,
                },
                amount_cents: row.get("amount_cents"),
            })
            .collect())
    }

    async fn upsert_rate(&self, rate: &DuesRate) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO dues_rates (id, effective_year, effective_month, amount_cents, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (effective_year, effective_month)
            DO UPDATE SET amount_cents = excluded.amount_cents
            "#,
        )
        .bind(&rate.id)
        .bind(rate.effective.year as i64)
        .bind(rate.effective.month as i64)
        .bind(rate.amount_cents)
        .bind(format_timestamp(Utc::now()))
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn list_events(&self, resident_id: &str) -> Result<Vec<PaymentEvent>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM payment_events WHERE resident_id = ? ORDER BY year ASC, month ASC, recorded_at ASC",
            EVENT_COLUMNS
        ))
        .bind(resident_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::map_event).collect()
    }

    async fn find_events_by_reference(&self, resident_id: &str, reference: &str) -> Result<Vec<PaymentEvent>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM payment_events WHERE resident_id = ? AND reference = ? ORDER BY year ASC, month ASC",
            EVENT_COLUMNS
        ))
        .bind(resident_id)
        .bind(reference)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::map_event).collect()
    }

    async fn append_events(&self, events: &[PaymentEvent]) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;

        // Claim each reference once; a reference already claimed fails the primary key
        let mut claimed: Vec<(&str, &str)> = Vec::new();
        for event in events {
            let Some(reference) = event.reference.as_deref() else {
                continue;
            };
            let key = (event.resident_id.as_str(), reference);
            if claimed.contains(&key) {
                continue;
            }
            sqlx::query("INSERT INTO payment_references (resident_id, reference, recorded_at) VALUES (?, ?, ?)")
                .bind(key.0)
                .bind(key.1)
                .bind(format_timestamp(event.recorded_at))
                .execute(&mut *tx)
                .await?;
            claimed.push(key);
        }

        for event in events {
            sqlx::query(
                r#"
                INSERT INTO payment_events (id, resident_id, year, month, amount_cents, kind, reference, note, recorded_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&event.id)
            .bind(&event.resident_id)
            .bind(event.period.year as i64)
            .bind(event.period.month as i64)
            .bind(event.amount_cents)
            .bind(event.kind.as_str())
            .bind(&event.reference)
            .bind(&event.note)
            .bind(format_timestamp(event.recorded_at))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_events_for_period(&self, period: Period) -> Result<Vec<PaymentEvent>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM payment_events WHERE year = ? AND month = ? ORDER BY recorded_at ASC",
            EVENT_COLUMNS
        ))
        .bind(period.year as i64)
        .bind(period.month as i64)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::map_event).collect()
    }

    async fn list_events_for_year(&self, year: i32) -> Result<Vec<PaymentEvent>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM payment_events WHERE year = ? ORDER BY month ASC, recorded_at ASC",
            EVENT_COLUMNS
        ))
        .bind(year as i64)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::map_event).collect()
    }
}
