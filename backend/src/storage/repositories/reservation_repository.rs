use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{sqlite::SqliteRow, Row};

use super::{format_timestamp, parse_date, parse_time, parse_timestamp, DATE_FORMAT, TIME_FORMAT};
use crate::domain::conflict::{SlotIndex, TimeSlot};
use crate::domain::models::reservation::{Reservation, ReservationStatus};
use crate::storage::connection::DbConnection;

const RESERVATION_COLUMNS: &str = "id, amenity_id, resident_id, date, start_time, end_time, status, fee_cents, hold_expires_at, purpose, created_at, updated_at";

/// Optional filters for listing reservations
#[derive(Debug, Clone, Default)]
pub struct ReservationFilter {
    pub amenity_id: Option<String>,
    pub resident_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub status: Option<ReservationStatus>,
}

/// Repository for reservation operations
#[derive(Clone)]
pub struct ReservationRepository {
    db: DbConnection,
}

impl ReservationRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Result<Reservation> {
        let hold_expires_at: Option<String> = row.get("hold_expires_at");
        Ok(Reservation {
            id: row.get("id"),
            amenity_id: row.get("amenity_id"),
            resident_id: row.get("resident_id"),
            date: parse_date(row.get("date"))?,
            slot: TimeSlot {
                start: parse_time(row.get("start_time"))?,
                end: parse_time(row.get("end_time"))?,
            },
            status: ReservationStatus::parse(row.get::<&str, _>("status"))?,
            fee_cents: row.get("fee_cents"),
            hold_expires_at: hold_expires_at.as_deref().map(parse_timestamp).transpose()?,
            purpose: row.get("purpose"),
            created_at: parse_timestamp(row.get("created_at"))?,
            updated_at: parse_timestamp(row.get("updated_at"))?,
        })
    }

    /// Insert `reservation` unless a blocking reservation overlaps it
    ///
    /// The overlap check and the insert share one database transaction.
    /// Returns the id of the conflicting reservation when the slot is taken.
    pub async fn store_if_free(&self, reservation: &Reservation, now: DateTime<Utc>) -> Result<Option<String>> {
        let mut tx = self.db.pool().begin().await?;

        let rows = sqlx::query(&format!(
            "SELECT {} FROM reservations WHERE amenity_id = ? AND date = ? AND status != ?",
            RESERVATION_COLUMNS
        ))
        .bind(&reservation.amenity_id)
        .bind(reservation.date.format(DATE_FORMAT).to_string())
        .bind(ReservationStatus::Cancelled.as_str())
        .fetch_all(&mut *tx)
        .await?;

        let mut existing = Vec::with_capacity(rows.len());
        for row in &rows {
            existing.push(Self::map_row(row)?);
        }

        let index = SlotIndex::from_slots(
            existing
                .into_iter()
                .filter(|r| r.blocks_slot(now))
                .map(|r| (r.slot, r.id)),
        );

        if let Some((_, conflicting_id)) = index.first_conflict(&reservation.slot) {
            let conflicting_id = conflicting_id.clone();
            tx.rollback().await?;
            return Ok(Some(conflicting_id));
        }

        sqlx::query(
            r#"
            INSERT INTO reservations (id, amenity_id, resident_id, date, start_time, end_time, status, fee_cents, hold_expires_at, purpose, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&reservation.id)
        .bind(&reservation.amenity_id)
        .bind(&reservation.resident_id)
        .bind(reservation.date.format(DATE_FORMAT).to_string())
        .bind(reservation.slot.start.format(TIME_FORMAT).to_string())
        .bind(reservation.slot.end.format(TIME_FORMAT).to_string())
        .bind(reservation.status.as_str())
        .bind(reservation.fee_cents)
        .bind(reservation.hold_expires_at.map(format_timestamp))
        .bind(&reservation.purpose)
        .bind(format_timestamp(reservation.created_at))
        .bind(format_timestamp(reservation.updated_at))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(None)
    }

    pub async fn get_reservation(&self, reservation_id: &str) -> Result<Option<Reservation>> {
        let row = sqlx::query(&format!("SELECT {} FROM reservations WHERE id = ?", RESERVATION_COLUMNS))
            .bind(reservation_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    /// List reservations ordered by date and start time
    pub async fn list_reservations(&self, filter: &ReservationFilter) -> Result<Vec<Reservation>> {
        let mut sql = format!("SELECT {} FROM reservations WHERE 1 = 1", RESERVATION_COLUMNS);
        let mut binds: Vec<String> = Vec::new();

        if let Some(amenity_id) = &filter.amenity_id {
            sql.push_str(" AND amenity_id = ?");
            binds.push(amenity_id.clone());
        }
        if let Some(resident_id) = &filter.resident_id {
            sql.push_str(" AND resident_id = ?");
            binds.push(resident_id.clone());
        }
        if let Some(date) = filter.date {
            sql.push_str(" AND date = ?");
            binds.push(date.format(DATE_FORMAT).to_string());
        }
        if let Some(from) = filter.from_date {
            sql.push_str(" AND date >= ?");
            binds.push(from.format(DATE_FORMAT).to_string());
        }
        if let Some(to) = filter.to_date {
            sql.push_str(" AND date <= ?");
            binds.push(to.format(DATE_FORMAT).to_string());
        }
        if let Some(status) = filter.status {
            sql.push_str(" AND status = ?");
            binds.push(status.as_str().to_string());
        }
        sql.push_str(" ORDER BY date ASC, start_time ASC");

        let mut query = sqlx::query(&sql);
        for value in &binds {
            query = query.bind(value);
        }
        let rows = query.fetch_all(self.db.pool()).await?;

        rows.iter().map(Self::map_row).collect()
    }

    /// Move a live hold to Confirmed; false when it was not Held or had expired
    pub async fn confirm_hold(&self, reservation_id: &str, now: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE reservations
            SET status = ?, hold_expires_at = NULL, updated_at = ?
            WHERE id = ? AND status = ? AND (hold_expires_at IS NULL OR hold_expires_at > ?)
            "#,
        )
        .bind(ReservationStatus::Confirmed.as_str())
        .bind(format_timestamp(now))
        .bind(reservation_id)
        .bind(ReservationStatus::Held.as_str())
        .bind(format_timestamp(now))
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Cancel a reservation that is not already cancelled
    pub async fn cancel(&self, reservation_id: &str, now: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE reservations
            SET status = ?, hold_expires_at = NULL, updated_at = ?
            WHERE id = ? AND status != ?
            "#,
        )
        .bind(ReservationStatus::Cancelled.as_str())
        .bind(format_timestamp(now))
        .bind(reservation_id)
        .bind(ReservationStatus::Cancelled.as_str())
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Cancel every hold whose expiry has passed; returns how many
    pub async fn release_expired_holds(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE reservations
            SET status = ?, hold_expires_at = NULL, updated_at = ?
            WHERE status = ? AND hold_expires_at IS NOT NULL AND hold_expires_at <= ?
            "#,
        )
        .bind(ReservationStatus::Cancelled.as_str())
        .bind(format_timestamp(now))
        .bind(ReservationStatus::Held.as_str())
        .bind(format_timestamp(now))
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected())
    }
}
