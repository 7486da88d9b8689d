use anyhow::Result;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row};

use super::{format_timestamp, parse_time, TIME_FORMAT};
use crate::domain::models::amenity::{Amenity, AmenityKind};
use crate::storage::connection::DbConnection;

const AMENITY_COLUMNS: &str = "id, name, kind, open_time, close_time, hourly_rate_cents, max_hours_per_booking, is_active";

/// Repository for amenity operations
#[derive(Clone)]
pub struct AmenityRepository {
    db: DbConnection,
}

impl AmenityRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Result<Amenity> {
        Ok(Amenity {
            id: row.get("id"),
            name: row.get("name"),
            kind: AmenityKind::parse(row.get::<&str, _>("kind"))?,
            open_time: parse_time(row.get("open_time"))?,
            close_time: parse_time(row.get("close_time"))?,
            hourly_rate_cents: row.get("hourly_rate_cents"),
            max_hours_per_booking: row.get::<i64, _>("max_hours_per_booking") as u32,
            is_active: row.get("is_active"),
        })
    }

    pub async fn store_amenity(&self, amenity: &Amenity) -> Result<()> {
        let now = format_timestamp(Utc::now());
        sqlx::query(
            r#"
            INSERT INTO amenities (id, name, kind, open_time, close_time, hourly_rate_cents, max_hours_per_booking, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&amenity.id)
        .bind(&amenity.name)
        .bind(amenity.kind.as_str())
        .bind(amenity.open_time.format(TIME_FORMAT).to_string())
        .bind(amenity.close_time.format(TIME_FORMAT).to_string())
        .bind(amenity.hourly_rate_cents)
        .bind(amenity.max_hours_per_booking as i64)
        .bind(amenity.is_active)
        .bind(&now)
        .bind(&now)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn get_amenity(&self, amenity_id: &str) -> Result<Option<Amenity>> {
        let row = sqlx::query(&format!("SELECT {} FROM amenities WHERE id = ?", AMENITY_COLUMNS))
            .bind(amenity_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    /// List amenities by name; inactive ones only when asked
    pub async fn list_amenities(&self, include_inactive: bool) -> Result<Vec<Amenity>> {
        let sql = if include_inactive {
            format!("SELECT {} FROM amenities ORDER BY name ASC", AMENITY_COLUMNS)
        } else {
            format!("SELECT {} FROM amenities WHERE is_active = 1 ORDER BY name ASC", AMENITY_COLUMNS)
        };
        let rows = sqlx::query(&sql).fetch_all(self.db.pool()).await?;

        rows.iter().map(Self::map_row).collect()
    }

    pub async fn update_amenity(&self, amenity: &Amenity) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE amenities
            SET name = ?, open_time = ?, close_time = ?, hourly_rate_cents = ?, max_hours_per_booking = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&amenity.name)
        .bind(amenity.open_time.format(TIME_FORMAT).to_string())
        .bind(amenity.close_time.format(TIME_FORMAT).to_string())
        .bind(amenity.hourly_rate_cents)
        .bind(amenity.max_hours_per_booking as i64)
        .bind(amenity.is_active)
        .bind(format_timestamp(Utc::now()))
        .bind(&amenity.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }
}
