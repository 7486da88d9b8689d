use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row};

use super::{format_timestamp, parse_timestamp};
use crate::domain::models::lot::{Lot, LotStatus, MapGeometry};
use crate::storage::connection::DbConnection;

const LOT_COLUMNS: &str =
    "id, block, lot_number, area_sqm, status, map_x, map_y, map_width, map_height, created_at, updated_at";

/// Repository for lot operations
#[derive(Clone)]
pub struct LotRepository {
    db: DbConnection,
}

impl LotRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Result<Lot> {
        Ok(Lot {
            id: row.get("id"),
            block: row.get("block"),
            lot_number: row.get("lot_number"),
            area_sqm: row.get("area_sqm"),
            status: LotStatus::parse(row.get::<&str, _>("status"))?,
            geometry: MapGeometry {
                x: row.get("map_x"),
                y: row.get("map_y"),
                width: row.get("map_width"),
                height: row.get("map_height"),
            },
            created_at: parse_timestamp(row.get("created_at"))?,
            updated_at: parse_timestamp(row.get("updated_at"))?,
        })
    }

    /// Store a lot in the database
    pub async fn store_lot(&self, lot: &Lot) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO lots (id, block, lot_number, area_sqm, status, map_x, map_y, map_width, map_height, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&lot.id)
        .bind(&lot.block)
        .bind(&lot.lot_number)
        .bind(lot.area_sqm)
        .bind(lot.status.as_str())
        .bind(lot.geometry.x)
        .bind(lot.geometry.y)
        .bind(lot.geometry.width)
        .bind(lot.geometry.height)
        .bind(format_timestamp(lot.created_at))
        .bind(format_timestamp(lot.updated_at))
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Get a lot by ID
    pub async fn get_lot(&self, lot_id: &str) -> Result<Option<Lot>> {
        let row = sqlx::query(&format!("SELECT {} FROM lots WHERE id = ?", LOT_COLUMNS))
            .bind(lot_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    /// List all lots ordered by block then lot number
    pub async fn list_lots(&self) -> Result<Vec<Lot>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM lots ORDER BY block ASC, lot_number ASC",
            LOT_COLUMNS
        ))
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::map_row).collect()
    }

    /// Update every mutable column of a lot
    pub async fn update_lot(&self, lot: &Lot) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE lots
            SET area_sqm = ?, status = ?, map_x = ?, map_y = ?, map_width = ?, map_height = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(lot.area_sqm)
        .bind(lot.status.as_str())
        .bind(lot.geometry.x)
        .bind(lot.geometry.y)
        .bind(lot.geometry.width)
        .bind(lot.geometry.height)
        .bind(format_timestamp(lot.updated_at))
        .bind(&lot.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn update_status(&self, lot_id: &str, status: LotStatus, updated_at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE lots SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(format_timestamp(updated_at))
            .bind(lot_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    /// Delete a lot; returns false when no row matched
    pub async fn delete_lot(&self, lot_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM lots WHERE id = ?")
            .bind(lot_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
