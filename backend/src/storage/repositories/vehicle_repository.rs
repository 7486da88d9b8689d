use anyhow::Result;
use sqlx::{sqlite::SqliteRow, Row};

use super::{format_timestamp, parse_timestamp};
use crate::domain::models::vehicle::{Vehicle, VehicleStatus};
use crate::storage::connection::DbConnection;

const VEHICLE_COLUMNS: &str =
    "id, resident_id, plate_number, make, model, color, sticker_number, status, created_at, updated_at";

/// Repository for vehicle operations
#[derive(Clone)]
pub struct VehicleRepository {
    db: DbConnection,
}

impl VehicleRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Result<Vehicle> {
        Ok(Vehicle {
            id: row.get("id"),
            resident_id: row.get("resident_id"),
            plate_number: row.get("plate_number"),
            make: row.get("make"),
            model: row.get("model"),
            color: row.get("color"),
            sticker_number: row.get("sticker_number"),
            status: VehicleStatus::parse(row.get::<&str, _>("status"))?,
            created_at: parse_timestamp(row.get("created_at"))?,
            updated_at: parse_timestamp(row.get("updated_at"))?,
        })
    }

    pub async fn store_vehicle(&self, vehicle: &Vehicle) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO vehicles (id, resident_id, plate_number, make, model, color, sticker_number, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&vehicle.id)
        .bind(&vehicle.resident_id)
        .bind(&vehicle.plate_number)
        .bind(&vehicle.make)
        .bind(&vehicle.model)
        .bind(&vehicle.color)
        .bind(&vehicle.sticker_number)
        .bind(vehicle.status.as_str())
        .bind(format_timestamp(vehicle.created_at))
        .bind(format_timestamp(vehicle.updated_at))
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn get_vehicle(&self, vehicle_id: &str) -> Result<Option<Vehicle>> {
        let row = sqlx::query(&format!("SELECT {} FROM vehicles WHERE id = ?", VEHICLE_COLUMNS))
            .bind(vehicle_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    /// Lookup by already-normalised plate
    pub async fn find_by_plate(&self, plate_number: &str) -> Result<Option<Vehicle>> {
        let row = sqlx::query(&format!("SELECT {} FROM vehicles WHERE plate_number = ?", VEHICLE_COLUMNS))
            .bind(plate_number)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    pub async fn list_vehicles(&self, resident_id: Option<&str>) -> Result<Vec<Vehicle>> {
        let rows = match resident_id {
            Some(resident_id) => {
                sqlx::query(&format!(
                    "SELECT {} FROM vehicles WHERE resident_id = ? ORDER BY created_at ASC",
                    VEHICLE_COLUMNS
                ))
                .bind(resident_id)
                .fetch_all(self.db.pool())
                .await?
            }
            None => {
                sqlx::query(&format!("SELECT {} FROM vehicles ORDER BY plate_number ASC", VEHICLE_COLUMNS))
                    .fetch_all(self.db.pool())
                    .await?
            }
        };

        rows.iter().map(Self::map_row).collect()
    }

    /// Number of stickers already issued with the `HOA-<year>-` prefix
    pub async fn count_stickers_for_year(&self, year: i32) -> Result<u32> {
        let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM vehicles WHERE sticker_number LIKE ?")
            .bind(format!("HOA-{}-%", year))
            .fetch_one(self.db.pool())
            .await?
            .get("n");
        Ok(count as u32)
    }

    pub async fn update_status(&self, vehicle: &Vehicle) -> Result<()> {
        sqlx::query("UPDATE vehicles SET status = ?, sticker_number = ?, updated_at = ? WHERE id = ?")
            .bind(vehicle.status.as_str())
            .bind(&vehicle.sticker_number)
            .bind(format_timestamp(vehicle.updated_at))
            .bind(&vehicle.id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }
}
