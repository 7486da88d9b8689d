use anyhow::Result;
use sqlx::{sqlite::SqliteRow, Row};

use super::{format_timestamp, parse_date, parse_timestamp, DATE_FORMAT};
use crate::domain::models::lot::LotStatus;
use crate::domain::models::resident::{Resident, ResidentStatus};
use crate::storage::connection::DbConnection;

const RESIDENT_COLUMNS: &str = "id, first_name, last_name, email, phone, lot_id, is_household_head, status, move_in_date, created_at, updated_at";

/// Repository for resident operations
#[derive(Clone)]
pub struct ResidentRepository {
    db: DbConnection,
}

impl ResidentRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Result<Resident> {
        Ok(Resident {
            id: row.get("id"),
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            email: row.get("email"),
            phone: row.get("phone"),
            lot_id: row.get("lot_id"),
            is_household_head: row.get("is_household_head"),
            status: ResidentStatus::parse(row.get::<&str, _>("status"))?,
            move_in_date: parse_date(row.get("move_in_date"))?,
            created_at: parse_timestamp(row.get("created_at"))?,
            updated_at: parse_timestamp(row.get("updated_at"))?,
        })
    }

    /// Store a resident in the database
    pub async fn store_resident(&self, resident: &Resident) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO residents (id, first_name, last_name, email, phone, lot_id, is_household_head, status, move_in_date, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&resident.id)
        .bind(&resident.first_name)
        .bind(&resident.last_name)
        .bind(&resident.email)
        .bind(&resident.phone)
        .bind(&resident.lot_id)
        .bind(resident.is_household_head)
        .bind(resident.status.as_str())
        .bind(resident.move_in_date.format(DATE_FORMAT).to_string())
        .bind(format_timestamp(resident.created_at))
        .bind(format_timestamp(resident.updated_at))
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Get a resident by ID
    pub async fn get_resident(&self, resident_id: &str) -> Result<Option<Resident>> {
        let row = sqlx::query(&format!("SELECT {} FROM residents WHERE id = ?", RESIDENT_COLUMNS))
            .bind(resident_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    /// Case-insensitive lookup by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Resident>> {
        let row = sqlx::query(&format!("SELECT {} FROM residents WHERE email = ?", RESIDENT_COLUMNS))
            .bind(email)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    /// List residents ordered by last then first name, optionally by status
    pub async fn list_residents(&self, status: Option<ResidentStatus>) -> Result<Vec<Resident>> {
        let rows = match status {
            Some(status) => {
                sqlx::query(&format!(
                    "SELECT {} FROM residents WHERE status = ? ORDER BY last_name ASC, first_name ASC",
                    RESIDENT_COLUMNS
                ))
                .bind(status.as_str())
                .fetch_all(self.db.pool())
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM residents ORDER BY last_name ASC, first_name ASC",
                    RESIDENT_COLUMNS
                ))
                .fetch_all(self.db.pool())
                .await?
            }
        };

        rows.iter().map(Self::map_row).collect()
    }

    /// Residents assigned to a lot
    pub async fn list_by_lot(&self, lot_id: &str) -> Result<Vec<Resident>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM residents WHERE lot_id = ? ORDER BY created_at ASC",
            RESIDENT_COLUMNS
        ))
        .bind(lot_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::map_row).collect()
    }

    /// Update a resident's contact details and status
    pub async fn update_resident(&self, resident: &Resident) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE residents
            SET first_name = ?, last_name = ?, email = ?, phone = ?, status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&resident.first_name)
        .bind(&resident.last_name)
        .bind(&resident.email)
        .bind(&resident.phone)
        .bind(resident.status.as_str())
        .bind(format_timestamp(resident.updated_at))
        .bind(&resident.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Write an approval and, when given, mark a vacant lot occupied in one transaction
    ///
    /// A second approved household head on the same lot fails the
    /// `idx_residents_lot_head` unique index and nothing is written.
    pub async fn approve_resident(&self, resident: &Resident, occupy_lot: Option<&str>) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;

        sqlx::query("UPDATE residents SET status = ?, updated_at = ? WHERE id = ?")
            .bind(resident.status.as_str())
            .bind(format_timestamp(resident.updated_at))
            .bind(&resident.id)
            .execute(&mut *tx)
            .await?;

        if let Some(lot_id) = occupy_lot {
            sqlx::query("UPDATE lots SET status = ?, updated_at = ? WHERE id = ? AND status = ?")
                .bind(LotStatus::Occupied.as_str())
                .bind(format_timestamp(resident.updated_at))
                .bind(lot_id)
                .bind(LotStatus::Vacant.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn resident(id: &str, last: &str, email: &str, status: ResidentStatus) -> Resident {
        let now = Utc::now();
        Resident {
            id: id.to_string(),
            first_name: "Ana".to_string(),
            last_name: last.to_string(),
            email: email.to_string(),
            phone: "5551234567".to_string(),
            lot_id: None,
            is_household_head: true,
            status,
            move_in_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_store_and_find_by_email_case_insensitive() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let repo = ResidentRepository::new(db);

        let stored = resident("resident::1", "Reyes", "ana@example.com", ResidentStatus::Pending);
        repo.store_resident(&stored).await.unwrap();

        let found = repo.find_by_email("ANA@example.com").await.unwrap().unwrap();
        assert_eq!(found, Resident { created_at: found.created_at, updated_at: found.updated_at, ..stored });
    }

    #[tokio::test]
    async fn test_duplicate_email_is_unique_violation() {
        let db = DbConnection::init_test().await.unwrap();
        let repo = ResidentRepository::new(db);

        repo.store_resident(&resident("resident::1", "A", "x@example.com", ResidentStatus::Pending))
            .await
            .unwrap();
        let err = repo
            .store_resident(&resident("resident::2", "B", "X@EXAMPLE.com", ResidentStatus::Pending))
            .await
            .unwrap_err();
        assert!(crate::storage::connection::is_unique_violation(&err));
    }

    #[tokio::test]
    async fn test_second_approved_head_on_lot_is_rejected_by_index() {
        let db = DbConnection::init_test().await.unwrap();
        sqlx::query(
            "INSERT INTO lots (id, block, lot_number, area_sqm, status, map_x, map_y, map_width, map_height, created_at, updated_at) \
             VALUES ('lot::1', '1', '1', 100.0, 'vacant', 0, 0, 10, 10, 'x', 'x')",
        )
        .execute(db.pool())
        .await
        .unwrap();
        let repo = ResidentRepository::new(db.clone());

        let mut first = resident("resident::1", "A", "a@example.com", ResidentStatus::Pending);
        first.lot_id = Some("lot::1".to_string());
        let mut second = resident("resident::2", "B", "b@example.com", ResidentStatus::Pending);
        second.lot_id = Some("lot::1".to_string());
        repo.store_resident(&first).await.unwrap();
        repo.store_resident(&second).await.unwrap();

        first.status = ResidentStatus::Approved;
        repo.approve_resident(&first, Some("lot::1")).await.unwrap();

        second.status = ResidentStatus::Approved;
        let err = repo.approve_resident(&second, None).await.unwrap_err();
        assert!(crate::storage::connection::is_unique_violation(&err));

        let stored = repo.get_resident("resident::2").await.unwrap().unwrap();
        assert_eq!(stored.status, ResidentStatus::Pending);
        let lot_status: String = sqlx::query("SELECT status FROM lots WHERE id = 'lot::1'")
            .fetch_one(db.pool())
            .await
            .unwrap()
            .get("status");
        assert_eq!(lot_status, "occupied");
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let db = DbConnection::init_test().await.unwrap();
        let repo = ResidentRepository::new(db);

        repo.store_resident(&resident("resident::1", "Zed", "a@example.com", ResidentStatus::Approved))
            .await
            .unwrap();
        repo.store_resident(&resident("resident::2", "Abe", "b@example.com", ResidentStatus::Approved))
            .await
            .unwrap();
        repo.store_resident(&resident("resident::3", "Mid", "c@example.com", ResidentStatus::Pending))
            .await
            .unwrap();

        let approved = repo.list_residents(Some(ResidentStatus::Approved)).await.unwrap();
        let names: Vec<&str> = approved.iter().map(|r| r.last_name.as_str()).collect();
        assert_eq!(names, vec!["Abe", "Zed"]);

        assert_eq!(repo.list_residents(None).await.unwrap().len(), 3);
    }
}
