use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::Row;

use super::{format_timestamp, parse_timestamp};
use crate::storage::connection::DbConnection;

/// A single recorded admin key check
#[derive(Debug, Clone, PartialEq)]
pub struct AdminAccessAttempt {
    pub id: i64,
    pub success: bool,
    pub attempted_at: DateTime<Utc>,
}

/// Repository for admin access attempts
#[derive(Clone)]
pub struct AdminAccessRepository {
    db: DbConnection,
}

impl AdminAccessRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Record an attempt and return its row id
    pub async fn record_attempt(&self, success: bool) -> Result<i64> {
        let result = sqlx::query("INSERT INTO admin_access_attempts (success, attempted_at) VALUES (?, ?)")
            .bind(success)
            .bind(format_timestamp(Utc::now()))
            .execute(self.db.pool())
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// Most recent attempts first
    pub async fn list_attempts(&self, limit: Option<u32>) -> Result<Vec<AdminAccessAttempt>> {
        let rows = sqlx::query(
            "SELECT id, success, attempted_at FROM admin_access_attempts ORDER BY id DESC LIMIT ?",
        )
        .bind(limit.map(i64::from).unwrap_or(-1))
        .fetch_all(self.db.pool())
        .await?;

        rows.iter()
            .map(|row| {
                Ok(AdminAccessAttempt {
                    id: row.get("id"),
                    success: row.get("success"),
                    attempted_at: parse_timestamp(row.get("attempted_at"))?,
                })
            })
            .collect()
    }
}
