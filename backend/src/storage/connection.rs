use anyhow::Result;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::sync::Arc;

/// DbConnection manages the SQLite pool and schema
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection
    pub async fn new(url: &str) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?
        }

        let pool = SqlitePool::connect(url).await?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Initialize a test database with a unique name
    pub async fn init_test() -> Result<Self> {
        let test_id = uuid::Uuid::new_v4().simple().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS lots (
                id TEXT PRIMARY KEY,
                block TEXT NOT NULL,
                lot_number TEXT NOT NULL,
                area_sqm REAL NOT NULL,
                status TEXT NOT NULL,
                map_x REAL NOT NULL,
                map_y REAL NOT NULL,
                map_width REAL NOT NULL,
                map_height REAL NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (block, lot_number)
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS residents (
                id TEXT PRIMARY KEY,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                phone TEXT NOT NULL,
                lot_id TEXT,
                is_household_head INTEGER NOT NULL,
                status TEXT NOT NULL,
                move_in_date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (lot_id) REFERENCES lots (id)
            );
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS idx_residents_lot ON residents(lot_id);
            "#,
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_residents_lot_head
            ON residents(lot_id)
            WHERE lot_id IS NOT NULL AND is_household_head = 1 AND status = 'approved';
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS dues_rates (
                id TEXT PRIMARY KEY,
                effective_year INTEGER NOT NULL,
                effective_month INTEGER NOT NULL,
                amount_cents INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE (effective_year, effective_month)
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS payment_events (
                id TEXT PRIMARY KEY,
                resident_id TEXT NOT NULL,
                year INTEGER NOT NULL,
                month INTEGER NOT NULL,
                amount_cents INTEGER NOT NULL CHECK (amount_cents > 0),
                kind TEXT NOT NULL,
                reference TEXT,
                note TEXT,
                recorded_at TEXT NOT NULL,
                FOREIGN KEY (resident_id) REFERENCES residents (id)
            );
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS idx_payment_events_resident_period
            ON payment_events(resident_id, year, month);
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS payment_references (
                resident_id TEXT NOT NULL,
                reference TEXT NOT NULL,
                recorded_at TEXT NOT NULL,
                PRIMARY KEY (resident_id, reference),
                FOREIGN KEY (resident_id) REFERENCES residents (id)
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS amenities (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE COLLATE NOCASE,
                kind TEXT NOT NULL,
                open_time TEXT NOT NULL,
                close_time TEXT NOT NULL,
                hourly_rate_cents INTEGER NOT NULL,
                max_hours_per_booking INTEGER NOT NULL,
                is_active INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS reservations (
                id TEXT PRIMARY KEY,
                amenity_id TEXT NOT NULL,
                resident_id TEXT NOT NULL,
                date TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                status TEXT NOT NULL,
                fee_cents INTEGER NOT NULL,
                hold_expires_at TEXT,
                purpose TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (amenity_id) REFERENCES amenities (id),
                FOREIGN KEY (resident_id) REFERENCES residents (id)
            );
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS idx_reservations_amenity_date
            ON reservations(amenity_id, date);
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS vehicles (
                id TEXT PRIMARY KEY,
                resident_id TEXT NOT NULL,
                plate_number TEXT NOT NULL UNIQUE,
                make TEXT NOT NULL,
                model TEXT NOT NULL,
                color TEXT NOT NULL,
                sticker_number TEXT UNIQUE,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (resident_id) REFERENCES residents (id)
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS admin_access_attempts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                success INTEGER NOT NULL,
                attempted_at TEXT NOT NULL
            );
            "#,
        ];

        for statement in statements {
            sqlx::query(statement).execute(pool).await?;
        }

        Ok(())
    }
}

/// True when the error is a UNIQUE constraint violation
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
        _ => false,
    }
}
