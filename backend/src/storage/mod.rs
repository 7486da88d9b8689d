//! # Storage Module
//!
//! Persistence for the HOA backend: a SQLite database reached through SQLx.
//!
//! ## Key Responsibilities
//!
//! - **Connection Management**: `DbConnection` owns the pool and builds the schema
//! - **Repositories**: one repository per table with plain `sqlx::query` mapping
//! - **Atomic Writes**: multi-row writes (payment batches, reservation check-and-insert)
//!   run inside a single database transaction
//!
//! Domain code talks to repositories directly, except for the dues ledger
//! which goes through the `PaymentLedgerStore` trait.

pub mod connection;
pub mod repositories;
pub mod traits;

pub use connection::DbConnection;
pub use repositories::{
    AdminAccessRepository, AmenityRepository, DuesRepository, LotRepository, ReservationRepository,
    ResidentRepository, VehicleRepository,
};
pub use traits::PaymentLedgerStore;
