//! # Domain Module
//!
//! Business rules of the HOA manager, independent of HTTP and SQL.
//!
//! ## Key Responsibilities
//!
//! - **Lots and residents**: sign-up, approval, one household head per lot,
//!   lot occupancy and the lot map
//! - **Dues**: the carry-forward ledger in `ledger`, payments, advance
//!   payments and rate schedule in `dues_service`
//! - **Reservations**: the half-open slot engine in `conflict`, holds and
//!   confirmations in `reservation_service`
//! - **Vehicles**: plate registration and sticker issuing
//! - **Admin**: key verification and dashboard reports
//!
//! `ledger` and `conflict` are pure: no storage, no clock. Services that
//! depend on the current time take it from `Utc::now()` and expose `*_at`
//! variants that accept it.

pub mod admin_access_service;
pub mod amenity_service;
pub mod commands;
pub mod conflict;
pub mod dues_service;
pub mod error;
pub mod ledger;
pub mod lot_service;
pub mod models;
pub mod report_service;
pub mod reservation_service;
pub mod resident_service;
pub mod validation;
pub mod vehicle_service;

pub use admin_access_service::AdminAccessService;
pub use amenity_service::AmenityService;
pub use dues_service::DuesService;
pub use error::{DomainError, DomainResult};
pub use lot_service::LotService;
pub use report_service::ReportService;
pub use reservation_service::ReservationService;
pub use resident_service::ResidentService;
pub use vehicle_service::VehicleService;
