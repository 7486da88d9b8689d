//! # IO Module
//!
//! The adapter layer between HTTP clients and the domain services.
//!
//! Handlers translate `shared` request DTOs into domain commands through the
//! mappers, call a service held in `AppState`, and map the result (or the
//! `DomainError`) back into JSON.
//!
//! ## Key Responsibilities
//!
//! - **API Endpoints**: axum routers, one module per resource
//! - **Error Translation**: `DomainError` to HTTP status and `{error, code}` body
//! - **Admin Gate**: the `X-Admin-Key` middleware in front of admin routes

pub mod rest;

pub use rest::*;
