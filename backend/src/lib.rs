//! # HOA Backend
//!
//! Contains all non-UI logic for the homeowners' association manager.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer      (REST handlers, DTO mappers, admin gate)
//!     ↓
//! Domain Layer  (services, ledger and conflict engines)
//!     ↓
//! Storage Layer (SQLite repositories)
//! ```
//!
//! `initialize_backend` wires the services into an `AppState` and
//! `create_router` mounts every route under `/api`.

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::Result;
use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::domain::{
    AdminAccessService, AmenityService, DuesService, LotService, ReportService, ReservationService,
    ResidentService, VehicleService,
};
use crate::io::rest::{
    admin_apis, amenity_apis, dues_apis, lot_apis, reservation_apis, resident_apis, vehicle_apis,
};
use crate::storage::DbConnection;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub lot_service: LotService,
    pub resident_service: ResidentService,
    pub dues_service: DuesService,
    pub amenity_service: AmenityService,
    pub reservation_service: ReservationService,
    pub vehicle_service: VehicleService,
    pub admin_access_service: AdminAccessService,
    pub report_service: ReportService,
}

impl AppState {
    /// Build every service over one database connection
    pub fn new(db: DbConnection, config: AppConfig) -> Self {
        let dues_service = DuesService::new(db.clone(), config.dues.default_monthly_cents);

        Self {
            lot_service: LotService::new(db.clone()),
            resident_service: ResidentService::new(db.clone()),
            amenity_service: AmenityService::new(db.clone()),
            reservation_service: ReservationService::new(db.clone(), config.reservations.clone()),
            vehicle_service: VehicleService::new(db.clone(), config.vehicles.max_per_resident),
            admin_access_service: AdminAccessService::new(db.clone(), config.admin.access_key.clone()),
            report_service: ReportService::new(db, dues_service.clone()),
            dues_service,
            config: Arc::new(config),
        }
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: AppConfig) -> Result<AppState> {
    info!("Setting up database at {}", config.database.url);
    let db = DbConnection::new(&config.database.url).await?;

    info!("Setting up application state");
    Ok(AppState::new(db, config))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router {
    let cors = cors_layer(&app_state.config.server.cors_origin);

    let admin_routes = Router::new()
        .merge(lot_apis::admin_router())
        .merge(resident_apis::admin_router())
        .merge(dues_apis::admin_router())
        .merge(amenity_apis::admin_router())
        .merge(vehicle_apis::admin_router())
        .merge(admin_apis::admin_router())
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            admin_apis::require_admin_key,
        ));

    let api_routes = Router::new()
        .route("/health", get(io::rest::health))
        .merge(lot_apis::router())
        .merge(resident_apis::router())
        .merge(dues_apis::router())
        .merge(amenity_apis::router())
        .merge(reservation_apis::router())
        .merge(vehicle_apis::router())
        .merge(admin_apis::router())
        .merge(admin_routes);

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    if origin == "*" {
        return cors.allow_origin(Any);
    }
    match origin.parse::<HeaderValue>() {
        Ok(value) => cors.allow_origin(value),
        Err(e) => {
            warn!("Ignoring invalid CORS origin {:?}: {}", origin, e);
            cors
        }
    }
}
