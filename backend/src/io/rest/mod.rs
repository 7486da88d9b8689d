//! # REST API Interface Layer
//!
//! Every resource module exposes `router()` for its public routes and,
//! where it has any, `admin_router()` for routes that sit behind
//! `admin_apis::require_admin_key`. `crate::create_router` nests both
//! under `/api`.

pub mod admin_apis;
pub mod amenity_apis;
pub mod dues_apis;
pub mod lot_apis;
pub mod mappers;
pub mod reservation_apis;
pub mod resident_apis;
pub mod vehicle_apis;

#[cfg(test)]
pub(crate) mod test_support;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{error, warn};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::ledger::Period;
use shared::ErrorResponse;

/// A `DomainError` on its way out as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.code().to_string();
        let (status, message) = match self.0 {
            DomainError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            DomainError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            DomainError::Conflict(message) => (StatusCode::CONFLICT, message),
            DomainError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            DomainError::Storage(e) => {
                error!("Storage failure: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        if status.is_client_error() {
            warn!("Request rejected ({}): {}", code, message);
        }

        (status, Json(ErrorResponse { error: message, code })).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// `?year=&month=` query; both omitted means the current month
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl PeriodQuery {
    pub fn resolve(&self) -> DomainResult<Period> {
        match (self.year, self.month) {
            (Some(year), Some(month)) => Period::new(year, month),
            (None, None) => Ok(Period::from_date(Utc::now().date_naive())),
            _ => Err(DomainError::validation("Provide both year and month, or neither")),
        }
    }
}

/// Liveness check
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
