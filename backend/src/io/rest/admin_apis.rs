//! # REST API for Admin Access and Reports
//!
//! `POST /admin/verify` is public so a client can check a key before
//! storing it. Every other route here, and every route in the other
//! modules' `admin_router()`, passes through [`require_admin_key`].

use axum::{
    extract::{Query, Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, warn};

use super::{ApiError, ApiResult, PeriodQuery};
use crate::domain::error::DomainError;
use crate::AppState;
use chrono::{Datelike, Utc};
use shared::{
    AccessAttemptListResponse, AccessStatsResponse, AdminAccessAttempt, AdminVerifyRequest, AdminVerifyResponse,
    CollectionReport, DashboardResponse, DelinquencyReport,
};

pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

pub fn router() -> Router<AppState> {
    Router::new().route("/admin/verify", post(verify_admin_key))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/admin/dashboard", get(get_dashboard))
        .route("/admin/reports/delinquency", get(get_delinquency_report))
        .route("/admin/reports/collections", get(get_collection_report))
        .route("/admin/reports/dues.csv", get(export_dues_csv))
        .route("/admin/access-stats", get(get_access_stats))
        .route("/admin/access-attempts", get(list_access_attempts))
}

/// Middleware rejecting requests without a valid `x-admin-key` header
pub async fn require_admin_key(State(state): State<AppState>, request: Request, next: Next) -> Result<Response, ApiError> {
    let key = request
        .headers()
        .get(ADMIN_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let result = state.admin_access_service.verify(&key).await?;
    if !result.success {
        warn!("Admin key rejected for {} {}", request.method(), request.uri().path());
        return Err(DomainError::Unauthorized(result.message).into());
    }

    Ok(next.run(request).await)
}

pub async fn verify_admin_key(
    State(state): State<AppState>,
    Json(request): Json<AdminVerifyRequest>,
) -> ApiResult<Json<AdminVerifyResponse>> {
    info!("POST /api/admin/verify");
    let result = state.admin_access_service.verify(&request.access_key).await?;
    Ok(Json(AdminVerifyResponse {
        success: result.success,
        message: result.message,
    }))
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<Json<DashboardResponse>> {
    info!("GET /api/admin/dashboard - query: {:?}", query);
    let period = query.resolve()?;
    Ok(Json(state.report_service.dashboard(period).await?))
}

pub async fn get_delinquency_report(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<Json<DelinquencyReport>> {
    info!("GET /api/admin/reports/delinquency - query: {:?}", query);
    let period = query.resolve()?;
    Ok(Json(state.report_service.delinquency_report(period).await?))
}

#[derive(Debug, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
}

pub async fn get_collection_report(
    State(state): State<AppState>,
    Query(query): Query<YearQuery>,
) -> ApiResult<Json<CollectionReport>> {
    info!("GET /api/admin/reports/collections - query: {:?}", query);
    let year = query.year.unwrap_or_else(|| Utc::now().year());
    Ok(Json(state.report_service.collection_report(year).await?))
}

/// Dues for one month as a CSV download
pub async fn export_dues_csv(State(state): State<AppState>, Query(query): Query<PeriodQuery>) -> ApiResult<Response> {
    info!("GET /api/admin/reports/dues.csv - query: {:?}", query);
    let period = query.resolve()?;
    let export = state.report_service.export_dues_csv(period).await?;
    info!("Exported {} dues rows to {}", export.row_count, export.filename);

    let disposition = format!("attachment; filename=\"{}\"", export.filename);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.content,
    )
        .into_response())
}

pub async fn get_access_stats(State(state): State<AppState>) -> ApiResult<Json<AccessStatsResponse>> {
    info!("GET /api/admin/access-stats");
    let stats = state.admin_access_service.attempt_stats().await?;
    Ok(Json(AccessStatsResponse {
        total_attempts: stats.total_attempts,
        successful_attempts: stats.successful_attempts,
        failed_attempts: stats.failed_attempts,
        success_rate: stats.success_rate,
    }))
}

#[derive(Debug, Deserialize)]
pub struct AttemptListQuery {
    pub limit: Option<u32>,
}

/// Most recent admin key checks first
pub async fn list_access_attempts(
    State(state): State<AppState>,
    Query(query): Query<AttemptListQuery>,
) -> ApiResult<Json<AccessAttemptListResponse>> {
    info!("GET /api/admin/access-attempts - limit: {:?}", query.limit);
    let attempts = state.admin_access_service.recent_attempts(query.limit).await?;
    Ok(Json(AccessAttemptListResponse {
        attempts: attempts
            .into_iter()
            .map(|a| AdminAccessAttempt {
                id: a.id,
                success: a.success,
                attempted_at: a.attempted_at.to_rfc3339(),
            })
            .collect(),
    }))
}
