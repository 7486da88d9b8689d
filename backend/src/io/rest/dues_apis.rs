//! # REST API for Dues
//!
//! Statements, balances and the rate schedule are readable by anyone.
//! Recording payments and changing rates is admin-only.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::info;

use super::mappers::DuesMapper;
use super::{ApiResult, PeriodQuery};
use crate::AppState;
use shared::{
    AdvancePaymentRequest, BalanceResponse, DuesRate, DuesRateListResponse, DuesStatement, PaymentResponse,
    RecordPaymentRequest, SetDuesRateRequest,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dues/rates", get(list_rates))
        .route("/dues/:resident_id/statement", get(get_statement))
        .route("/dues/:resident_id/balance", get(get_balance))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/dues/rates", post(set_rate))
        .route("/dues/:resident_id/payments", post(record_payment))
        .route("/dues/:resident_id/advance", post(apply_advance_payment))
}

/// Month-by-month statement through `?year=&month=` (default: this month)
pub async fn get_statement(
    State(state): State<AppState>,
    Path(resident_id): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<Json<DuesStatement>> {
    info!("GET /api/dues/{}/statement - query: {:?}", resident_id, query);
    let through = query.resolve()?;
    let summary = state.dues_service.statement(&resident_id, through).await?;
    Ok(Json(DuesMapper::to_statement_dto(resident_id, summary)))
}

pub async fn get_balance(
    State(state): State<AppState>,
    Path(resident_id): Path<String>,
) -> ApiResult<Json<BalanceResponse>> {
    info!("GET /api/dues/{}/balance", resident_id);
    let (period, summary) = state.dues_service.current_balance(&resident_id).await?;
    Ok(Json(DuesMapper::to_balance_dto(resident_id, period, &summary)))
}

pub async fn record_payment(
    State(state): State<AppState>,
    Path(resident_id): Path<String>,
    Json(request): Json<RecordPaymentRequest>,
) -> ApiResult<(StatusCode, Json<PaymentResponse>)> {
    info!("POST /api/dues/{}/payments - request: {:?}", resident_id, request);
    let command = DuesMapper::to_record_command(resident_id, request)?;
    let result = state.dues_service.record_payment(command).await?;
    let status = if result.applied { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(DuesMapper::to_payment_response(result))))
}

pub async fn apply_advance_payment(
    State(state): State<AppState>,
    Path(resident_id): Path<String>,
    Json(request): Json<AdvancePaymentRequest>,
) -> ApiResult<(StatusCode, Json<PaymentResponse>)> {
    info!("POST /api/dues/{}/advance - request: {:?}", resident_id, request);
    let command = DuesMapper::to_advance_command(resident_id, request)?;
    let result = state.dues_service.apply_advance_payment(command).await?;
    let status = if result.applied { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(DuesMapper::to_payment_response(result))))
}

pub async fn list_rates(State(state): State<AppState>) -> ApiResult<Json<DuesRateListResponse>> {
    info!("GET /api/dues/rates");
    let rates = state.dues_service.list_rates().await?;
    Ok(Json(DuesRateListResponse {
        rates: rates.into_iter().map(DuesMapper::rate_to_dto).collect(),
        default_monthly_cents: state.dues_service.default_monthly_cents(),
    }))
}

pub async fn set_rate(
    State(state): State<AppState>,
    Json(request): Json<SetDuesRateRequest>,
) -> ApiResult<Json<DuesRate>> {
    info!("POST /api/dues/rates - request: {:?}", request);
    let command = DuesMapper::to_set_rate_command(request)?;
    let rate = state.dues_service.set_rate(command).await?;
    Ok(Json(DuesMapper::rate_to_dto(rate)))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{approved_resident, send, setup_test_app};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_statement_carries_balance_forward() {
        let app = setup_test_app().await;
        let id = approved_resident(&app, "ana@example.com", None).await;

        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/api/dues/{}/payments", id),
            Some(json!({ "year": 2025, "month": 1, "amount_cents": 400 })),
            true,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/api/dues/{}/statement?year=2025&month=2", id),
            None,
            false,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let rows = body["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["status"], "Partial");
        assert_eq!(rows[0]["balance_cents"], 600);
        assert_eq!(rows[1]["carried_in_cents"], 600);
        assert_eq!(rows[1]["required_cents"], 1600);
        assert_eq!(body["balance_cents"], 1600);
        assert_eq!(body["total_billed_cents"], 2000);
        assert_eq!(body["total_paid_cents"], 400);
    }

    #[tokio::test]
    async fn test_overpayment_becomes_credit() {
        let app = setup_test_app().await;
        let id = approved_resident(&app, "ana@example.com", None).await;

        send(
            &app,
            Method::POST,
            &format!("/api/dues/{}/payments", id),
            Some(json!({ "year": 2025, "month": 1, "amount_cents": 2500 })),
            true,
        )
        .await;

        let (_, body) = send(
            &app,
            Method::GET,
            &format!("/api/dues/{}/statement?year=2025&month=2", id),
            None,
            false,
        )
        .await;
        let rows = body["rows"].as_array().unwrap();
        assert_eq!(rows[0]["credit_out_cents"], 1500);
        assert_eq!(rows[1]["credit_in_cents"], 1500);
        assert_eq!(rows[1]["status"], "Paid");
        assert_eq!(body["balance_cents"], 0);
        assert_eq!(body["credit_cents"], 500);
    }

    #[tokio::test]
    async fn test_payment_reference_is_idempotent() {
        let app = setup_test_app().await;
        let id = approved_resident(&app, "ana@example.com", None).await;
        let payment = json!({ "year": 2025, "month": 1, "amount_cents": 1000, "reference": "OR-100" });

        let (status, body) = send(&app, Method::POST, &format!("/api/dues/{}/payments", id), Some(payment.clone()), true).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["applied"], true);

        let (status, body) = send(&app, Method::POST, &format!("/api/dues/{}/payments", id), Some(payment), true).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["applied"], false);
        assert_eq!(body["events"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_payment_validation() {
        let app = setup_test_app().await;
        let id = approved_resident(&app, "ana@example.com", None).await;

        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/api/dues/{}/payments", id),
            Some(json!({ "year": 2025, "month": 1, "amount_cents": 0 })),
            true,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/api/dues/{}/payments", id),
            Some(json!({ "year": 2025, "month": 13, "amount_cents": 100 })),
            true,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/api/dues/{}/payments", id),
            Some(json!({ "year": 2024, "month": 12, "amount_cents": 100 })),
            true,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/api/dues/{}/payments", id),
            Some(json!({ "year": 2025, "month": 1, "amount_cents": 100 })),
            false,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_advance_payment_covers_months() {
        let app = setup_test_app().await;
        let id = approved_resident(&app, "ana@example.com", None).await;

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/dues/{}/advance", id),
            Some(json!({ "from_year": 2025, "from_month": 1, "months": 3, "reference": "ADV-1" })),
            true,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let events = body["events"].as_array().unwrap();
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e["kind"] == "Advance" && e["amount_cents"] == 1000));

        let (_, body) = send(
            &app,
            Method::GET,
            &format!("/api/dues/{}/statement?year=2025&month=3", id),
            None,
            false,
        )
        .await;
        assert_eq!(body["balance_cents"], 0);
        assert!(body["rows"].as_array().unwrap().iter().all(|r| r["status"] == "Paid"));
    }

    #[tokio::test]
    async fn test_rate_changes_apply_from_effective_month() {
        let app = setup_test_app().await;
        let id = approved_resident(&app, "ana@example.com", None).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/dues/rates",
            Some(json!({ "effective_year": 2025, "effective_month": 2, "amount_cents": 1500 })),
            true,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["amount_cents"], 1500);

        let (status, body) = send(&app, Method::GET, "/api/dues/rates", None, false).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["default_monthly_cents"], 1000);
        assert_eq!(body["rates"].as_array().unwrap().len(), 1);

        let (_, body) = send(
            &app,
            Method::GET,
            &format!("/api/dues/{}/statement?year=2025&month=2", id),
            None,
            false,
        )
        .await;
        assert_eq!(body["rows"][0]["rate_cents"], 1000);
        assert_eq!(body["rows"][1]["rate_cents"], 1500);
    }

    #[tokio::test]
    async fn test_statement_for_unknown_resident() {
        let app = setup_test_app().await;
        let (status, body) = send(&app, Method::GET, "/api/dues/resident::missing/balance", None, false).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }
}
