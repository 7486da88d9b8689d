//! # REST API for Lots
//!
//! Public lot listing and the lot map; lot maintenance is admin-only.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::info;

use super::mappers::LotMapper;
use super::ApiResult;
use crate::AppState;
use shared::{CreateLotRequest, Lot, LotListResponse, LotMapResponse, LotResponse, UpdateLotRequest};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/lots", get(list_lots))
        .route("/lots/map", get(get_lot_map))
        .route("/lots/:lot_id", get(get_lot))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/lots", axum::routing::post(create_lot))
        .route("/lots/:lot_id", axum::routing::put(update_lot).delete(delete_lot))
}

pub async fn list_lots(State(state): State<AppState>) -> ApiResult<Json<LotListResponse>> {
    info!("GET /api/lots");
    let lots = state.lot_service.list_lots().await?;
    Ok(Json(LotListResponse {
        lots: lots.into_iter().map(LotMapper::to_dto).collect(),
    }))
}

pub async fn get_lot(State(state): State<AppState>, Path(lot_id): Path<String>) -> ApiResult<Json<Lot>> {
    info!("GET /api/lots/{}", lot_id);
    let lot = state.lot_service.get_lot(&lot_id).await?;
    Ok(Json(LotMapper::to_dto(lot)))
}

/// Everything the interactive map needs in one call
pub async fn get_lot_map(State(state): State<AppState>) -> ApiResult<Json<LotMapResponse>> {
    info!("GET /api/lots/map");
    let map = state.lot_service.lot_map().await?;
    Ok(Json(LotMapper::to_map_dto(map)))
}

pub async fn create_lot(
    State(state): State<AppState>,
    Json(request): Json<CreateLotRequest>,
) -> ApiResult<(StatusCode, Json<LotResponse>)> {
    info!("POST /api/lots - request: {:?}", request);
    let lot = state.lot_service.create_lot(LotMapper::to_create_command(request)).await?;
    let success_message = format!("{} created", lot.label());
    Ok((
        StatusCode::CREATED,
        Json(LotResponse {
            lot: LotMapper::to_dto(lot),
            success_message,
        }),
    ))
}

pub async fn update_lot(
    State(state): State<AppState>,
    Path(lot_id): Path<String>,
    Json(request): Json<UpdateLotRequest>,
) -> ApiResult<Json<LotResponse>> {
    info!("PUT /api/lots/{} - request: {:?}", lot_id, request);
    let lot = state
        .lot_service
        .update_lot(&lot_id, LotMapper::to_update_command(request))
        .await?;
    let success_message = format!("{} updated", lot.label());
    Ok(Json(LotResponse {
        lot: LotMapper::to_dto(lot),
        success_message,
    }))
}

pub async fn delete_lot(State(state): State<AppState>, Path(lot_id): Path<String>) -> ApiResult<StatusCode> {
    info!("DELETE /api/lots/{}", lot_id);
    state.lot_service.delete_lot(&lot_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
