//! Stock movement, stock report and transaction history endpoints

use api_types::inventory::{
    HistoryQuery, LowStockQuery, Movement, MovementKind, MovementNew, StockLevel, StockQuery,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{MovementCmd, MovementFilter};

use crate::{ServerError, server::ServerState};

pub async fn record(
    State(state): State<ServerState>,
    Json(payload): Json<MovementNew>,
) -> Result<(StatusCode, Json<Movement>), ServerError> {
    let movement = state
        .engine
        .record_movement(MovementCmd {
            product_id: payload.product_id,
            warehouse_id: payload.warehouse_id,
            kind: engine_kind(payload.kind),
            quantity: payload.quantity,
            remarks: payload.remarks,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(map_movement(movement))))
}

pub async fn status(
    State(state): State<ServerState>,
    Query(params): Query<StockQuery>,
) -> Result<Json<Vec<StockLevel>>, ServerError> {
    let levels = state
        .engine
        .stock_levels(params.warehouse_id, params.include_deleted)
        .await?;
    Ok(Json(levels.into_iter().map(map_stock).collect()))
}

pub async fn low_stock(
    State(state): State<ServerState>,
    Query(params): Query<LowStockQuery>,
) -> Result<Json<Vec<StockLevel>>, ServerError> {
    let levels = state
        .engine
        .low_stock(params.threshold, params.warehouse_id)
        .await?;
    Ok(Json(levels.into_iter().map(map_stock).collect()))
}

pub async fn history(
    State(state): State<ServerState>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<Movement>>, ServerError> {
    let movements = state
        .engine
        .movements(MovementFilter {
            product_id: params.product_id,
            warehouse_id: params.warehouse_id,
            from: params.start_date,
            to: params.end_date,
            include_deleted: params.include_deleted,
        })
        .await?;
    Ok(Json(movements.into_iter().map(map_movement).collect()))
}

/// Soft-delete a movement and revert its effect on stock.
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_movement(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn engine_kind(kind: MovementKind) -> engine::MovementKind {
    match kind {
        MovementKind::In => engine::MovementKind::In,
        MovementKind::Out => engine::MovementKind::Out,
        MovementKind::Adjust => engine::MovementKind::Adjust,
    }
}

fn api_kind(kind: engine::MovementKind) -> MovementKind {
    match kind {
        engine::MovementKind::In => MovementKind::In,
        engine::MovementKind::Out => MovementKind::Out,
        engine::MovementKind::Adjust => MovementKind::Adjust,
    }
}

fn map_movement(movement: engine::Movement) -> Movement {
    Movement {
        id: movement.id,
        product_id: movement.product_id,
        warehouse_id: movement.warehouse_id,
        kind: api_kind(movement.kind),
        quantity: movement.quantity,
        remarks: movement.remarks,
        created_at: movement.created_at,
        deleted_at: movement.deleted_at,
    }
}

fn map_stock(level: engine::StockLevel) -> StockLevel {
    StockLevel {
        product_id: level.product_id,
        product_name: level.product_name,
        sku: level.sku,
        warehouse_id: level.warehouse_id,
        warehouse_name: level.warehouse_name,
        quantity: level.quantity,
    }
}
