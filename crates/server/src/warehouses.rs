//! Warehouse API endpoints

use api_types::{
    inventory::IncludeDeleted,
    warehouse::{Warehouse, WarehouseUpsert},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::WarehouseCmd;

use crate::{ServerError, server::ServerState};

pub async fn list(
    State(state): State<ServerState>,
    Query(params): Query<IncludeDeleted>,
) -> Result<Json<Vec<Warehouse>>, ServerError> {
    let warehouses = state.engine.warehouses(params.include_deleted).await?;
    Ok(Json(warehouses.into_iter().map(map_warehouse).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Warehouse>, ServerError> {
    let warehouse = state.engine.warehouse(id).await?;
    Ok(Json(map_warehouse(warehouse)))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<WarehouseUpsert>,
) -> Result<(StatusCode, Json<Warehouse>), ServerError> {
    let warehouse = state.engine.new_warehouse(warehouse_cmd(payload)).await?;
    Ok((StatusCode::CREATED, Json(map_warehouse(warehouse))))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<WarehouseUpsert>,
) -> Result<Json<Warehouse>, ServerError> {
    let warehouse = state
        .engine
        .update_warehouse(id, warehouse_cmd(payload))
        .await?;
    Ok(Json(map_warehouse(warehouse)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_warehouse(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn warehouse_cmd(payload: WarehouseUpsert) -> WarehouseCmd {
    WarehouseCmd {
        name: payload.name,
        location: payload.location,
    }
}

fn map_warehouse(warehouse: engine::Warehouse) -> Warehouse {
    Warehouse {
        id: warehouse.id,
        name: warehouse.name,
        location: warehouse.location,
        created_at: warehouse.created_at,
        deleted_at: warehouse.deleted_at,
    }
}
