//! Product API endpoints

use api_types::{
    inventory::IncludeDeleted,
    product::{Product, ProductUpsert},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::ProductCmd;

use crate::{ServerError, server::ServerState};

pub async fn list(
    State(state): State<ServerState>,
    Query(params): Query<IncludeDeleted>,
) -> Result<Json<Vec<Product>>, ServerError> {
    let products = state.engine.products(params.include_deleted).await?;
    Ok(Json(products.into_iter().map(map_product).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Product>, ServerError> {
    let product = state.engine.product(id).await?;
    Ok(Json(map_product(product)))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductUpsert>,
) -> Result<(StatusCode, Json<Product>), ServerError> {
    let product = state.engine.new_product(product_cmd(payload)).await?;
    Ok((StatusCode::CREATED, Json(map_product(product))))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<ProductUpsert>,
) -> Result<Json<Product>, ServerError> {
    let product = state.engine.update_product(id, product_cmd(payload)).await?;
    Ok(Json(map_product(product)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn product_cmd(payload: ProductUpsert) -> ProductCmd {
    ProductCmd {
        name: payload.name,
        sku: payload.sku,
        description: payload.description,
        unit_price_minor: payload.unit_price_minor,
        quantity: payload.quantity,
        warehouse_id: payload.warehouse_id,
        photo: payload.photo,
    }
}

fn map_product(product: engine::Product) -> Product {
    Product {
        id: product.id,
        name: product.name,
        sku: product.sku,
        description: product.description,
        unit_price_minor: product.unit_price_minor,
        warehouse_id: product.warehouse_id,
        photo: product.photo,
        quantity: product.quantity,
        created_at: product.created_at,
        deleted_at: product.deleted_at,
    }
}
