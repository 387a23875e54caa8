//! Sale API endpoints

use api_types::sale::{Sale, SaleUpsert};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::SaleCmd;

use crate::{ServerError, server::ServerState};

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Sale>>, ServerError> {
    let sales = state.engine.sales().await?;
    Ok(Json(sales.into_iter().map(map_sale).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Sale>, ServerError> {
    let sale = state.engine.sale(id).await?;
    Ok(Json(map_sale(sale)))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<SaleUpsert>,
) -> Result<(StatusCode, Json<Sale>), ServerError> {
    let sale = state.engine.new_sale(sale_cmd(payload)).await?;
    Ok((StatusCode::CREATED, Json(map_sale(sale))))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<SaleUpsert>,
) -> Result<Json<Sale>, ServerError> {
    let sale = state.engine.update_sale(id, sale_cmd(payload)).await?;
    Ok(Json(map_sale(sale)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_sale(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn sale_cmd(payload: SaleUpsert) -> SaleCmd {
    SaleCmd {
        date: payload.date,
        customer_name: payload.customer_name,
        item_sold: payload.item_sold,
        quantity: payload.quantity,
        unit_price_minor: payload.unit_price_minor,
    }
}

fn map_sale(sale: engine::Sale) -> Sale {
    Sale {
        id: sale.id,
        date: sale.date,
        customer_name: sale.customer_name,
        item_sold: sale.item_sold,
        quantity: sale.quantity,
        unit_price_minor: sale.unit_price_minor,
        total_amount_minor: sale.total_amount_minor,
    }
}
