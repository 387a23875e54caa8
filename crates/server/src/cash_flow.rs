//! Cash flow API endpoints

use api_types::cash_flow::{CashFlow, CashFlowUpsert};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{CashFlowCmd, CashFlowEntry};

use crate::{ServerError, server::ServerState};

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<CashFlow>>, ServerError> {
    let entries = state.engine.cash_flows().await?;
    Ok(Json(entries.into_iter().map(map_cash_flow).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<CashFlow>, ServerError> {
    let entry = state.engine.cash_flow(id).await?;
    Ok(Json(map_cash_flow(entry)))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CashFlowUpsert>,
) -> Result<(StatusCode, Json<CashFlow>), ServerError> {
    let entry = state.engine.new_cash_flow(cash_flow_cmd(payload)).await?;
    Ok((StatusCode::CREATED, Json(map_cash_flow(entry))))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<CashFlowUpsert>,
) -> Result<Json<CashFlow>, ServerError> {
    let entry = state
        .engine
        .update_cash_flow(id, cash_flow_cmd(payload))
        .await?;
    Ok(Json(map_cash_flow(entry)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_cash_flow(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn cash_flow_cmd(payload: CashFlowUpsert) -> CashFlowCmd {
    CashFlowCmd {
        date: payload.date,
        description: payload.description,
        amount_minor: payload.amount_minor,
    }
}

fn map_cash_flow(entry: CashFlowEntry) -> CashFlow {
    CashFlow {
        id: entry.id,
        date: entry.date,
        description: entry.description,
        amount_minor: entry.amount_minor,
    }
}
