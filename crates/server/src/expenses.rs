//! Expense API endpoints

use api_types::expense::{Expense, ExpenseUpsert};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::ExpenseCmd;

use crate::{ServerError, server::ServerState};

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Expense>>, ServerError> {
    let expenses = state.engine.expenses().await?;
    Ok(Json(expenses.into_iter().map(map_expense).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Expense>, ServerError> {
    let expense = state.engine.expense(id).await?;
    Ok(Json(map_expense(expense)))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseUpsert>,
) -> Result<(StatusCode, Json<Expense>), ServerError> {
    let expense = state.engine.new_expense(expense_cmd(payload)).await?;
    Ok((StatusCode::CREATED, Json(map_expense(expense))))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<ExpenseUpsert>,
) -> Result<Json<Expense>, ServerError> {
    let expense = state.engine.update_expense(id, expense_cmd(payload)).await?;
    Ok(Json(map_expense(expense)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_expense(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn expense_cmd(payload: ExpenseUpsert) -> ExpenseCmd {
    ExpenseCmd {
        date: payload.date,
        category: payload.category,
        description: payload.description,
        amount_minor: payload.amount_minor,
    }
}

fn map_expense(expense: engine::Expense) -> Expense {
    Expense {
        id: expense.id,
        date: expense.date,
        category: expense.category,
        description: expense.description,
        amount_minor: expense.amount_minor,
    }
}
