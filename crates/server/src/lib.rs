use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{router, run, run_with_listener, spawn_with_listener};

mod cash_flow;
mod expenses;
mod inventory;
mod products;
mod roles;
mod sales;
mod server;
mod users;
mod warehouses;

pub mod types {
    pub use api_types::Created;

    pub mod user {
        pub use api_types::user::{
            LoginRequest, LoginResponse, RehashPassword, RoleAssignment, RoleAssignmentUpdate,
            User, UserNew, UserRole, UserUpdate,
        };
    }

    pub mod role {
        pub use api_types::role::{Role, RoleMember, RoleUpsert};
    }

    pub mod cash_flow {
        pub use api_types::cash_flow::{CashFlow, CashFlowUpsert};
    }

    pub mod expense {
        pub use api_types::expense::{Expense, ExpenseUpsert};
    }

    pub mod sale {
        pub use api_types::sale::{Sale, SaleUpsert};
    }

    pub mod warehouse {
        pub use api_types::warehouse::{Warehouse, WarehouseUpsert};
    }

    pub mod product {
        pub use api_types::product::{Product, ProductUpsert};
    }

    pub mod inventory {
        pub use api_types::inventory::{
            HistoryQuery, IncludeDeleted, LowStockQuery, Movement, MovementKind, MovementNew,
            StockLevel, StockQuery,
        };
    }
}

pub enum ServerError {
    Engine(EngineError),
    /// Missing or rejected Basic credentials on a protected route.
    Unauthorized,
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) => StatusCode::BAD_REQUEST,
        EngineError::InvalidCredentials(_) => StatusCode::UNAUTHORIZED,
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) | EngineError::InUse(_) => StatusCode::CONFLICT,
        EngineError::Internal(_) | EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Internal(msg) => {
            tracing::error!("internal error: {msg}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "authentication required".to_string(),
            ),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
