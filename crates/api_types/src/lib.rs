use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Body returned by create endpoints that only hand back the new id.
#[derive(Debug, Serialize, Deserialize)]
pub struct Created {
    pub id: i32,
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginRequest {
        pub username: String,
        pub password: String,
    }

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct LoginResponse {
        pub id: i32,
        pub username: String,
        pub role: String,
        pub is_admin: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserRole {
        pub role: String,
        pub is_admin: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub username: String,
        pub password: String,
        pub email: String,
        /// `0` or missing selects the default role.
        #[serde(default)]
        pub role_id: i32,
        #[serde(default)]
        pub is_admin: bool,
    }

    /// Full replacement of a user's profile. A missing password keeps the current one.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserUpdate {
        pub username: String,
        pub password: Option<String>,
        pub email: Option<String>,
        #[serde(default)]
        pub role_id: i32,
        #[serde(default)]
        pub is_admin: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct User {
        pub id: i32,
        pub username: String,
        pub email: Option<String>,
        pub role_id: i32,
        pub role_name: Option<String>,
        pub is_admin: bool,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RehashPassword {
        pub username: String,
        pub password: String,
    }

    /// A secondary role held by a user.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RoleAssignment {
        pub id: i32,
        pub user_id: i32,
        pub username: Option<String>,
        pub role_id: i32,
        pub role_name: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RoleAssignmentUpdate {
        pub user_id: i32,
        pub role_id: i32,
    }
}

pub mod role {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RoleUpsert {
        pub name: String,
        pub group: Option<String>,
        #[serde(default)]
        pub is_auto_assigned: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Role {
        pub id: i32,
        pub name: String,
        pub group: String,
        pub is_auto_assigned: bool,
        /// Usernames in the role, primary or assigned.
        pub users: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RoleMember {
        pub user_id: i32,
    }
}

pub mod cash_flow {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CashFlowUpsert {
        /// `YYYY-MM-DD`.
        pub date: String,
        pub description: String,
        /// Signed amount in cents.
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CashFlow {
        pub id: i32,
        pub date: NaiveDate,
        pub description: String,
        pub amount_minor: i64,
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseUpsert {
        pub date: String,
        pub category: String,
        pub description: String,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Expense {
        pub id: i32,
        pub date: NaiveDate,
        pub category: String,
        pub description: String,
        pub amount_minor: i64,
    }
}

pub mod sale {
    use super::*;

    /// A sale line. The total is computed by the server.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SaleUpsert {
        pub date: String,
        pub customer_name: String,
        pub item_sold: String,
        pub quantity: i32,
        pub unit_price_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Sale {
        pub id: i32,
        pub date: NaiveDate,
        pub customer_name: String,
        pub item_sold: String,
        pub quantity: i32,
        pub unit_price_minor: i64,
        pub total_amount_minor: i64,
    }
}

pub mod warehouse {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WarehouseUpsert {
        pub name: String,
        pub location: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Warehouse {
        pub id: i32,
        pub name: String,
        pub location: Option<String>,
        pub created_at: DateTime<Utc>,
        pub deleted_at: Option<DateTime<Utc>>,
    }
}

pub mod product {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProductUpsert {
        pub name: String,
        pub sku: String,
        pub description: Option<String>,
        pub unit_price_minor: i64,
        /// Stock held in `warehouse_id`. Left alone on update when missing.
        pub quantity: Option<i64>,
        pub warehouse_id: Option<i32>,
        pub photo: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Product {
        pub id: i32,
        pub name: String,
        pub sku: String,
        pub description: Option<String>,
        pub unit_price_minor: i64,
        pub warehouse_id: Option<i32>,
        pub photo: Option<String>,
        /// Units on hand across all warehouses.
        pub quantity: i64,
        pub created_at: DateTime<Utc>,
        pub deleted_at: Option<DateTime<Utc>>,
    }
}

pub mod inventory {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum MovementKind {
        In,
        Out,
        Adjust,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MovementNew {
        pub product_id: i32,
        pub warehouse_id: i32,
        pub kind: MovementKind,
        pub quantity: i64,
        pub remarks: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Movement {
        pub id: i32,
        pub product_id: i32,
        pub warehouse_id: i32,
        pub kind: MovementKind,
        /// Signed change applied to stock.
        pub quantity: i64,
        pub remarks: Option<String>,
        pub created_at: DateTime<Utc>,
        pub deleted_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StockLevel {
        pub product_id: i32,
        pub product_name: String,
        pub sku: String,
        pub warehouse_id: i32,
        pub warehouse_name: String,
        pub quantity: i64,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct IncludeDeleted {
        #[serde(default)]
        pub include_deleted: bool,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct StockQuery {
        pub warehouse_id: Option<i32>,
        #[serde(default)]
        pub include_deleted: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LowStockQuery {
        #[serde(default = "default_threshold")]
        pub threshold: i64,
        pub warehouse_id: Option<i32>,
    }

    fn default_threshold() -> i64 {
        10
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct HistoryQuery {
        pub product_id: Option<i32>,
        pub warehouse_id: Option<i32>,
        /// `YYYY-MM-DD`, inclusive.
        pub start_date: Option<String>,
        /// `YYYY-MM-DD`, inclusive.
        pub end_date: Option<String>,
        #[serde(default)]
        pub include_deleted: bool,
    }
}
