//! Command structs for engine operations.
//!
//! These types group parameters for write operations (users, roles, ledger
//! records and inventory), keeping call sites readable and avoiding long argument lists.
//! Dates travel as `YYYY-MM-DD` strings and are parsed by the engine so a bad
//! date is reported like any other validation failure.

use crate::MovementKind;

/// Create a user.
#[derive(Clone, Debug)]
pub struct NewUserCmd {
    pub username: String,
    pub password: String,
    pub email: String,
    /// `0` selects the default role (id 1).
    pub role_id: i32,
    pub is_admin: bool,
}

impl NewUserCmd {
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            email: email.into(),
            role_id: 0,
            is_admin: false,
        }
    }

    #[must_use]
    pub fn role_id(mut self, role_id: i32) -> Self {
        self.role_id = role_id;
        self
    }

    #[must_use]
    pub fn admin(mut self, is_admin: bool) -> Self {
        self.is_admin = is_admin;
        self
    }
}

/// Replace a user's profile.
///
/// A missing `password` keeps the stored hash.
#[derive(Clone, Debug)]
pub struct UpdateUserCmd {
    pub username: String,
    pub password: Option<String>,
    pub email: Option<String>,
    pub role_id: i32,
    pub is_admin: bool,
}

/// Create or rename a role.
#[derive(Clone, Debug)]
pub struct RoleCmd {
    pub name: String,
    pub group: Option<String>,
    pub is_auto_assigned: bool,
}

impl RoleCmd {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: None,
            is_auto_assigned: false,
        }
    }

    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    #[must_use]
    pub fn auto_assigned(mut self, value: bool) -> Self {
        self.is_auto_assigned = value;
        self
    }
}

#[derive(Clone, Debug)]
pub struct CashFlowCmd {
    pub date: String,
    pub description: String,
    pub amount_minor: i64,
}

#[derive(Clone, Debug)]
pub struct ExpenseCmd {
    pub date: String,
    pub category: String,
    pub description: String,
    pub amount_minor: i64,
}

#[derive(Clone, Debug)]
pub struct SaleCmd {
    pub date: String,
    pub customer_name: String,
    pub item_sold: String,
    pub quantity: i32,
    pub unit_price_minor: i64,
}

#[derive(Clone, Debug)]
pub struct WarehouseCmd {
    pub name: String,
    pub location: Option<String>,
}

/// Create or replace a product.
///
/// On create a missing `quantity` means no stock. On update it leaves stock
/// alone; a given one sets the stock held in `warehouse_id` (or the product's
/// home warehouse) through an adjustment.
#[derive(Clone, Debug)]
pub struct ProductCmd {
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub unit_price_minor: i64,
    pub quantity: Option<i64>,
    pub warehouse_id: Option<i32>,
    pub photo: Option<String>,
}

impl ProductCmd {
    #[must_use]
    pub fn new(name: impl Into<String>, sku: impl Into<String>, unit_price_minor: i64) -> Self {
        Self {
            name: name.into(),
            sku: sku.into(),
            description: None,
            unit_price_minor,
            quantity: None,
            warehouse_id: None,
            photo: None,
        }
    }

    #[must_use]
    pub fn stock(mut self, warehouse_id: i32, quantity: i64) -> Self {
        self.warehouse_id = Some(warehouse_id);
        self.quantity = Some(quantity);
        self
    }
}

/// Record a stock movement.
#[derive(Clone, Debug)]
pub struct MovementCmd {
    pub product_id: i32,
    pub warehouse_id: i32,
    pub kind: MovementKind,
    pub quantity: i64,
    pub remarks: Option<String>,
}

/// Filters for the movement history. Both dates are inclusive `YYYY-MM-DD`.
#[derive(Clone, Debug, Default)]
pub struct MovementFilter {
    pub product_id: Option<i32>,
    pub warehouse_id: Option<i32>,
    pub from: Option<String>,
    pub to: Option<String>,
    /// If true, includes deleted movements.
    pub include_deleted: bool,
}
