//! Sales records.
//!
//! `total_amount_minor` is derived from quantity and unit price when a sale is
//! written; it is stored so listings do not recompute it.

use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: i32,
    pub date: NaiveDate,
    pub customer_name: String,
    pub item_sold: String,
    pub quantity: i32,
    pub unit_price_minor: i64,
    pub total_amount_minor: i64,
}

/// Total of a sale line, rejecting non-positive inputs and overflow.
pub(crate) fn sale_total(quantity: i32, unit_price_minor: i64) -> ResultEngine<i64> {
    if quantity <= 0 {
        return Err(EngineError::Validation(
            "quantity must be greater than 0".to_string(),
        ));
    }
    if unit_price_minor <= 0 {
        return Err(EngineError::Validation(
            "unit price must be greater than 0".to_string(),
        ));
    }
    unit_price_minor
        .checked_mul(i64::from(quantity))
        .ok_or_else(|| EngineError::Validation("sale total is too large".to_string()))
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub date: Date,
    pub customer_name: String,
    pub item_sold: String,
    pub quantity: i32,
    pub unit_price_minor: i64,
    pub total_amount_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Sale {
    fn from(value: Model) -> Self {
        Self {
            id: value.id,
            date: value.date,
            customer_name: value.customer_name,
            item_sold: value.item_sold,
            quantity: value.quantity,
            unit_price_minor: value.unit_price_minor,
            total_amount_minor: value.total_amount_minor,
        }
    }
}
