//! The module contains the representation of a cash flow entry.
//!
//! A cash flow entry is a dated movement of money. Amounts are stored as
//! signed integer cents (`i64`): positive values are inflows, negative values
//! are outflows.

use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowEntry {
    pub id: i32,
    pub date: NaiveDate,
    pub description: String,
    pub amount_minor: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "cash_flows")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub date: Date,
    pub description: String,
    pub amount_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for CashFlowEntry {
    fn from(value: Model) -> Self {
        Self {
            id: value.id,
            date: value.date,
            description: value.description,
            amount_minor: value.amount_minor,
        }
    }
}
