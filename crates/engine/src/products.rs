//! Product catalogue.
//!
//! `warehouse_id` is the product's home warehouse, used when stock is set
//! without naming one. The on-hand quantity is not stored here: it is the sum
//! of the product's rows in the stock table.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub unit_price_minor: i64,
    pub warehouse_id: Option<i32>,
    pub photo: Option<String>,
    /// Units on hand across every warehouse.
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Product {
    pub(crate) fn from_model(model: Model, quantity: i64) -> Self {
        Self {
            id: model.id,
            name: model.name,
            sku: model.sku,
            description: model.description,
            unit_price_minor: model.unit_price_minor,
            warehouse_id: model.warehouse_id,
            photo: model.photo,
            quantity,
            created_at: model.created_at,
            deleted_at: model.deleted_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub sku: String,
    pub description: Option<String>,
    pub unit_price_minor: i64,
    pub warehouse_id: Option<i32>,
    pub photo: Option<String>,
    pub created_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

impl Model {
    pub(crate) fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::warehouses::Entity",
        from = "Column::WarehouseId",
        to = "super::warehouses::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Warehouses,
    #[sea_orm(has_many = "super::inventory::Entity")]
    Stock,
}

impl Related<super::warehouses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Warehouses.def()
    }
}

impl Related<super::inventory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stock.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
