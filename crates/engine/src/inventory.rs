//! Stock per product and warehouse, and the movements that change it.
//!
//! The `inventory_stock` table holds one row per (product, warehouse) pair.
//! Every change to a row is recorded in `inventory_movements` with the signed
//! quantity it applied, so stock always equals the sum of the live movements.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Goods received. Quantity must be positive.
    In,
    /// Goods shipped. Quantity must be positive and cannot exceed stock.
    Out,
    /// Stock correction by a signed, non-zero quantity.
    Adjust,
}

impl MovementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
            Self::Adjust => "adjust",
        }
    }

    /// Signed change to stock for a requested `quantity`.
    pub(crate) fn delta(self, quantity: i64) -> ResultEngine<i64> {
        match self {
            Self::In | Self::Out if quantity <= 0 => Err(EngineError::Validation(
                "quantity must be greater than 0".to_string(),
            )),
            Self::In => Ok(quantity),
            Self::Out => Ok(-quantity),
            Self::Adjust if quantity == 0 => Err(EngineError::Validation(
                "adjustment cannot be 0".to_string(),
            )),
            Self::Adjust => Ok(quantity),
        }
    }
}

impl TryFrom<&str> for MovementKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            "adjust" => Ok(Self::Adjust),
            _ => Err(EngineError::Validation(format!(
                "invalid movement kind: {value}"
            ))),
        }
    }
}

/// Stock of one product in one warehouse.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    pub product_id: i32,
    pub product_name: String,
    pub sku: String,
    pub warehouse_id: i32,
    pub warehouse_name: String,
    pub quantity: i64,
}

/// A recorded stock change. `quantity` is signed: what was added to stock.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub id: i32,
    pub product_id: i32,
    pub warehouse_id: i32,
    pub kind: MovementKind,
    pub quantity: i64,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "inventory_stock")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub product_id: i32,
    pub warehouse_id: i32,
    pub quantity: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::products::Entity",
        from = "Column::ProductId",
        to = "super::products::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Products,
    #[sea_orm(
        belongs_to = "super::warehouses::Entity",
        from = "Column::WarehouseId",
        to = "super::warehouses::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Warehouses,
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl Related<super::warehouses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Warehouses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub mod movements {
    //! `inventory_movements` rows.

    use sea_orm::entity::prelude::*;

    use super::{Movement, MovementKind};
    use crate::EngineError;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "inventory_movements")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub product_id: i32,
        pub warehouse_id: i32,
        pub kind: String,
        pub quantity: i64,
        pub remarks: Option<String>,
        pub created_at: DateTimeUtc,
        pub deleted_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl TryFrom<Model> for Movement {
        type Error = EngineError;

        fn try_from(model: Model) -> Result<Self, Self::Error> {
            Ok(Self {
                id: model.id,
                product_id: model.product_id,
                warehouse_id: model.warehouse_id,
                kind: MovementKind::try_from(model.kind.as_str())?,
                quantity: model.quantity,
                remarks: model.remarks,
                created_at: model.created_at,
                deleted_at: model.deleted_at,
            })
        }
    }
}
