use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*, sea_query::Expr,
};

use crate::{
    EngineError, ResultEngine, Warehouse, WarehouseCmd, inventory, products,
    util::{normalize_bounded_text, normalize_required_text},
    warehouses,
};

use super::{Engine, with_tx};

const MAX_NAME_LEN: usize = 100;
const MAX_LOCATION_LEN: usize = 255;

impl Engine {
    /// Warehouses ordered by id. Deleted ones only when `include_deleted`.
    pub async fn warehouses(&self, include_deleted: bool) -> ResultEngine<Vec<Warehouse>> {
        let mut query = warehouses::Entity::find().order_by_asc(warehouses::Column::Id);
        if !include_deleted {
            query = query.filter(warehouses::Column::DeletedAt.is_null());
        }
        let models = query.all(&self.database).await?;
        Ok(models.into_iter().map(Warehouse::from).collect())
    }

    /// Return a warehouse snapshot, deleted or not.
    pub async fn warehouse(&self, warehouse_id: i32) -> ResultEngine<Warehouse> {
        warehouses::Entity::find_by_id(warehouse_id)
            .one(&self.database)
            .await?
            .map(Warehouse::from)
            .ok_or_else(|| EngineError::KeyNotFound("warehouse not exists".to_string()))
    }

    /// Add a warehouse. Names are unique among live warehouses, regardless of case.
    pub async fn new_warehouse(&self, cmd: WarehouseCmd) -> ResultEngine<Warehouse> {
        let (name, location) = normalize_warehouse(&cmd)?;
        with_tx!(self, |db_tx| {
            if warehouse_name_taken(&db_tx, &name, None).await? {
                return Err(EngineError::ExistingKey(name));
            }

            let model = warehouses::ActiveModel {
                id: ActiveValue::NotSet,
                name: ActiveValue::Set(name),
                location: ActiveValue::Set(location),
                created_at: ActiveValue::Set(Utc::now()),
                deleted_at: ActiveValue::Set(None),
            }
            .insert(&db_tx)
            .await?;

            tracing::info!("warehouse {} created", model.name);
            Ok(Warehouse::from(model))
        })
    }

    pub async fn update_warehouse(
        &self,
        warehouse_id: i32,
        cmd: WarehouseCmd,
    ) -> ResultEngine<Warehouse> {
        let (name, location) = normalize_warehouse(&cmd)?;
        with_tx!(self, |db_tx| {
            require_live_warehouse(&db_tx, warehouse_id).await?;
            if warehouse_name_taken(&db_tx, &name, Some(warehouse_id)).await? {
                return Err(EngineError::ExistingKey(name));
            }

            let model = warehouses::ActiveModel {
                id: ActiveValue::Unchanged(warehouse_id),
                name: ActiveValue::Set(name),
                location: ActiveValue::Set(location),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(Warehouse::from(model))
        })
    }

    /// Mark a warehouse deleted.
    ///
    /// Refused with `InUse` while a live product still has stock in it.
    pub async fn delete_warehouse(&self, warehouse_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let warehouse = require_live_warehouse(&db_tx, warehouse_id).await?;

            let stocked = inventory::Entity::find()
                .inner_join(products::Entity)
                .filter(inventory::Column::WarehouseId.eq(warehouse_id))
                .filter(inventory::Column::Quantity.gt(0))
                .filter(products::Column::DeletedAt.is_null())
                .one(&db_tx)
                .await?
                .is_some();
            if stocked {
                tracing::warn!("warehouse {} not deleted: still holds stock", warehouse.name);
                return Err(EngineError::InUse(warehouse.name));
            }

            warehouses::ActiveModel {
                id: ActiveValue::Unchanged(warehouse_id),
                deleted_at: ActiveValue::Set(Some(Utc::now())),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            tracing::info!("warehouse {} deleted", warehouse.name);
            Ok(())
        })
    }
}

fn normalize_warehouse(cmd: &WarehouseCmd) -> ResultEngine<(String, Option<String>)> {
    let name = normalize_required_text(&cmd.name, "warehouse name", MAX_NAME_LEN)?;
    let location = normalize_bounded_text(cmd.location.as_deref(), "location", MAX_LOCATION_LEN)?;
    Ok((name, location))
}

async fn require_live_warehouse<C: ConnectionTrait>(
    db: &C,
    warehouse_id: i32,
) -> ResultEngine<warehouses::Model> {
    warehouses::Entity::find_by_id(warehouse_id)
        .one(db)
        .await?
        .filter(warehouses::Model::is_active)
        .ok_or_else(|| EngineError::KeyNotFound("warehouse not exists".to_string()))
}

async fn warehouse_name_taken<C: ConnectionTrait>(
    db: &C,
    name: &str,
    except: Option<i32>,
) -> ResultEngine<bool> {
    let mut query = warehouses::Entity::find()
        .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
        .filter(warehouses::Column::DeletedAt.is_null());
    if let Some(warehouse_id) = except {
        query = query.filter(warehouses::Column::Id.ne(warehouse_id));
    }
    Ok(query.one(db).await?.is_some())
}
