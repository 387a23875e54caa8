use std::collections::HashMap;

use chrono::{Days, NaiveDate, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    EngineError, Movement, MovementCmd, MovementFilter, MovementKind, ResultEngine, StockLevel,
    inventory::{self, movements},
    products,
    util::{normalize_bounded_text, parse_date},
    warehouses,
};

use super::{Engine, with_tx};

/// Threshold of the low-stock report when the caller gives none.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

const MAX_REMARKS_LEN: usize = 255;

impl Engine {
    /// Apply a stock movement and record it.
    ///
    /// Product and warehouse must both be live. Stock never goes below zero.
    pub async fn record_movement(&self, cmd: MovementCmd) -> ResultEngine<Movement> {
        let delta = cmd.kind.delta(cmd.quantity)?;
        let remarks = normalize_bounded_text(cmd.remarks.as_deref(), "remarks", MAX_REMARKS_LEN)?;
        with_tx!(self, |db_tx| {
            self.require_active_product(&db_tx, cmd.product_id).await?;
            self.require_active_warehouse(&db_tx, cmd.warehouse_id)
                .await?;

            let stock =
                apply_stock_delta(&db_tx, cmd.product_id, cmd.warehouse_id, delta).await?;
            let model = insert_movement(
                &db_tx,
                cmd.product_id,
                cmd.warehouse_id,
                cmd.kind,
                delta,
                remarks,
            )
            .await?;

            tracing::info!(
                "product {} in warehouse {}: {} {delta}, stock now {stock}",
                cmd.product_id,
                cmd.warehouse_id,
                cmd.kind.as_str()
            );
            Movement::try_from(model)
        })
    }

    /// Stock rows ordered by product then warehouse.
    ///
    /// Rows of deleted products or warehouses are only listed with `include_deleted`.
    pub async fn stock_levels(
        &self,
        warehouse_id: Option<i32>,
        include_deleted: bool,
    ) -> ResultEngine<Vec<StockLevel>> {
        let mut query = inventory::Entity::find()
            .order_by_asc(inventory::Column::ProductId)
            .order_by_asc(inventory::Column::WarehouseId);
        if let Some(warehouse_id) = warehouse_id {
            query = query.filter(inventory::Column::WarehouseId.eq(warehouse_id));
        }
        let rows = query.all(&self.database).await?;
        describe_stock(&self.database, rows, include_deleted).await
    }

    /// Live stock rows holding `threshold` units or fewer.
    pub async fn low_stock(
        &self,
        threshold: i64,
        warehouse_id: Option<i32>,
    ) -> ResultEngine<Vec<StockLevel>> {
        if threshold < 0 {
            return Err(EngineError::Validation(
                "threshold cannot be negative".to_string(),
            ));
        }
        let mut query = inventory::Entity::find()
            .filter(inventory::Column::Quantity.lte(threshold))
            .order_by_asc(inventory::Column::Quantity)
            .order_by_asc(inventory::Column::ProductId);
        if let Some(warehouse_id) = warehouse_id {
            query = query.filter(inventory::Column::WarehouseId.eq(warehouse_id));
        }
        let rows = query.all(&self.database).await?;
        describe_stock(&self.database, rows, false).await
    }

    /// Movement history, most recent first.
    pub async fn movements(&self, filter: MovementFilter) -> ResultEngine<Vec<Movement>> {
        let from = filter.from.as_deref().map(parse_date).transpose()?;
        let to = filter.to.as_deref().map(parse_date).transpose()?;
        if let (Some(from), Some(to)) = (from, to)
            && from > to
        {
            return Err(EngineError::Validation(
                "invalid range: start date must not be after end date".to_string(),
            ));
        }

        let mut query = movements::Entity::find()
            .order_by_desc(movements::Column::CreatedAt)
            .order_by_desc(movements::Column::Id);
        if let Some(product_id) = filter.product_id {
            query = query.filter(movements::Column::ProductId.eq(product_id));
        }
        if let Some(warehouse_id) = filter.warehouse_id {
            query = query.filter(movements::Column::WarehouseId.eq(warehouse_id));
        }
        if let Some(from) = from {
            query = query.filter(movements::Column::CreatedAt.gte(start_of(from)));
        }
        if let Some(to) = to {
            let end = to
                .checked_add_days(Days::new(1))
                .ok_or_else(|| EngineError::Validation("end date out of range".to_string()))?;
            query = query.filter(movements::Column::CreatedAt.lt(start_of(end)));
        }
        if !filter.include_deleted {
            query = query.filter(movements::Column::DeletedAt.is_null());
        }

        let models = query.all(&self.database).await?;
        models.into_iter().map(Movement::try_from).collect()
    }

    /// Mark a movement deleted and take its quantity back out of stock.
    pub async fn delete_movement(&self, movement_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = movements::Entity::find_by_id(movement_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("movement not exists".to_string()))?;
            if model.deleted_at.is_some() {
                return Err(EngineError::Validation(
                    "movement already deleted".to_string(),
                ));
            }

            apply_stock_delta(&db_tx, model.product_id, model.warehouse_id, -model.quantity)
                .await?;
            movements::ActiveModel {
                id: ActiveValue::Unchanged(movement_id),
                deleted_at: ActiveValue::Set(Some(Utc::now())),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            tracing::info!("movement {movement_id} deleted");
            Ok(())
        })
    }
}

fn start_of(date: NaiveDate) -> DateTimeUtc {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Add `delta` to the stock of a product in a warehouse, creating the row if
/// needed, and return the new quantity.
pub(super) async fn apply_stock_delta<C: ConnectionTrait>(
    db: &C,
    product_id: i32,
    warehouse_id: i32,
    delta: i64,
) -> ResultEngine<i64> {
    let row = inventory::Entity::find()
        .filter(inventory::Column::ProductId.eq(product_id))
        .filter(inventory::Column::WarehouseId.eq(warehouse_id))
        .one(db)
        .await?;

    let current = row.as_ref().map_or(0, |row| row.quantity);
    let next = current
        .checked_add(delta)
        .ok_or_else(|| EngineError::Validation("quantity is too large".to_string()))?;
    if next < 0 {
        return Err(EngineError::Validation(format!(
            "insufficient stock: {current} available"
        )));
    }

    match row {
        Some(row) => {
            inventory::ActiveModel {
                id: ActiveValue::Unchanged(row.id),
                quantity: ActiveValue::Set(next),
                ..Default::default()
            }
            .update(db)
            .await?;
        }
        None => {
            inventory::ActiveModel {
                id: ActiveValue::NotSet,
                product_id: ActiveValue::Set(product_id),
                warehouse_id: ActiveValue::Set(warehouse_id),
                quantity: ActiveValue::Set(next),
            }
            .insert(db)
            .await?;
        }
    }
    Ok(next)
}

pub(super) async fn insert_movement<C: ConnectionTrait>(
    db: &C,
    product_id: i32,
    warehouse_id: i32,
    kind: MovementKind,
    delta: i64,
    remarks: Option<String>,
) -> ResultEngine<movements::Model> {
    let model = movements::ActiveModel {
        id: ActiveValue::NotSet,
        product_id: ActiveValue::Set(product_id),
        warehouse_id: ActiveValue::Set(warehouse_id),
        kind: ActiveValue::Set(kind.as_str().to_string()),
        quantity: ActiveValue::Set(delta),
        remarks: ActiveValue::Set(remarks),
        created_at: ActiveValue::Set(Utc::now()),
        deleted_at: ActiveValue::Set(None),
    }
    .insert(db)
    .await?;
    Ok(model)
}

/// Units on hand per product id, summed over warehouses.
pub(super) async fn quantities<C: ConnectionTrait>(
    db: &C,
    product_ids: &[i32],
) -> ResultEngine<HashMap<i32, i64>> {
    let rows = inventory::Entity::find()
        .filter(inventory::Column::ProductId.is_in(product_ids.iter().copied()))
        .all(db)
        .await?;

    let mut totals = HashMap::new();
    for row in rows {
        *totals.entry(row.product_id).or_insert(0) += row.quantity;
    }
    Ok(totals)
}

async fn describe_stock<C: ConnectionTrait>(
    db: &C,
    rows: Vec<inventory::Model>,
    include_deleted: bool,
) -> ResultEngine<Vec<StockLevel>> {
    let product_ids: Vec<i32> = rows.iter().map(|row| row.product_id).collect();
    let warehouse_ids: Vec<i32> = rows.iter().map(|row| row.warehouse_id).collect();

    let products: HashMap<i32, products::Model> = products::Entity::find()
        .filter(products::Column::Id.is_in(product_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|model| (model.id, model))
        .collect();
    let warehouses: HashMap<i32, warehouses::Model> = warehouses::Entity::find()
        .filter(warehouses::Column::Id.is_in(warehouse_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|model| (model.id, model))
        .collect();

    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let product = products.get(&row.product_id)?;
            let warehouse = warehouses.get(&row.warehouse_id)?;
            if !include_deleted && !(product.is_active() && warehouse.is_active()) {
                return None;
            }
            Some(StockLevel {
                product_id: product.id,
                product_name: product.name.clone(),
                sku: product.sku.clone(),
                warehouse_id: warehouse.id,
                warehouse_name: warehouse.name.clone(),
                quantity: row.quantity,
            })
        })
        .collect())
}
