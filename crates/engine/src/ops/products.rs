use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};

use crate::{
    EngineError, MovementKind, Product, ProductCmd, ResultEngine, inventory, products,
    util::{normalize_bounded_text, normalize_required_text},
};

use super::{
    Engine,
    inventory::{apply_stock_delta, insert_movement, quantities},
    with_tx,
};

const MAX_NAME_LEN: usize = 100;
const MAX_SKU_LEN: usize = 50;
const MAX_DESCRIPTION_LEN: usize = 1000;
const MAX_PHOTO_LEN: usize = 255;

struct ProductFields {
    name: String,
    sku: String,
    description: Option<String>,
    photo: Option<String>,
}

impl Engine {
    /// Products ordered by id, with their total stock.
    pub async fn products(&self, include_deleted: bool) -> ResultEngine<Vec<Product>> {
        let mut query = products::Entity::find().order_by_asc(products::Column::Id);
        if !include_deleted {
            query = query.filter(products::Column::DeletedAt.is_null());
        }
        let models = query.all(&self.database).await?;

        let ids: Vec<i32> = models.iter().map(|model| model.id).collect();
        let totals = quantities(&self.database, &ids).await?;
        Ok(models
            .into_iter()
            .map(|model| {
                let quantity = totals.get(&model.id).copied().unwrap_or(0);
                Product::from_model(model, quantity)
            })
            .collect())
    }

    /// Return a product snapshot, deleted or not.
    pub async fn product(&self, product_id: i32) -> ResultEngine<Product> {
        let model = products::Entity::find_by_id(product_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("product not exists".to_string()))?;
        let totals = quantities(&self.database, &[product_id]).await?;
        Ok(Product::from_model(
            model,
            totals.get(&product_id).copied().unwrap_or(0),
        ))
    }

    /// Add a product. SKUs are unique regardless of case.
    ///
    /// Initial stock goes to `warehouse_id` as an `in` movement.
    pub async fn new_product(&self, cmd: ProductCmd) -> ResultEngine<Product> {
        let fields = normalize_product(&cmd)?;
        let quantity = cmd.quantity.unwrap_or(0);
        if quantity > 0 && cmd.warehouse_id.is_none() {
            return Err(EngineError::Validation(
                "a warehouse is required to hold stock".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            if sku_taken(&db_tx, &fields.sku, None).await? {
                return Err(EngineError::ExistingKey(fields.sku));
            }
            if let Some(warehouse_id) = cmd.warehouse_id {
                self.require_active_warehouse(&db_tx, warehouse_id).await?;
            }

            let model = products::ActiveModel {
                id: ActiveValue::NotSet,
                name: ActiveValue::Set(fields.name),
                sku: ActiveValue::Set(fields.sku),
                description: ActiveValue::Set(fields.description),
                unit_price_minor: ActiveValue::Set(cmd.unit_price_minor),
                warehouse_id: ActiveValue::Set(cmd.warehouse_id),
                photo: ActiveValue::Set(fields.photo),
                created_at: ActiveValue::Set(Utc::now()),
                deleted_at: ActiveValue::Set(None),
            }
            .insert(&db_tx)
            .await?;

            if let Some(warehouse_id) = cmd.warehouse_id {
                apply_stock_delta(&db_tx, model.id, warehouse_id, quantity).await?;
                if quantity > 0 {
                    insert_movement(
                        &db_tx,
                        model.id,
                        warehouse_id,
                        MovementKind::In,
                        quantity,
                        Some("initial stock".to_string()),
                    )
                    .await?;
                }
            }

            tracing::info!("product {} created", model.sku);
            Ok(Product::from_model(model, quantity))
        })
    }

    /// Replace a live product's details.
    ///
    /// A missing `warehouse_id` keeps the home warehouse. A given `quantity`
    /// sets the stock held in the home warehouse through an `adjust` movement.
    pub async fn update_product(&self, product_id: i32, cmd: ProductCmd) -> ResultEngine<Product> {
        let fields = normalize_product(&cmd)?;
        with_tx!(self, |db_tx| {
            let existing = require_live_product(&db_tx, product_id).await?;
            if sku_taken(&db_tx, &fields.sku, Some(product_id)).await? {
                return Err(EngineError::ExistingKey(fields.sku));
            }
            if let Some(warehouse_id) = cmd.warehouse_id {
                self.require_active_warehouse(&db_tx, warehouse_id).await?;
            }
            let warehouse_id = cmd.warehouse_id.or(existing.warehouse_id);

            let model = products::ActiveModel {
                id: ActiveValue::Unchanged(product_id),
                name: ActiveValue::Set(fields.name),
                sku: ActiveValue::Set(fields.sku),
                description: ActiveValue::Set(fields.description),
                unit_price_minor: ActiveValue::Set(cmd.unit_price_minor),
                warehouse_id: ActiveValue::Set(warehouse_id),
                photo: ActiveValue::Set(fields.photo),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            if let Some(target) = cmd.quantity {
                let Some(warehouse_id) = warehouse_id else {
                    return Err(EngineError::Validation(
                        "a warehouse is required to hold stock".to_string(),
                    ));
                };
                self.require_active_warehouse(&db_tx, warehouse_id).await?;

                let current = inventory::Entity::find()
                    .filter(inventory::Column::ProductId.eq(product_id))
                    .filter(inventory::Column::WarehouseId.eq(warehouse_id))
                    .one(&db_tx)
                    .await?
                    .map_or(0, |row| row.quantity);
                let delta = target - current;
                apply_stock_delta(&db_tx, product_id, warehouse_id, delta).await?;
                if delta != 0 {
                    insert_movement(
                        &db_tx,
                        product_id,
                        warehouse_id,
                        MovementKind::Adjust,
                        delta,
                        Some("stock set on product update".to_string()),
                    )
                    .await?;
                }
            }

            let totals = quantities(&db_tx, &[product_id]).await?;
            Ok(Product::from_model(
                model,
                totals.get(&product_id).copied().unwrap_or(0),
            ))
        })
    }

    /// Mark a product deleted. Its stock rows stay but leave the reports.
    pub async fn delete_product(&self, product_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let product = require_live_product(&db_tx, product_id).await?;
            products::ActiveModel {
                id: ActiveValue::Unchanged(product_id),
                deleted_at: ActiveValue::Set(Some(Utc::now())),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            tracing::info!("product {} deleted", product.sku);
            Ok(())
        })
    }
}

fn normalize_product(cmd: &ProductCmd) -> ResultEngine<ProductFields> {
    let name = normalize_required_text(&cmd.name, "product name", MAX_NAME_LEN)?;
    let sku = normalize_required_text(&cmd.sku, "SKU", MAX_SKU_LEN)?;
    if cmd.unit_price_minor <= 0 {
        return Err(EngineError::Validation(
            "unit price must be greater than 0".to_string(),
        ));
    }
    if cmd.quantity.is_some_and(|quantity| quantity < 0) {
        return Err(EngineError::Validation(
            "quantity cannot be negative".to_string(),
        ));
    }
    Ok(ProductFields {
        name,
        sku,
        description: normalize_bounded_text(
            cmd.description.as_deref(),
            "description",
            MAX_DESCRIPTION_LEN,
        )?,
        photo: normalize_bounded_text(cmd.photo.as_deref(), "photo", MAX_PHOTO_LEN)?,
    })
}

async fn require_live_product<C: ConnectionTrait>(
    db: &C,
    product_id: i32,
) -> ResultEngine<products::Model> {
    products::Entity::find_by_id(product_id)
        .one(db)
        .await?
        .filter(products::Model::is_active)
        .ok_or_else(|| EngineError::KeyNotFound("product not exists".to_string()))
}

async fn sku_taken<C: ConnectionTrait>(
    db: &C,
    sku: &str,
    except: Option<i32>,
) -> ResultEngine<bool> {
    let mut query = products::Entity::find().filter(Expr::cust("LOWER(sku)").eq(sku.to_lowercase()));
    if let Some(product_id) = except {
        query = query.filter(products::Column::Id.ne(product_id));
    }
    Ok(query.one(db).await?.is_some())
}
