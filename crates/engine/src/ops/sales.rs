use sea_orm::{ActiveValue, QueryOrder, prelude::*};

use crate::{
    EngineError, ResultEngine, Sale, SaleCmd,
    sales::{self, sale_total},
    util::{normalize_required_text, parse_date},
};

use super::Engine;

const MAX_NAME_LEN: usize = 255;

impl Engine {
    /// Sales, most recent first.
    pub async fn sales(&self) -> ResultEngine<Vec<Sale>> {
        let models = sales::Entity::find()
            .order_by_desc(sales::Column::Date)
            .order_by_desc(sales::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Sale::from).collect())
    }

    pub async fn sale(&self, id: i32) -> ResultEngine<Sale> {
        sales::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .map(Sale::from)
            .ok_or_else(|| EngineError::KeyNotFound("sale not exists".to_string()))
    }

    /// Record a sale. The total is always `quantity * unit_price_minor`.
    pub async fn new_sale(&self, cmd: SaleCmd) -> ResultEngine<Sale> {
        let model = active_model(&cmd)?.insert(&self.database).await?;
        Ok(model.into())
    }

    pub async fn update_sale(&self, id: i32, cmd: SaleCmd) -> ResultEngine<Sale> {
        let mut active = active_model(&cmd)?;
        self.sale(id).await?;
        active.id = ActiveValue::Unchanged(id);
        let model = active.update(&self.database).await?;
        Ok(model.into())
    }

    pub async fn delete_sale(&self, id: i32) -> ResultEngine<()> {
        let result = sales::Entity::delete_by_id(id).exec(&self.database).await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("sale not exists".to_string()));
        }
        Ok(())
    }
}

fn active_model(cmd: &SaleCmd) -> ResultEngine<sales::ActiveModel> {
    let date = parse_date(&cmd.date)?;
    let customer_name = normalize_required_text(&cmd.customer_name, "customer name", MAX_NAME_LEN)?;
    let item_sold = normalize_required_text(&cmd.item_sold, "item sold", MAX_NAME_LEN)?;
    let total = sale_total(cmd.quantity, cmd.unit_price_minor)?;
    Ok(sales::ActiveModel {
        id: ActiveValue::NotSet,
        date: ActiveValue::Set(date),
        customer_name: ActiveValue::Set(customer_name),
        item_sold: ActiveValue::Set(item_sold),
        quantity: ActiveValue::Set(cmd.quantity),
        unit_price_minor: ActiveValue::Set(cmd.unit_price_minor),
        total_amount_minor: ActiveValue::Set(total),
    })
}
