use sea_orm::{ActiveValue, QueryOrder, prelude::*};

use crate::{
    CashFlowCmd, CashFlowEntry, EngineError, ResultEngine, cash_flows,
    util::{normalize_required_text, parse_date},
};

use super::Engine;

const MAX_DESCRIPTION_LEN: usize = 1000;

impl Engine {
    /// Cash flow entries ordered by date, then id.
    pub async fn cash_flows(&self) -> ResultEngine<Vec<CashFlowEntry>> {
        let models = cash_flows::Entity::find()
            .order_by_asc(cash_flows::Column::Date)
            .order_by_asc(cash_flows::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(CashFlowEntry::from).collect())
    }

    pub async fn cash_flow(&self, id: i32) -> ResultEngine<CashFlowEntry> {
        cash_flows::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .map(CashFlowEntry::from)
            .ok_or_else(|| EngineError::KeyNotFound("cash_flow not exists".to_string()))
    }

    pub async fn new_cash_flow(&self, cmd: CashFlowCmd) -> ResultEngine<CashFlowEntry> {
        let model = active_model(&cmd)?.insert(&self.database).await?;
        Ok(model.into())
    }

    pub async fn update_cash_flow(&self, id: i32, cmd: CashFlowCmd) -> ResultEngine<CashFlowEntry> {
        let mut active = active_model(&cmd)?;
        self.cash_flow(id).await?;
        active.id = ActiveValue::Unchanged(id);
        let model = active.update(&self.database).await?;
        Ok(model.into())
    }

    pub async fn delete_cash_flow(&self, id: i32) -> ResultEngine<()> {
        let result = cash_flows::Entity::delete_by_id(id)
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("cash_flow not exists".to_string()));
        }
        Ok(())
    }
}

fn active_model(cmd: &CashFlowCmd) -> ResultEngine<cash_flows::ActiveModel> {
    let date = parse_date(&cmd.date)?;
    let description = normalize_required_text(&cmd.description, "description", MAX_DESCRIPTION_LEN)?;
    Ok(cash_flows::ActiveModel {
        id: ActiveValue::NotSet,
        date: ActiveValue::Set(date),
        description: ActiveValue::Set(description),
        amount_minor: ActiveValue::Set(cmd.amount_minor),
    })
}
