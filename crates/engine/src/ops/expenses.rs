use sea_orm::{ActiveValue, QueryOrder, prelude::*};

use crate::{
    EngineError, Expense, ExpenseCmd, ResultEngine,
    expenses::{self, MAX_EXPENSE_MINOR},
    util::{normalize_required_text, parse_date},
};

use super::Engine;

const MAX_CATEGORY_LEN: usize = 255;
const MAX_DESCRIPTION_LEN: usize = 1000;

impl Engine {
    /// Expenses, most recent first.
    pub async fn expenses(&self) -> ResultEngine<Vec<Expense>> {
        let models = expenses::Entity::find()
            .order_by_desc(expenses::Column::Date)
            .order_by_desc(expenses::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Expense::from).collect())
    }

    pub async fn expense(&self, id: i32) -> ResultEngine<Expense> {
        expenses::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .map(Expense::from)
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))
    }

    pub async fn new_expense(&self, cmd: ExpenseCmd) -> ResultEngine<Expense> {
        let model = active_model(&cmd)?.insert(&self.database).await?;
        tracing::debug!("expense {} recorded", model.id);
        Ok(model.into())
    }

    pub async fn update_expense(&self, id: i32, cmd: ExpenseCmd) -> ResultEngine<Expense> {
        let mut active = active_model(&cmd)?;
        self.expense(id).await?;
        active.id = ActiveValue::Unchanged(id);
        let model = active.update(&self.database).await?;
        Ok(model.into())
    }

    pub async fn delete_expense(&self, id: i32) -> ResultEngine<()> {
        let result = expenses::Entity::delete_by_id(id)
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("expense not exists".to_string()));
        }
        Ok(())
    }
}

fn active_model(cmd: &ExpenseCmd) -> ResultEngine<expenses::ActiveModel> {
    let date = parse_date(&cmd.date)?;
    let category = normalize_required_text(&cmd.category, "category", MAX_CATEGORY_LEN)?;
    let description =
        normalize_required_text(&cmd.description, "description", MAX_DESCRIPTION_LEN)?;
    if !(1..=MAX_EXPENSE_MINOR).contains(&cmd.amount_minor) {
        return Err(EngineError::Validation(format!(
            "amount must be between 1 and {MAX_EXPENSE_MINOR} cents"
        )));
    }
    Ok(expenses::ActiveModel {
        id: ActiveValue::NotSet,
        date: ActiveValue::Set(date),
        category: ActiveValue::Set(category),
        description: ActiveValue::Set(description),
        amount_minor: ActiveValue::Set(cmd.amount_minor),
    })
}
