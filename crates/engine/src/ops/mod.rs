use sea_orm::{ConnectionTrait, prelude::*};

use crate::{Engine, EngineError, ResultEngine};

mod cash_flows;
mod expenses;
mod inventory;
mod products;
mod roles;
mod sales;
mod users;
mod warehouses;

pub use inventory::DEFAULT_LOW_STOCK_THRESHOLD;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

impl Engine {
    /// Fail with `Forbidden` unless `user_id` names an admin account.
    ///
    /// The flag is read from the database, not from a cached login result.
    pub async fn require_admin(&self, user_id: i32) -> ResultEngine<()> {
        let user = self.require_user(&self.database, user_id).await?;
        if !user.is_admin {
            tracing::warn!("user {} is not an admin", user.username);
            return Err(EngineError::Forbidden(
                "administrator rights required".to_string(),
            ));
        }
        Ok(())
    }

    async fn require_role<C: ConnectionTrait>(
        &self,
        db: &C,
        role_id: i32,
    ) -> ResultEngine<crate::roles::Model> {
        crate::roles::Entity::find_by_id(role_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("role not exists".to_string()))
    }

    async fn require_user<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: i32,
    ) -> ResultEngine<crate::users::Model> {
        crate::users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    /// A warehouse that can take stock: present and not deleted.
    async fn require_active_warehouse<C: ConnectionTrait>(
        &self,
        db: &C,
        warehouse_id: i32,
    ) -> ResultEngine<crate::warehouses::Model> {
        crate::warehouses::Entity::find_by_id(warehouse_id)
            .one(db)
            .await?
            .filter(crate::warehouses::Model::is_active)
            .ok_or_else(|| {
                EngineError::Validation("warehouse does not exist or is not active".to_string())
            })
    }

    async fn require_active_product<C: ConnectionTrait>(
        &self,
        db: &C,
        product_id: i32,
    ) -> ResultEngine<crate::products::Model> {
        crate::products::Entity::find_by_id(product_id)
            .one(db)
            .await?
            .filter(crate::products::Model::is_active)
            .ok_or_else(|| {
                EngineError::Validation("product does not exist or is not active".to_string())
            })
    }
}
