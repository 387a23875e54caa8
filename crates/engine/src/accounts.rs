//! Account lookup seam used by the login flow.
//!
//! [`AccountStore`] is the only way the verifier reaches persistent state:
//! one read by username and one hash update by username. Both match the
//! username case-insensitively.

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, QueryFilter, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};

use crate::{ResultEngine, roles, users};

/// An account as seen by the login flow, joined with its role name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub is_admin: bool,
}

/// Result of a successful login.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedAccount {
    pub id: i32,
    pub username: String,
    pub role: String,
    pub is_admin: bool,
}

impl From<Account> for AuthenticatedAccount {
    fn from(value: Account) -> Self {
        Self {
            id: value.id,
            username: value.username,
            role: value.role,
            is_admin: value.is_admin,
        }
    }
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Find the account whose username matches case-insensitively.
    ///
    /// Accounts without a resolvable role or without a stored hash are
    /// reported as missing.
    async fn find_by_username(&self, username: &str) -> ResultEngine<Option<Account>>;

    /// Overwrite the stored hash, returning the number of rows touched.
    async fn update_password_hash(&self, username: &str, password_hash: &str)
    -> ResultEngine<u64>;
}

/// `AccountStore` over the `users` and `roles` tables.
#[derive(Clone, Debug)]
pub struct DbAccountStore {
    database: DatabaseConnection,
}

impl DbAccountStore {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }
}

pub(crate) fn username_matches(username: &str) -> sea_orm::sea_query::SimpleExpr {
    Expr::cust("LOWER(username)").eq(username.to_lowercase())
}

#[async_trait]
impl AccountStore for DbAccountStore {
    async fn find_by_username(&self, username: &str) -> ResultEngine<Option<Account>> {
        let row = users::Entity::find()
            .filter(username_matches(username))
            .find_also_related(roles::Entity)
            .one(&self.database)
            .await?;

        Ok(row.and_then(|(user, role)| {
            let role = role?;
            if user.password_hash.is_empty() {
                return None;
            }
            Some(Account {
                id: user.id,
                username: user.username,
                password_hash: user.password_hash,
                role: role.name,
                is_admin: user.is_admin,
            })
        }))
    }

    async fn update_password_hash(
        &self,
        username: &str,
        password_hash: &str,
    ) -> ResultEngine<u64> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::PasswordHash, Expr::value(password_hash))
            .filter(username_matches(username))
            .exec(&self.database)
            .await?;
        Ok(result.rows_affected)
    }
}
