use std::sync::Arc;

use sea_orm::DatabaseConnection;

pub use accounts::{Account, AccountStore, AuthenticatedAccount, DbAccountStore};
pub use cash_flows::CashFlowEntry;
pub use commands::{
    CashFlowCmd, ExpenseCmd, MovementCmd, MovementFilter, NewUserCmd, ProductCmd, RoleCmd,
    SaleCmd, UpdateUserCmd, WarehouseCmd,
};
pub use credentials::{BcryptHasher, HashError, PasswordHasher};
pub use error::EngineError;
pub use expenses::Expense;
pub use inventory::{Movement, MovementKind, StockLevel};
pub use ops::DEFAULT_LOW_STOCK_THRESHOLD;
pub use products::Product;
pub use roles::{Role, RoleAssignment};
pub use sales::Sale;
pub use users::{User, UserRole};
pub use util::{DEFAULT_ROLE_GROUP, MAX_PASSWORD_LEN, MIN_PASSWORD_LEN};
pub use verifier::CredentialVerifier;
pub use warehouses::Warehouse;

mod accounts;
mod cash_flows;
mod commands;
mod credentials;
mod error;
mod expenses;
mod inventory;
mod ops;
mod products;
mod roles;
mod sales;
mod users;
mod util;
mod verifier;
mod warehouses;

type ResultEngine<T> = Result<T, EngineError>;

/// Id of the role given to users created without one.
pub const DEFAULT_ROLE_ID: i32 = 1;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    hasher: Arc<BcryptHasher>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Login flow bound to this engine's database and hasher.
    pub fn verifier(&self) -> CredentialVerifier<DbAccountStore, BcryptHasher> {
        CredentialVerifier::new(
            DbAccountStore::new(self.database.clone()),
            Arc::clone(&self.hasher),
        )
    }

    /// Check a username/password pair, migrating a legacy hash on the way.
    pub async fn login(&self, username: &str, password: &str) -> ResultEngine<AuthenticatedAccount> {
        self.verifier().authenticate(username, password).await
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    hasher: BcryptHasher,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Bcrypt work factor for newly written hashes.
    pub fn bcrypt_cost(mut self, cost: u32) -> EngineBuilder {
        self.hasher = BcryptHasher::new(cost);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        if !(4..=31).contains(&self.hasher.cost()) {
            return Err(EngineError::Validation(format!(
                "bcrypt cost must be between 4 and 31, got {}",
                self.hasher.cost()
            )));
        }
        Ok(Engine {
            database: self.database,
            hasher: Arc::new(self.hasher),
        })
    }
}
