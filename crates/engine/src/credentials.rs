//! Password hashing primitive.
//!
//! Verification never reports an unparseable hash as a plain mismatch: a hash
//! the current algorithm cannot read is [`HashError::LegacyFormat`], which the
//! login flow treats as a migration signal.

use std::sync::Arc;

use thiserror::Error;
use tokio::task;

use crate::{EngineError, ResultEngine};

/// Errors of the hashing primitive.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    /// The stored hash is not in the current format.
    #[error("stored hash is in a legacy format")]
    LegacyFormat,
    #[error("password hashing failed: {0}")]
    Backend(String),
}

/// Hash and verify passwords in the current format.
pub trait PasswordHasher: Send + Sync + 'static {
    fn hash(&self, password: &str) -> Result<String, HashError>;

    /// `Ok(false)` only for a well-formed hash of a different password.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, HashError>;
}

/// Bcrypt in modular-crypt form (`$2b$<cost>$<salt+digest>`).
#[derive(Clone, Copy, Debug)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, password: &str) -> Result<String, HashError> {
        bcrypt::hash(password, self.cost).map_err(|err| HashError::Backend(err.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, HashError> {
        bcrypt::verify(password, hash).map_err(|err| match err {
            bcrypt::BcryptError::InvalidHash(_)
            | bcrypt::BcryptError::InvalidPrefix(_)
            | bcrypt::BcryptError::InvalidCost(_)
            | bcrypt::BcryptError::InvalidSaltLen(_)
            | bcrypt::BcryptError::InvalidBase64(_)
            | bcrypt::BcryptError::CostNotAllowed(_) => HashError::LegacyFormat,
            other => HashError::Backend(other.to_string()),
        })
    }
}

impl From<HashError> for EngineError {
    fn from(value: HashError) -> Self {
        EngineError::Internal(value.to_string())
    }
}

/// Run `f` against the hasher on the blocking pool.
///
/// Bcrypt is CPU-bound and must stay off the async workers.
pub(crate) async fn run_hasher<H, T, F>(hasher: &Arc<H>, f: F) -> ResultEngine<T>
where
    H: PasswordHasher,
    T: Send + 'static,
    F: FnOnce(&H) -> T + Send + 'static,
{
    let hasher = Arc::clone(hasher);
    task::spawn_blocking(move || f(hasher.as_ref()))
        .await
        .map_err(|err| EngineError::Internal(format!("password hashing task failed: {err}")))
}

/// Hash `password` with the current format on the blocking pool.
pub(crate) async fn hash_password<H: PasswordHasher>(
    hasher: &Arc<H>,
    password: &str,
) -> ResultEngine<String> {
    let password = password.to_string();
    Ok(run_hasher(hasher, move |h| h.hash(&password)).await??)
}
