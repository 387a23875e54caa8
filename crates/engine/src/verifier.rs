//! Login: password verification with transparent legacy-hash migration.
//!
//! A stored hash the current hasher cannot parse is replaced by a fresh
//! current-format hash of the supplied password, then the password is checked
//! again against the new hash. The replacement is a single update keyed by the
//! case-insensitive username; two concurrent legacy logins for the same
//! account both write a valid hash and the last write wins. An account that
//! disappears between the lookup and the update is reported as not found.

use std::sync::Arc;

use crate::{
    EngineError, ResultEngine,
    accounts::{AccountStore, AuthenticatedAccount},
    credentials::{HashError, PasswordHasher, hash_password, run_hasher},
    util::validate_login_input,
};

pub struct CredentialVerifier<S, H> {
    store: S,
    hasher: Arc<H>,
}

impl<S, H> CredentialVerifier<S, H>
where
    S: AccountStore,
    H: PasswordHasher,
{
    pub fn new(store: S, hasher: Arc<H>) -> Self {
        Self { store, hasher }
    }

    /// Check `password` for `username`.
    ///
    /// Errors: `Validation` before any store access, `KeyNotFound` for an
    /// unknown user, `InvalidCredentials` on mismatch, `Internal`/`Database`
    /// when the hasher or the store fails.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> ResultEngine<AuthenticatedAccount> {
        validate_login_input(username, password)?;

        let Some(account) = self.store.find_by_username(username).await? else {
            tracing::warn!("failed login attempt: user not found for username {username}");
            return Err(EngineError::KeyNotFound("user".to_string()));
        };

        match self.verify(password, &account.password_hash).await? {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!("failed login attempt: invalid password for username {username}");
                return Err(EngineError::InvalidCredentials(
                    "invalid password".to_string(),
                ));
            }
            Err(HashError::LegacyFormat) => {
                tracing::warn!("legacy hash detected for username {username}, rehashing");
                self.migrate_legacy_hash(username, password).await?;
            }
            Err(err @ HashError::Backend(_)) => return Err(err.into()),
        }

        tracing::info!(
            "successful login for username {}, role {}",
            account.username,
            account.role
        );
        Ok(account.into())
    }

    async fn verify(&self, password: &str, hash: &str) -> ResultEngine<Result<bool, HashError>> {
        let password = password.to_string();
        let hash = hash.to_string();
        run_hasher(&self.hasher, move |h| h.verify(&password, &hash)).await
    }

    async fn migrate_legacy_hash(&self, username: &str, password: &str) -> ResultEngine<()> {
        let new_hash = hash_password(&self.hasher, password).await?;

        let rows = self.store.update_password_hash(username, &new_hash).await?;
        if rows == 0 {
            tracing::warn!("legacy hash for username {username} was not replaced: no row matched");
            return Err(EngineError::KeyNotFound("user".to_string()));
        }
        tracing::info!("legacy hash rehashed for username {username}");

        match self.verify(password, &new_hash).await? {
            Ok(true) => Ok(()),
            Ok(false) | Err(HashError::LegacyFormat) => Err(EngineError::InvalidCredentials(
                "invalid password after rehash".to_string(),
            )),
            Err(err @ HashError::Backend(_)) => Err(err.into()),
        }
    }
}
