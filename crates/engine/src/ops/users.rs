use chrono::Utc;
use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    DEFAULT_ROLE_ID, EngineError, NewUserCmd, ResultEngine, UpdateUserCmd, User, UserRole,
    accounts::{AccountStore, DbAccountStore, username_matches},
    credentials::hash_password,
    roles, users,
    util::{normalize_optional_text, validate_email, validate_new_password, validate_username},
};

use super::{Engine, with_tx};

impl Engine {
    /// Return the primary role name and admin flag of a user.
    pub async fn user_role(&self, user_id: i32) -> ResultEngine<UserRole> {
        let row = users::Entity::find_by_id(user_id)
            .find_also_related(roles::Entity)
            .one(&self.database)
            .await?;
        match row {
            Some((user, Some(role))) => Ok(UserRole {
                role: role.name,
                is_admin: user.is_admin,
            }),
            _ => Err(EngineError::KeyNotFound("user role not exists".to_string())),
        }
    }

    /// Return a user snapshot from DB.
    pub async fn user(&self, user_id: i32) -> ResultEngine<User> {
        let (model, role) = users::Entity::find_by_id(user_id)
            .find_also_related(roles::Entity)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
        Ok(User::from_model(model, role.map(|r| r.name)))
    }

    /// Every user, ordered by id.
    pub async fn users(&self) -> ResultEngine<Vec<User>> {
        let rows = users::Entity::find()
            .find_also_related(roles::Entity)
            .order_by_asc(users::Column::Id)
            .all(&self.database)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(model, role)| User::from_model(model, role.map(|r| r.name)))
            .collect())
    }

    /// Add a new user and return its id.
    ///
    /// `role_id == 0` picks [`DEFAULT_ROLE_ID`]; the role must exist either way.
    /// Usernames are unique regardless of case.
    pub async fn new_user(&self, cmd: NewUserCmd) -> ResultEngine<i32> {
        let username = cmd.username.trim().to_string();
        let email = cmd.email.trim().to_string();
        if username.is_empty() || cmd.password.is_empty() || email.is_empty() {
            return Err(EngineError::Validation(
                "username, password and email are required".to_string(),
            ));
        }
        validate_username(&username)?;
        validate_new_password(&cmd.password)?;
        validate_email(&email)?;
        let role_id = resolve_role_id(cmd.role_id);

        let password_hash = hash_password(&self.hasher, &cmd.password).await?;

        with_tx!(self, |db_tx| {
            assignable_role(&db_tx, role_id).await?;

            let exists = users::Entity::find()
                .filter(username_matches(&username))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(username));
            }

            let model = users::ActiveModel {
                id: ActiveValue::NotSet,
                username: ActiveValue::Set(username.clone()),
                password_hash: ActiveValue::Set(password_hash),
                email: ActiveValue::Set(Some(email)),
                role_id: ActiveValue::Set(role_id),
                is_admin: ActiveValue::Set(cmd.is_admin),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;

            tracing::info!("user {} created with role {role_id}", model.username);
            Ok(model.id)
        })
    }

    /// Replace a user's profile.
    ///
    /// A missing or empty password keeps the stored hash.
    pub async fn update_user(&self, user_id: i32, cmd: UpdateUserCmd) -> ResultEngine<User> {
        let username = cmd.username.trim().to_string();
        validate_username(&username)?;
        let email = normalize_optional_text(cmd.email.as_deref());
        if let Some(email) = &email {
            validate_email(email)?;
        }
        let role_id = resolve_role_id(cmd.role_id);

        let password_hash = match cmd.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => {
                validate_new_password(password)?;
                Some(hash_password(&self.hasher, password).await?)
            }
            None => None,
        };

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let role = assignable_role(&db_tx, role_id).await?;

            let taken = users::Entity::find()
                .filter(username_matches(&username))
                .filter(users::Column::Id.ne(user_id))
                .one(&db_tx)
                .await?
                .is_some();
            if taken {
                return Err(EngineError::ExistingKey(username));
            }

            let mut active = users::ActiveModel {
                id: ActiveValue::Unchanged(user_id),
                username: ActiveValue::Set(username),
                email: ActiveValue::Set(email),
                role_id: ActiveValue::Set(role_id),
                is_admin: ActiveValue::Set(cmd.is_admin),
                ..Default::default()
            };
            if let Some(hash) = password_hash {
                active.password_hash = ActiveValue::Set(hash);
            }
            let model = active.update(&db_tx).await?;

            Ok(User::from_model(model, Some(role.name)))
        })
    }

    /// Delete a user together with its extra role assignments.
    pub async fn delete_user(&self, user_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, user_id).await?;

            roles::assignments::Entity::delete_many()
                .filter(roles::assignments::Column::UserId.eq(user_id))
                .exec(&db_tx)
                .await?;
            users::Entity::delete_by_id(user_id).exec(&db_tx).await?;

            tracing::info!("user {} deleted", user.username);
            Ok(())
        })
    }

    /// Overwrite the stored hash of `username` with a fresh hash of `password`.
    pub async fn rehash_password(&self, username: &str, password: &str) -> ResultEngine<()> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(EngineError::Validation(
                "username and password are required".to_string(),
            ));
        }
        validate_new_password(password)?;

        let password_hash = hash_password(&self.hasher, password).await?;
        let rows = DbAccountStore::new(self.database.clone())
            .update_password_hash(username.trim(), &password_hash)
            .await?;
        if rows == 0 {
            return Err(EngineError::KeyNotFound("user not exists".to_string()));
        }

        tracing::info!("password rehashed for username {username}");
        Ok(())
    }
}

fn resolve_role_id(role_id: i32) -> i32 {
    if role_id == 0 { DEFAULT_ROLE_ID } else { role_id }
}

/// A role a user may be placed in. A dangling id is a bad input, not a missing resource.
async fn assignable_role<C: ConnectionTrait>(db: &C, role_id: i32) -> ResultEngine<roles::Model> {
    roles::Entity::find_by_id(role_id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::Validation(format!("role {role_id} does not exist")))
}
