use std::collections::{BTreeSet, HashMap};

use sea_orm::{
    ActiveValue, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*, sea_query::Expr,
};

use crate::{
    DEFAULT_ROLE_GROUP, EngineError, ResultEngine, Role, RoleAssignment, RoleCmd,
    roles::{self, assignments},
    users,
    util::{normalize_optional_text, validate_role_name},
};

use super::{Engine, with_tx};

type Members = HashMap<i32, BTreeSet<String>>;

impl Engine {
    /// Every role with the usernames attached to it, ordered by id.
    pub async fn roles(&self) -> ResultEngine<Vec<Role>> {
        let models = roles::Entity::find()
            .order_by_asc(roles::Column::Id)
            .all(&self.database)
            .await?;
        let mut members = load_members(&self.database, None).await?;
        Ok(models
            .into_iter()
            .map(|model| into_role(model, &mut members))
            .collect())
    }

    /// Return a role snapshot from DB.
    pub async fn role(&self, role_id: i32) -> ResultEngine<Role> {
        let model = self.require_role(&self.database, role_id).await?;
        let mut members = load_members(&self.database, Some(role_id)).await?;
        Ok(into_role(model, &mut members))
    }

    /// Add a new role. Names are unique regardless of case; a missing group
    /// falls back to [`DEFAULT_ROLE_GROUP`].
    pub async fn new_role(&self, cmd: RoleCmd) -> ResultEngine<Role> {
        let (name, group) = normalize_role(&cmd)?;
        with_tx!(self, |db_tx| {
            if role_name_taken(&db_tx, &name, None).await? {
                return Err(EngineError::ExistingKey(name));
            }

            let model = roles::ActiveModel {
                id: ActiveValue::NotSet,
                name: ActiveValue::Set(name),
                group_name: ActiveValue::Set(group),
                is_auto_assigned: ActiveValue::Set(cmd.is_auto_assigned),
            }
            .insert(&db_tx)
            .await?;

            tracing::info!("role {} created", model.name);
            Ok(into_role(model, &mut Members::new()))
        })
    }

    /// Rename or regroup a role. Assignment rows keep their role name snapshot in sync.
    pub async fn update_role(&self, role_id: i32, cmd: RoleCmd) -> ResultEngine<Role> {
        let (name, group) = normalize_role(&cmd)?;
        with_tx!(self, |db_tx| {
            self.require_role(&db_tx, role_id).await?;
            if role_name_taken(&db_tx, &name, Some(role_id)).await? {
                return Err(EngineError::ExistingKey(name));
            }

            let model = roles::ActiveModel {
                id: ActiveValue::Unchanged(role_id),
                name: ActiveValue::Set(name.clone()),
                group_name: ActiveValue::Set(group),
                is_auto_assigned: ActiveValue::Set(cmd.is_auto_assigned),
            }
            .update(&db_tx)
            .await?;

            assignments::Entity::update_many()
                .col_expr(assignments::Column::RoleName, Expr::value(name))
                .filter(assignments::Column::RoleId.eq(role_id))
                .exec(&db_tx)
                .await?;

            let mut members = load_members(&db_tx, Some(role_id)).await?;
            Ok(into_role(model, &mut members))
        })
    }

    /// Delete a role and its assignments.
    ///
    /// Refused with `InUse` while some user still has it as primary role.
    pub async fn delete_role(&self, role_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let role = self.require_role(&db_tx, role_id).await?;

            let primary_users = users::Entity::find()
                .filter(users::Column::RoleId.eq(role_id))
                .count(&db_tx)
                .await?;
            if primary_users > 0 {
                tracing::warn!(
                    "role {} not deleted: primary role of {primary_users} users",
                    role.name
                );
                return Err(EngineError::InUse(role.name));
            }

            assignments::Entity::delete_many()
                .filter(assignments::Column::RoleId.eq(role_id))
                .exec(&db_tx)
                .await?;
            roles::Entity::delete_by_id(role_id).exec(&db_tx).await?;

            tracing::info!("role {} deleted", role.name);
            Ok(())
        })
    }

    /// Put a user in an additional role.
    pub async fn add_role_member(&self, role_id: i32, user_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let role = self.require_role(&db_tx, role_id).await?;
            let user = self.require_user(&db_tx, user_id).await?;

            let assigned = assignments::Entity::find()
                .filter(assignments::Column::RoleId.eq(role_id))
                .filter(assignments::Column::UserId.eq(user_id))
                .one(&db_tx)
                .await?
                .is_some();
            if user.role_id == role_id || assigned {
                return Err(EngineError::ExistingKey(format!(
                    "{} in {}",
                    user.username, role.name
                )));
            }

            assignments::ActiveModel {
                id: ActiveValue::NotSet,
                user_id: ActiveValue::Set(user_id),
                role_id: ActiveValue::Set(role_id),
                role_name: ActiveValue::Set(Some(role.name)),
            }
            .insert(&db_tx)
            .await?;
            Ok(())
        })
    }

    /// Remove an additional role assignment. The primary role is untouched.
    pub async fn remove_role_member(&self, role_id: i32, user_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_role(&db_tx, role_id).await?;

            let result = assignments::Entity::delete_many()
                .filter(assignments::Column::RoleId.eq(role_id))
                .filter(assignments::Column::UserId.eq(user_id))
                .exec(&db_tx)
                .await?;
            if result.rows_affected == 0 {
                return Err(EngineError::KeyNotFound(
                    "role assignment not exists".to_string(),
                ));
            }
            Ok(())
        })
    }

    /// Every `user_in_roles` row, ordered by id.
    pub async fn role_assignments(&self) -> ResultEngine<Vec<RoleAssignment>> {
        let rows = assignments::Entity::find()
            .find_also_related(users::Entity)
            .order_by_asc(assignments::Column::Id)
            .all(&self.database)
            .await?;
        Ok(rows.into_iter().map(into_assignment).collect())
    }

    pub async fn role_assignment(&self, assignment_id: i32) -> ResultEngine<RoleAssignment> {
        assignments::Entity::find_by_id(assignment_id)
            .find_also_related(users::Entity)
            .one(&self.database)
            .await?
            .map(into_assignment)
            .ok_or_else(|| EngineError::KeyNotFound("role assignment not exists".to_string()))
    }

    /// Point an assignment at another user and/or role.
    ///
    /// The same rules as [`Engine::add_role_member`] apply to the new pair.
    pub async fn update_role_assignment(
        &self,
        assignment_id: i32,
        user_id: i32,
        role_id: i32,
    ) -> ResultEngine<RoleAssignment> {
        with_tx!(self, |db_tx| {
            assignments::Entity::find_by_id(assignment_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| {
                    EngineError::KeyNotFound("role assignment not exists".to_string())
                })?;
            let role = self.require_role(&db_tx, role_id).await?;
            let user = self.require_user(&db_tx, user_id).await?;

            let duplicate = assignments::Entity::find()
                .filter(assignments::Column::RoleId.eq(role_id))
                .filter(assignments::Column::UserId.eq(user_id))
                .filter(assignments::Column::Id.ne(assignment_id))
                .one(&db_tx)
                .await?
                .is_some();
            if user.role_id == role_id || duplicate {
                return Err(EngineError::ExistingKey(format!(
                    "{} in {}",
                    user.username, role.name
                )));
            }

            let model = assignments::ActiveModel {
                id: ActiveValue::Unchanged(assignment_id),
                user_id: ActiveValue::Set(user_id),
                role_id: ActiveValue::Set(role_id),
                role_name: ActiveValue::Set(Some(role.name)),
            }
            .update(&db_tx)
            .await?;
            Ok(into_assignment((model, Some(user))))
        })
    }
}

fn into_assignment((model, user): (assignments::Model, Option<users::Model>)) -> RoleAssignment {
    RoleAssignment {
        id: model.id,
        user_id: model.user_id,
        username: user.map(|user| user.username),
        role_id: model.role_id,
        role_name: model.role_name,
    }
}

fn normalize_role(cmd: &RoleCmd) -> ResultEngine<(String, String)> {
    let name = cmd.name.trim().to_string();
    validate_role_name(&name)?;
    let group = normalize_optional_text(cmd.group.as_deref())
        .unwrap_or_else(|| DEFAULT_ROLE_GROUP.to_string());
    Ok((name, group))
}

async fn role_name_taken<C: ConnectionTrait>(
    db: &C,
    name: &str,
    except: Option<i32>,
) -> ResultEngine<bool> {
    let mut query = roles::Entity::find().filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()));
    if let Some(role_id) = except {
        query = query.filter(roles::Column::Id.ne(role_id));
    }
    Ok(query.one(db).await?.is_some())
}

/// Usernames per role id: primary members plus `user_in_roles` assignments.
async fn load_members<C: ConnectionTrait>(db: &C, role_id: Option<i32>) -> ResultEngine<Members> {
    let mut members = Members::new();

    let mut primary = users::Entity::find();
    if let Some(role_id) = role_id {
        primary = primary.filter(users::Column::RoleId.eq(role_id));
    }
    for user in primary.all(db).await? {
        members.entry(user.role_id).or_default().insert(user.username);
    }

    let mut extra = assignments::Entity::find().find_also_related(users::Entity);
    if let Some(role_id) = role_id {
        extra = extra.filter(assignments::Column::RoleId.eq(role_id));
    }
    for (assignment, user) in extra.all(db).await? {
        if let Some(user) = user {
            members
                .entry(assignment.role_id)
                .or_default()
                .insert(user.username);
        }
    }

    Ok(members)
}

fn into_role(model: roles::Model, members: &mut Members) -> Role {
    Role {
        id: model.id,
        users: members
            .remove(&model.id)
            .map(|names| names.into_iter().collect())
            .unwrap_or_default(),
        name: model.name,
        group: model.group_name,
        is_auto_assigned: model.is_auto_assigned,
    }
}
