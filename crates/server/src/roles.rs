//! Role API endpoints. Every handler sits behind the admin gate.

use api_types::role::{Role, RoleMember, RoleUpsert};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{AuthenticatedAccount, RoleCmd};

use crate::{ServerError, server::ServerState};

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Role>>, ServerError> {
    let roles = state.engine.roles().await?;
    Ok(Json(roles.into_iter().map(map_role).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Role>, ServerError> {
    let role = state.engine.role(id).await?;
    Ok(Json(map_role(role)))
}

pub async fn create(
    Extension(admin): Extension<AuthenticatedAccount>,
    State(state): State<ServerState>,
    Json(payload): Json<RoleUpsert>,
) -> Result<(StatusCode, Json<Role>), ServerError> {
    let role = state.engine.new_role(role_cmd(payload)).await?;
    tracing::info!("role {} created by {}", role.name, admin.username);
    Ok((StatusCode::CREATED, Json(map_role(role))))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<RoleUpsert>,
) -> Result<Json<Role>, ServerError> {
    let role = state.engine.update_role(id, role_cmd(payload)).await?;
    Ok(Json(map_role(role)))
}

pub async fn delete(
    Extension(admin): Extension<AuthenticatedAccount>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_role(id).await?;
    tracing::info!("role {id} deleted by {}", admin.username);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_member(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<RoleMember>,
) -> Result<StatusCode, ServerError> {
    state.engine.add_role_member(id, payload.user_id).await?;
    Ok(StatusCode::CREATED)
}

pub async fn remove_member(
    State(state): State<ServerState>,
    Path((id, user_id)): Path<(i32, i32)>,
) -> Result<StatusCode, ServerError> {
    state.engine.remove_role_member(id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn role_cmd(payload: RoleUpsert) -> RoleCmd {
    let cmd = RoleCmd::new(payload.name).auto_assigned(payload.is_auto_assigned);
    match payload.group {
        Some(group) => cmd.group(group),
        None => cmd,
    }
}

fn map_role(role: engine::Role) -> Role {
    Role {
        id: role.id,
        name: role.name,
        group: role.group,
        is_auto_assigned: role.is_auto_assigned,
        users: role.users,
    }
}
