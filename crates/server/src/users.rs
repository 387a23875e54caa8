//! User API endpoints

use api_types::{
    Created,
    user::{
        LoginRequest, LoginResponse, RehashPassword, RoleAssignment, RoleAssignmentUpdate, User,
        UserNew, UserRole, UserUpdate,
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{NewUserCmd, UpdateUserCmd};

use crate::{ServerError, server::ServerState};

/// Check credentials and return the caller's identity.
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ServerError> {
    let account = state
        .engine
        .login(&payload.username, &payload.password)
        .await?;

    Ok(Json(LoginResponse {
        id: account.id,
        username: account.username,
        role: account.role,
        is_admin: account.is_admin,
    }))
}

pub async fn user_role(
    State(state): State<ServerState>,
    Path(user_id): Path<i32>,
) -> Result<Json<UserRole>, ServerError> {
    let role = state.engine.user_role(user_id).await?;
    Ok(Json(UserRole {
        role: role.role,
        is_admin: role.is_admin,
    }))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let cmd = NewUserCmd::new(payload.username, payload.password, payload.email)
        .role_id(payload.role_id)
        .admin(payload.is_admin);
    let id = state.engine.new_user(cmd).await?;

    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn read(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<User>, ServerError> {
    let user = state.engine.user(id).await?;
    Ok(Json(map_user(user)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<User>, ServerError> {
    let user = state
        .engine
        .update_user(
            id,
            UpdateUserCmd {
                username: payload.username,
                password: payload.password,
                email: payload.email,
                role_id: payload.role_id,
                is_admin: payload.is_admin,
            },
        )
        .await?;

    Ok(Json(map_user(user)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<User>>, ServerError> {
    let users = state.engine.users().await?;
    Ok(Json(users.into_iter().map(map_user).collect()))
}

/// Overwrite a user's hash with a fresh one. The new hash is never echoed back.
pub async fn rehash_password(
    State(state): State<ServerState>,
    Json(payload): Json<RehashPassword>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .rehash_password(&payload.username, &payload.password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_role_assignments(
    State(state): State<ServerState>,
) -> Result<Json<Vec<RoleAssignment>>, ServerError> {
    let assignments = state.engine.role_assignments().await?;
    Ok(Json(assignments.into_iter().map(map_assignment).collect()))
}

pub async fn read_role_assignment(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<RoleAssignment>, ServerError> {
    let assignment = state.engine.role_assignment(id).await?;
    Ok(Json(map_assignment(assignment)))
}

pub async fn update_role_assignment(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<RoleAssignmentUpdate>,
) -> Result<Json<RoleAssignment>, ServerError> {
    let assignment = state
        .engine
        .update_role_assignment(id, payload.user_id, payload.role_id)
        .await?;
    Ok(Json(map_assignment(assignment)))
}

fn map_assignment(assignment: engine::RoleAssignment) -> RoleAssignment {
    RoleAssignment {
        id: assignment.id,
        user_id: assignment.user_id,
        username: assignment.username,
        role_id: assignment.role_id,
        role_name: assignment.role_name,
    }
}

fn map_user(user: engine::User) -> User {
    User {
        id: user.id,
        username: user.username,
        email: user.email,
        role_id: user.role_id,
        role_name: user.role_name,
        is_admin: user.is_admin,
        created_at: user.created_at,
    }
}
