//! Administration handlers

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{Action, User};
use crate::services::admin::{
    AssignmentsInput, ComposterRef, ManagedComposter, ManagedUser, RoleInput,
};
use crate::services::AdminService;
use crate::AppState;

/// List CLIENT and SUPERVISOR users with their composters
pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<ManagedUser>>> {
    user.require(Action::ManageUsers)?;
    let service = AdminService::new(state.db.clone());
    Ok(Json(service.list_users().await?))
}

/// List composters with their site and assigned users
pub async fn list_managed_composters(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<ManagedComposter>>> {
    user.require(Action::ManageUsers)?;
    let service = AdminService::new(state.db.clone());
    Ok(Json(service.list_composters().await?))
}

/// Replace a user's composter assignments
pub async fn update_assignments(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<Uuid>,
    Json(input): Json<AssignmentsInput>,
) -> AppResult<Json<Vec<ComposterRef>>> {
    user.require(Action::ManageUsers)?;
    let service = AdminService::new(state.db.clone());
    Ok(Json(service.set_assignments(user_id, input).await?))
}

/// Switch a user between CLIENT and SUPERVISOR
pub async fn update_role(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<Uuid>,
    Json(input): Json<RoleInput>,
) -> AppResult<Json<User>> {
    user.require(Action::ManageUsers)?;
    let service = AdminService::new(state.db.clone());
    Ok(Json(service.set_role(user_id, input.role).await?))
}
