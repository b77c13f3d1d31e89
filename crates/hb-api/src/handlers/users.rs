//! User and role handlers

use axum::{
    extract::{Path, State},
    Json,
};
use hb_auth::{role_table, RoleEntry};
use hb_core::traits::Id;
use hb_db::UserRepository;
use hb_models::{Entity, Permission, Role, User};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser};

#[derive(Debug, Serialize)]
pub struct Me {
    #[serde(flatten)]
    pub user: User,
    pub role: Option<Role>,
    pub permissions: Vec<&'static str>,
}

/// GET /api/me
pub async fn me(user: AuthenticatedUser) -> Json<Me> {
    let AuthenticatedUser(current) = user;
    Json(Me {
        role: current.primary_role(),
        permissions: current.permissions().iter().map(|p| p.name()).collect(),
        user: current.user,
    })
}

/// GET /api/roles
pub async fn list_roles(_user: AuthenticatedUser) -> Json<Vec<RoleEntry>> {
    Json(role_table())
}

#[derive(Debug, Deserialize)]
pub struct SetRoleBody {
    /// Role id
    pub role: Id,
}

/// POST /api/users/:id/role
///
/// Replaces the user's roles with the given one.
pub async fn set_role(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(body): Json<SetRoleBody>,
) -> ApiResult<Json<User>> {
    if !user.allowed(Permission::ManageSystem) {
        return Err(ApiError::forbidden("You are not allowed to manage users"));
    }

    let role = Role::from_id(body.role).ok_or_else(|| ApiError::not_found("Role", body.role))?;
    let target = state
        .store
        .find_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found(User::TYPE_NAME, id))?;

    if target.roles == [role] {
        return Ok(Json(target));
    }

    state.store.set_role(id, role).await?;
    tracing::info!(user_id = id, role = %role, changed_by = user.id(), "Role changed");

    let updated = state
        .store
        .find_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found(User::TYPE_NAME, id))?;
    Ok(Json(updated))
}

/// GET /api/work_items/available_owners
pub async fn available_owners(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> ApiResult<Json<Vec<User>>> {
    let owners = state
        .store
        .all_users()
        .await?
        .into_iter()
        .filter(|u| !u.has_role(Role::Customer))
        .collect();
    Ok(Json(owners))
}
