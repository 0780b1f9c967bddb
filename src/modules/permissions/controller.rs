use axum::{
    Json,
    extract::{Path, State},
};
use ranklane_core::AppError;
use ranklane_engine::PermissionFacade;
use ranklane_models::{Actor, PermissionSet, Role, UserId};
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;

use crate::docs::ErrorResponse;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct ManageCheckResponse {
    pub user_id: UserId,
    pub allowed: bool,
}

/// The full role lattice, most senior role first
#[utoipa::path(
    get,
    path = "/api/permissions/roles",
    responses(
        (status = 200, description = "Permission set of every role", body = Vec<PermissionSet>),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Permissions"
)]
#[instrument(skip(state))]
pub async fn get_role_table(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<PermissionSet>>, AppError> {
    let actor = *auth_user.actor();
    state.run(move |engine| engine.permissions(&actor)).await?;

    let table = Role::ALL
        .iter()
        .map(|&role| PermissionFacade::resolve(&Actor { role, ..actor }))
        .collect();
    Ok(Json(table))
}

/// Whether the caller manages a user
#[utoipa::path(
    get,
    path = "/api/permissions/manage/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Management check result", body = ManageCheckResponse),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Permissions"
)]
#[instrument(skip(state))]
pub async fn check_manage(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<UserId>,
) -> Result<Json<ManageCheckResponse>, AppError> {
    let allowed = state.run(move |engine| engine.can_manage(auth_user.actor(), id)).await?;
    Ok(Json(ManageCheckResponse {
        user_id: id,
        allowed,
    }))
}
