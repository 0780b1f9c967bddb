use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use ranklane_core::AppError;
use ranklane_models::{
    CreateUserDto, ManagedUser, ManagedUsersQuery, PermissionSet, ProfileQuery, RebuildReport,
    ReparentUserDto, StatusChange, UpdateStatusDto, UserId, UserNode,
};
use tracing::instrument;

use crate::docs::ErrorResponse;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::{AppJson, ValidatedJson};

/// Get the caller's resolved permission set
#[utoipa::path(
    get,
    path = "/api/users/permissions",
    responses(
        (status = 200, description = "Pages and creatable roles for the caller's role", body = PermissionSet),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_permissions(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<PermissionSet>, AppError> {
    let permissions = state.run(move |engine| engine.permissions(auth_user.actor())).await?;
    Ok(Json(permissions))
}

/// Get the caller's profile, or the profile of a user they manage
#[utoipa::path(
    get,
    path = "/api/users/profile",
    params(ProfileQuery),
    responses(
        (status = 200, description = "User profile", body = UserNode),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<ProfileQuery>,
) -> Result<Json<UserNode>, AppError> {
    let user = state.run(move |engine| engine.get_user(auth_user.actor(), query.user_id)).await?;
    Ok(Json(user))
}

/// Create a user below the caller in the delegation tree
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created", body = UserNode),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse),
        (status = 422, description = "Request could not be completed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn create_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateUserDto>,
) -> Result<(StatusCode, Json<UserNode>), AppError> {
    let user = state.run(move |engine| engine.create_user(auth_user.actor(), dto)).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// List the users the caller manages
#[utoipa::path(
    get,
    path = "/api/users/managed",
    params(ManagedUsersQuery),
    responses(
        (status = 200, description = "Managed users, most senior first", body = Vec<ManagedUser>),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_managed_users(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<ManagedUsersQuery>,
) -> Result<Json<Vec<ManagedUser>>, AppError> {
    let users = state
        .run(move |engine| engine.list_managed_users(auth_user.actor(), query.include_indirect))
        .await?;
    Ok(Json(users))
}

/// Activate, deactivate or suspend a managed user
#[utoipa::path(
    put,
    path = "/api/users/{id}/status",
    params(("id" = String, Path, description = "User ID")),
    request_body = UpdateStatusDto,
    responses(
        (status = 200, description = "Status applied; `changed` is false when it was already set", body = StatusChange),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn update_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<UserId>,
    AppJson(dto): AppJson<UpdateStatusDto>,
) -> Result<Json<StatusChange>, AppError> {
    let change = state
        .run(move |engine| engine.update_status(auth_user.actor(), id, dto.status))
        .await?;
    Ok(Json(change))
}

/// Move a managed user (and their subtree) under a new parent
#[utoipa::path(
    put,
    path = "/api/users/{id}/parent",
    params(("id" = String, Path, description = "User ID")),
    request_body = ReparentUserDto,
    responses(
        (status = 200, description = "User reparented", body = UserNode),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse),
        (status = 422, description = "Role order or cycle violation", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn reparent_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<UserId>,
    AppJson(dto): AppJson<ReparentUserDto>,
) -> Result<Json<UserNode>, AppError> {
    let user = state
        .run(move |engine| engine.reparent_user(auth_user.actor(), id, dto.parent_id))
        .await?;
    Ok(Json(user))
}

/// Recompute the ancestor index of the caller's organization (Admin only)
#[utoipa::path(
    post,
    path = "/api/users/hierarchy/rebuild",
    responses(
        (status = 200, description = "Rebuild report with every orphan reattachment", body = RebuildReport),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn rebuild_hierarchy(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<RebuildReport>, AppError> {
    let report = state.run(move |engine| engine.rebuild_hierarchy(auth_user.actor())).await?;
    Ok(Json(report))
}
