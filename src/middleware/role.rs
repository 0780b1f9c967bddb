//! Coarse role gates.
//!
//! These only look at the verified role claim. They keep obviously
//! unauthorized callers away from a route group; scope checks (ancestry,
//! organization, class membership) always happen in the engine.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use ranklane_core::AppError;
use ranklane_models::Role;
use tracing::warn;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

fn permission_denied() -> AppError {
    AppError::forbidden("Permission denied".to_string())
}

/// Checks that the caller holds at least `minimum` in the role lattice.
pub fn check_role_at_least(auth_user: &AuthUser, minimum: Role) -> Result<(), AppError> {
    if auth_user.role() < minimum {
        warn!(
            actor = %auth_user.user_id(),
            role = %auth_user.role(),
            minimum = %minimum,
            rule = "role_gate",
            "permission denied"
        );
        return Err(permission_denied());
    }
    Ok(())
}

/// Checks that the caller holds one of `allowed_roles` exactly.
pub fn check_any_role(auth_user: &AuthUser, allowed_roles: &[Role]) -> Result<(), AppError> {
    if !allowed_roles.contains(&auth_user.role()) {
        warn!(
            actor = %auth_user.user_id(),
            role = %auth_user.role(),
            rule = "role_gate",
            "permission denied"
        );
        return Err(permission_denied());
    }
    Ok(())
}

/// Middleware that rejects callers below `minimum`.
///
/// ```rust,ignore
/// let routes = Router::new()
///     .route("/hierarchy/rebuild", post(rebuild_hierarchy))
///     .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));
/// ```
pub async fn require_role(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    minimum: Role,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();
    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;
    check_role_at_least(&auth_user, minimum)?;

    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Admin-only routes.
pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_role(State(state), req, next, Role::Admin).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Routes reserved for roles that can create classes (Supervisor and above).
pub async fn require_supervisor(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    match require_role(State(state), req, next, Role::Supervisor).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}
