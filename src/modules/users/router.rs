use crate::middleware::role::require_admin;
use crate::modules::users::controller::{
    create_user, get_managed_users, get_permissions, get_profile, rebuild_hierarchy,
    reparent_user, update_status,
};
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post, put},
};

pub fn init_users_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(create_user))
        .route("/permissions", get(get_permissions))
        .route("/profile", get(get_profile))
        .route("/managed", get(get_managed_users))
        .route("/{id}/status", put(update_status))
        .route("/{id}/parent", put(reparent_user))
        .merge(
            Router::new()
                .route("/hierarchy/rebuild", post(rebuild_hierarchy))
                .route_layer(middleware::from_fn_with_state(state, require_admin)),
        )
}
