use crate::modules::permissions::controller::{check_manage, get_role_table};
use crate::state::AppState;
use axum::{Router, routing::get};

pub fn init_permissions_router() -> Router<AppState> {
    Router::new()
        .route("/roles", get(get_role_table))
        .route("/manage/{id}", get(check_manage))
}
