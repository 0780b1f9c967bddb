use crate::modules::documents::controller::{
    check_document, delete_document, get_document, get_document_filter, get_documents,
    register_document, set_access_level,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn init_documents_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_documents).post(register_document))
        .route("/check", post(check_document))
        .route("/filter", get(get_document_filter))
        .route("/{id}", get(get_document).delete(delete_document))
        .route("/{id}/access-level", put(set_access_level))
}
