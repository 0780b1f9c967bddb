use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use ranklane_core::AppError;
use ranklane_models::{
    DocumentAccessRecord, DocumentCheckDto, DocumentCheckResponse, DocumentFilter, DocumentId,
    MessageResponse, RegisterDocumentDto, SetAccessLevelDto, VisibleDocuments,
};
use tracing::instrument;

use crate::docs::ErrorResponse;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::AppJson;

/// Register an uploaded document owned by the caller
#[utoipa::path(
    post,
    path = "/api/documents",
    request_body = RegisterDocumentDto,
    responses(
        (status = 201, description = "Document registered", body = DocumentAccessRecord),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse),
        (status = 422, description = "Document already registered", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Documents"
)]
#[instrument(skip(state))]
pub async fn register_document(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppJson(dto): AppJson<RegisterDocumentDto>,
) -> Result<(StatusCode, Json<DocumentAccessRecord>), AppError> {
    let record = state.run(move |engine| engine.register_document(auth_user.actor(), dto)).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// List every registered document the caller may view
#[utoipa::path(
    get,
    path = "/api/documents",
    responses(
        (status = 200, description = "Visible documents and the filter that selected them", body = VisibleDocuments),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Documents"
)]
#[instrument(skip(state))]
pub async fn get_documents(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<VisibleDocuments>, AppError> {
    let (documents, filter) = state
        .run(move |engine| engine.list_visible_documents(auth_user.actor()))
        .await?;
    Ok(Json(VisibleDocuments {
        documents,
        filter: filter.to_filter(),
    }))
}

/// Listing predicate for an external document store
#[utoipa::path(
    get,
    path = "/api/documents/filter",
    responses(
        (status = 200, description = "Owner and organization sets for the caller's listing query", body = DocumentFilter),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Documents"
)]
#[instrument(skip(state))]
pub async fn get_document_filter(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<DocumentFilter>, AppError> {
    let filter = state.run(move |engine| engine.authorize_document_list(auth_user.actor())).await?;
    Ok(Json(filter.to_filter()))
}

/// Get a registered document the caller may view
#[utoipa::path(
    get,
    path = "/api/documents/{id}",
    params(("id" = String, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document access record", body = DocumentAccessRecord),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Documents"
)]
#[instrument(skip(state))]
pub async fn get_document(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DocumentId>,
) -> Result<Json<DocumentAccessRecord>, AppError> {
    let record = state
        .run(move |engine| engine.authorize_document_view(auth_user.actor(), id))
        .await?;
    Ok(Json(record))
}

/// Change a document's access level
#[utoipa::path(
    put,
    path = "/api/documents/{id}/access-level",
    params(("id" = String, Path, description = "Document ID")),
    request_body = SetAccessLevelDto,
    responses(
        (status = 200, description = "Access level updated", body = DocumentAccessRecord),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Documents"
)]
#[instrument(skip(state))]
pub async fn set_access_level(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DocumentId>,
    AppJson(dto): AppJson<SetAccessLevelDto>,
) -> Result<Json<DocumentAccessRecord>, AppError> {
    let record = state
        .run(move |engine| engine.set_access_level(auth_user.actor(), id, dto.access_level))
        .await?;
    Ok(Json(record))
}

/// Stop tracking a document
#[utoipa::path(
    delete,
    path = "/api/documents/{id}",
    params(("id" = String, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document removed", body = MessageResponse),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Documents"
)]
#[instrument(skip(state))]
pub async fn delete_document(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DocumentId>,
) -> Result<Json<MessageResponse>, AppError> {
    state.run(move |engine| engine.remove_document(auth_user.actor(), id)).await?;
    Ok(Json(MessageResponse::new("Document removed successfully")))
}

/// Allow/deny for a document held by another service
#[utoipa::path(
    post,
    path = "/api/documents/check",
    request_body = DocumentCheckDto,
    responses(
        (status = 200, description = "Whether the caller may view the document", body = DocumentCheckResponse),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Documents"
)]
#[instrument(skip(state))]
pub async fn check_document(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppJson(dto): AppJson<DocumentCheckDto>,
) -> Result<Json<DocumentCheckResponse>, AppError> {
    let allowed = state.run(move |engine| engine.check_document(auth_user.actor(), &dto)).await?;
    Ok(Json(DocumentCheckResponse { allowed }))
}
