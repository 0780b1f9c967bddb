use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use ranklane_core::AppError;
use ranklane_models::{
    AssignPromptDto, AssignStudentDto, ClassAssignment, ClassId, ClassSummary, CreateClassDto,
    MessageResponse, ReassignTeacherDto, StudentAssignments, TeacherSummary, UserId, UserNode,
};
use tracing::instrument;

use crate::docs::ErrorResponse;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::{AppJson, ValidatedJson};

/// Create a class for a teacher in the caller's scope
#[utoipa::path(
    post,
    path = "/api/classes",
    request_body = CreateClassDto,
    responses(
        (status = 201, description = "Class created", body = ClassAssignment),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse),
        (status = 422, description = "Target is not a teacher", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn create_class(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateClassDto>,
) -> Result<(StatusCode, Json<ClassAssignment>), AppError> {
    let class = state.run(move |engine| engine.create_class(auth_user.actor(), dto)).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

/// List the classes visible to the caller
#[utoipa::path(
    get,
    path = "/api/classes",
    responses(
        (status = 200, description = "Visible classes with teacher details", body = Vec<ClassSummary>),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn get_classes(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<ClassSummary>>, AppError> {
    let classes = state.run(move |engine| engine.classes_visible_to(auth_user.actor())).await?;
    Ok(Json(classes))
}

/// Delete a class
#[utoipa::path(
    delete,
    path = "/api/classes/{id}",
    params(("id" = String, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn delete_class(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<ClassId>,
) -> Result<Json<MessageResponse>, AppError> {
    state.run(move |engine| engine.delete_class(auth_user.actor(), id)).await?;
    Ok(Json(MessageResponse::new("Class deleted successfully")))
}

/// Enroll a student in a class
#[utoipa::path(
    post,
    path = "/api/classes/{id}/students",
    params(("id" = String, Path, description = "Class ID")),
    request_body = AssignStudentDto,
    responses(
        (status = 200, description = "Student enrolled", body = ClassAssignment),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse),
        (status = 409, description = "Student already enrolled", body = ErrorResponse),
        (status = 422, description = "Target is not a student", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn assign_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<ClassId>,
    AppJson(dto): AppJson<AssignStudentDto>,
) -> Result<Json<ClassAssignment>, AppError> {
    let class = state
        .run(move |engine| engine.assign_student(auth_user.actor(), id, dto.student_id))
        .await?;
    Ok(Json(class))
}

/// Remove a student from a class
#[utoipa::path(
    delete,
    path = "/api/classes/{id}/students/{student_id}",
    params(
        ("id" = String, Path, description = "Class ID"),
        ("student_id" = String, Path, description = "Student user ID")
    ),
    responses(
        (status = 200, description = "Student removed", body = ClassAssignment),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse),
        (status = 409, description = "Student was not enrolled", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn unassign_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((id, student_id)): Path<(ClassId, UserId)>,
) -> Result<Json<ClassAssignment>, AppError> {
    let class = state
        .run(move |engine| engine.unassign_student(auth_user.actor(), id, student_id))
        .await?;
    Ok(Json(class))
}

/// Hand a class over to another teacher in the same branch
#[utoipa::path(
    put,
    path = "/api/classes/{id}/teacher",
    params(("id" = String, Path, description = "Class ID")),
    request_body = ReassignTeacherDto,
    responses(
        (status = 200, description = "Teacher reassigned", body = ClassAssignment),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse),
        (status = 422, description = "Target is not a teacher", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn reassign_teacher(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<ClassId>,
    AppJson(dto): AppJson<ReassignTeacherDto>,
) -> Result<Json<ClassAssignment>, AppError> {
    let class = state
        .run(move |engine| engine.reassign_teacher(auth_user.actor(), id, dto.teacher_id))
        .await?;
    Ok(Json(class))
}

/// Attach a prompt template to a class
#[utoipa::path(
    post,
    path = "/api/classes/{id}/prompt",
    params(("id" = String, Path, description = "Class ID")),
    request_body = AssignPromptDto,
    responses(
        (status = 200, description = "Prompt attached", body = ClassAssignment),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn assign_prompt(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<ClassId>,
    AppJson(dto): AppJson<AssignPromptDto>,
) -> Result<Json<ClassAssignment>, AppError> {
    let class = state
        .run(move |engine| engine.assign_prompt(auth_user.actor(), id, dto.prompt_id))
        .await?;
    Ok(Json(class))
}

/// Detach the prompt template from a class
#[utoipa::path(
    delete,
    path = "/api/classes/{id}/prompt",
    params(("id" = String, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Prompt cleared", body = ClassAssignment),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn clear_prompt(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<ClassId>,
) -> Result<Json<ClassAssignment>, AppError> {
    let class = state.run(move |engine| engine.clear_prompt(auth_user.actor(), id)).await?;
    Ok(Json(class))
}

/// Classes taught by a teacher
#[utoipa::path(
    get,
    path = "/api/teachers/{id}/classes",
    params(("id" = String, Path, description = "Teacher user ID")),
    responses(
        (status = 200, description = "Classes taught", body = Vec<ClassAssignment>),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn get_teacher_classes(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<UserId>,
) -> Result<Json<Vec<ClassAssignment>>, AppError> {
    let classes = state.run(move |engine| engine.teacher_classes(auth_user.actor(), id)).await?;
    Ok(Json(classes))
}

/// Students enrolled across a teacher's classes
#[utoipa::path(
    get,
    path = "/api/teachers/{id}/students",
    params(("id" = String, Path, description = "Teacher user ID")),
    responses(
        (status = 200, description = "Enrolled students", body = Vec<UserNode>),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn get_teacher_students(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<UserId>,
) -> Result<Json<Vec<UserNode>>, AppError> {
    let students = state.run(move |engine| engine.teacher_students(auth_user.actor(), id)).await?;
    Ok(Json(students))
}

/// Teachers of the classes a student attends
#[utoipa::path(
    get,
    path = "/api/students/{id}/teachers",
    params(("id" = String, Path, description = "Student user ID")),
    responses(
        (status = 200, description = "Teachers per class", body = Vec<TeacherSummary>),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn get_student_teachers(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<UserId>,
) -> Result<Json<Vec<TeacherSummary>>, AppError> {
    let teachers = state.run(move |engine| engine.student_teachers(auth_user.actor(), id)).await?;
    Ok(Json(teachers))
}

/// Classes and teachers of a student
#[utoipa::path(
    get,
    path = "/api/students/{id}/assignments",
    params(("id" = String, Path, description = "Student user ID")),
    responses(
        (status = 200, description = "Student's classes and teachers", body = StudentAssignments),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn get_student_assignments(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<UserId>,
) -> Result<Json<StudentAssignments>, AppError> {
    let assignments = state
        .run(move |engine| engine.student_assignments(auth_user.actor(), id))
        .await?;
    Ok(Json(assignments))
}
