use crate::middleware::role::require_supervisor;
use crate::modules::classes::controller::{
    assign_prompt, assign_student, clear_prompt, create_class, delete_class, get_classes,
    get_student_assignments, get_student_teachers, get_teacher_classes, get_teacher_students,
    reassign_teacher, unassign_student,
};
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

pub fn init_classes_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(get_classes))
        .route("/{id}/students", post(assign_student))
        .route("/{id}/students/{student_id}", delete(unassign_student))
        .route("/{id}/prompt", post(assign_prompt).delete(clear_prompt))
        .merge(
            Router::new()
                .route("/", post(create_class))
                .route("/{id}", delete(delete_class))
                .route("/{id}/teacher", put(reassign_teacher))
                .route_layer(middleware::from_fn_with_state(state, require_supervisor)),
        )
}

pub fn init_teachers_router() -> Router<AppState> {
    Router::new()
        .route("/{id}/classes", get(get_teacher_classes))
        .route("/{id}/students", get(get_teacher_students))
}

pub fn init_students_router() -> Router<AppState> {
    Router::new()
        .route("/{id}/teachers", get(get_student_teachers))
        .route("/{id}/assignments", get(get_student_assignments))
}
