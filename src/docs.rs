use serde::Serialize;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

use crate::modules::permissions::controller::ManageCheckResponse;
use ranklane_models::{
    AccessLevel, Actor, AssignPromptDto, AssignStudentDto, ClassAssignment, ClassSummary,
    CreateClassDto, CreateUserDto, DocumentAccessRecord, DocumentCheckDto, DocumentCheckResponse,
    DocumentFilter, ManagedUser, MessageResponse, Page, PermissionSet, ReassignTeacherDto,
    RebuildReport, Reattachment, RegisterDocumentDto, ReparentUserDto, Role, SetAccessLevelDto,
    StatusChange, StudentAssignments, TeacherSummary, UpdateStatusDto, UserNode, UserRelation,
    UserStatus, VisibleDocuments,
};

/// Body of every error response.
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::users::controller::get_permissions,
        crate::modules::users::controller::get_profile,
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::get_managed_users,
        crate::modules::users::controller::update_status,
        crate::modules::users::controller::reparent_user,
        crate::modules::users::controller::rebuild_hierarchy,
        crate::modules::classes::controller::create_class,
        crate::modules::classes::controller::get_classes,
        crate::modules::classes::controller::delete_class,
        crate::modules::classes::controller::assign_student,
        crate::modules::classes::controller::unassign_student,
        crate::modules::classes::controller::reassign_teacher,
        crate::modules::classes::controller::assign_prompt,
        crate::modules::classes::controller::clear_prompt,
        crate::modules::classes::controller::get_teacher_classes,
        crate::modules::classes::controller::get_teacher_students,
        crate::modules::classes::controller::get_student_teachers,
        crate::modules::classes::controller::get_student_assignments,
        crate::modules::documents::controller::register_document,
        crate::modules::documents::controller::get_documents,
        crate::modules::documents::controller::get_document_filter,
        crate::modules::documents::controller::get_document,
        crate::modules::documents::controller::set_access_level,
        crate::modules::documents::controller::delete_document,
        crate::modules::documents::controller::check_document,
        crate::modules::permissions::controller::get_role_table,
        crate::modules::permissions::controller::check_manage,
    ),
    components(
        schemas(
            Role,
            Page,
            Actor,
            PermissionSet,
            UserStatus,
            UserNode,
            UserRelation,
            ManagedUser,
            StatusChange,
            CreateUserDto,
            UpdateStatusDto,
            ReparentUserDto,
            RebuildReport,
            Reattachment,
            ClassAssignment,
            ClassSummary,
            TeacherSummary,
            StudentAssignments,
            CreateClassDto,
            AssignStudentDto,
            AssignPromptDto,
            ReassignTeacherDto,
            AccessLevel,
            DocumentAccessRecord,
            RegisterDocumentDto,
            SetAccessLevelDto,
            DocumentCheckDto,
            DocumentCheckResponse,
            DocumentFilter,
            VisibleDocuments,
            ManageCheckResponse,
            MessageResponse,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Users", description = "Delegation tree and user management"),
        (name = "Classes", description = "Classes, enrollment and teacher/student lookups"),
        (name = "Documents", description = "Document access levels and visibility checks"),
        (name = "Permissions", description = "Role lattice and management checks")
    ),
    info(
        title = "Ranklane API",
        version = "0.1.0",
        description = "Hierarchical role-based permission engine for organizations of admins, supervisors, teachers and students.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
