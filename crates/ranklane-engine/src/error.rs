//! Engine error taxonomy and its mapping onto HTTP errors.

use anyhow::anyhow;
use ranklane_core::AppError;
use ranklane_models::{ClassId, DocumentId, InvalidRole, OrganizationId, Role, UserId};
use thiserror::Error;

/// Every failure the engine can report.
///
/// Structural violations (`RoleOrderViolation`, `CycleDetected`,
/// `ForeignOrganization`) abort the mutation with no partial index update and
/// are never worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("parent role {parent_role:?} does not outrank {child_role} for {child}")]
    RoleOrderViolation {
        child: UserId,
        child_role: Role,
        parent_role: Option<Role>,
    },

    #[error("{user_id} belongs to {found}, expected {expected}")]
    ForeignOrganization {
        user_id: UserId,
        expected: OrganizationId,
        found: OrganizationId,
    },

    #[error("moving {node} under {new_parent} would create a cycle")]
    CycleDetected { node: UserId, new_parent: UserId },

    #[error("{target} is outside the scope of {actor}")]
    OutOfScope { actor: UserId, target: UserId },

    #[error("{0} is not a teacher")]
    NotATeacher(UserId),

    #[error("{0} is not a student")]
    NotAStudent(UserId),

    #[error("{student_id} is already assigned to class {class_id}")]
    AlreadyAssigned {
        class_id: ClassId,
        student_id: UserId,
    },

    #[error("{student_id} is not assigned to class {class_id}")]
    NotAssigned {
        class_id: ClassId,
        student_id: UserId,
    },

    #[error("no surviving ancestor or organization root for {0}")]
    OrphanDetected(UserId),

    #[error(transparent)]
    InvalidRole(#[from] InvalidRole),

    #[error("permission denied")]
    PermissionDenied,

    #[error("unknown user {0}")]
    UnknownUser(UserId),

    #[error("unknown class {0}")]
    UnknownClass(ClassId),

    #[error("unknown document {0}")]
    UnknownDocument(DocumentId),

    #[error("user {0} already exists")]
    DuplicateUser(UserId),

    #[error("document {0} is already registered")]
    DuplicateDocument(DocumentId),

    #[error("actor {0} is not active")]
    InactiveActor(UserId),

    #[error("storage error: {0}")]
    Storage(String),
}

impl EngineError {
    /// Audit rule name for errors the façade reports as `PermissionDenied`.
    ///
    /// Returns `None` for errors that are passed through unchanged.
    pub fn denial_rule(&self) -> Option<&'static str> {
        match self {
            EngineError::OutOfScope { .. } => Some("out_of_scope"),
            EngineError::InactiveActor(_) => Some("inactive_actor"),
            EngineError::UnknownUser(_) => Some("unknown_user"),
            EngineError::UnknownClass(_) => Some("unknown_class"),
            EngineError::UnknownDocument(_) => Some("unknown_document"),
            _ => None,
        }
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::PermissionDenied => AppError::forbidden("Permission denied".to_string()),
            EngineError::AlreadyAssigned { .. } | EngineError::NotAssigned { .. } => {
                AppError::conflict(anyhow!("Request made no change"))
            }
            EngineError::InvalidRole(_) => AppError::bad_request(anyhow!("Invalid role")),
            EngineError::Storage(msg) => {
                tracing::error!(error = %msg, "partition storage failure");
                AppError::internal_error("Internal server error".to_string())
            }
            _ => AppError::unprocessable(anyhow!("Request could not be completed")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_is_forbidden_verbatim() {
        let err: AppError = EngineError::PermissionDenied.into();
        assert_eq!(err.status.as_u16(), 403);
        assert_eq!(err.error.to_string(), "Permission denied");
    }

    #[test]
    fn test_structural_errors_are_collapsed() {
        let child = UserId::new();
        let err: AppError = EngineError::CycleDetected {
            node: child,
            new_parent: UserId::new(),
        }
        .into();
        assert_eq!(err.status.as_u16(), 422);
        assert_eq!(err.error.to_string(), "Request could not be completed");
        assert!(!err.error.to_string().contains(&child.to_string()));
    }

    #[test]
    fn test_no_op_errors_are_conflicts() {
        let err: AppError = EngineError::AlreadyAssigned {
            class_id: ClassId::new(),
            student_id: UserId::new(),
        }
        .into();
        assert_eq!(err.status.as_u16(), 409);
    }

    #[test]
    fn test_invalid_role_is_bad_request() {
        let err: AppError = EngineError::from(InvalidRole("owner".to_string())).into();
        assert_eq!(err.status.as_u16(), 400);
    }

    #[test]
    fn test_denial_rules() {
        assert_eq!(
            EngineError::InactiveActor(UserId::new()).denial_rule(),
            Some("inactive_actor")
        );
        assert_eq!(EngineError::PermissionDenied.denial_rule(), None);
        assert_eq!(EngineError::NotATeacher(UserId::new()).denial_rule(), None);
    }
}
