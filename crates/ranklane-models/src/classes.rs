//! Class assignments: one teacher, an optional supervising manager, and a set
//! of enrolled students.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{ClassId, PromptId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClassAssignment {
    pub class_id: ClassId,
    pub class_name: String,
    pub teacher_id: UserId,
    /// Supervising ancestor of the teacher, if the branch has one.
    pub supervisor_id: Option<UserId>,
    #[schema(value_type = Vec<String>)]
    pub students: BTreeSet<UserId>,
    pub prompt_ref: Option<PromptId>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl ClassAssignment {
    pub fn new(
        class_name: impl Into<String>,
        teacher_id: UserId,
        supervisor_id: Option<UserId>,
        created_by: UserId,
    ) -> Self {
        Self {
            class_id: ClassId::new(),
            class_name: class_name.into(),
            teacher_id,
            supervisor_id,
            students: BTreeSet::new(),
            prompt_ref: None,
            created_by,
            created_at: Utc::now(),
        }
    }

    pub fn has_student(&self, student_id: UserId) -> bool {
        self.students.contains(&student_id)
    }
}

/// A class plus the display fields of its teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClassSummary {
    #[serde(flatten)]
    pub class: ClassAssignment,
    pub teacher_name: String,
    pub teacher_email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TeacherSummary {
    pub teacher_id: UserId,
    pub teacher_name: String,
    pub class_id: ClassId,
    pub class_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StudentAssignments {
    pub classes: Vec<ClassAssignment>,
    pub teachers: Vec<TeacherSummary>,
}

// DTOs

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateClassDto {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Class name must be between 1 and 100 characters"
    ))]
    pub class_name: String,
    pub teacher_id: UserId,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AssignStudentDto {
    pub student_id: UserId,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AssignPromptDto {
    pub prompt_id: PromptId,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReassignTeacherDto {
    pub teacher_id: UserId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_class_is_empty() {
        let teacher = UserId::new();
        let class = ClassAssignment::new("Algebra", teacher, None, UserId::new());
        assert!(class.students.is_empty());
        assert!(class.prompt_ref.is_none());
        assert_eq!(class.teacher_id, teacher);
    }

    #[test]
    fn test_students_serialize_as_array() {
        let mut class = ClassAssignment::new("Biology", UserId::new(), None, UserId::new());
        let student = UserId::from_u128(9);
        class.students.insert(student);
        class.students.insert(student);

        let json = serde_json::to_value(&class).unwrap();
        assert_eq!(json["students"].as_array().unwrap().len(), 1);
        assert!(class.has_student(student));
    }

    #[test]
    fn test_create_class_dto_rejects_blank_name() {
        let dto = CreateClassDto {
            class_name: String::new(),
            teacher_id: UserId::new(),
        };
        assert!(dto.validate().is_err());
    }
}
