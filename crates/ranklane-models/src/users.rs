//! Delegation-tree nodes and user management DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{OrganizationId, UserId};
use crate::roles::Role;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    #[default]
    Active,
    /// Soft removal. The node keeps its place in the tree so historical
    /// class and document ownership still resolves.
    Inactive,
    Suspended,
}

/// A user in the delegation tree.
///
/// `parent_id` is the manager who owns the node and is `None` only for root
/// Admins. A parent always outranks its child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserNode {
    pub user_id: UserId,
    pub role: Role,
    pub status: UserStatus,
    pub parent_id: Option<UserId>,
    pub organization_id: OrganizationId,
    pub created_by: Option<UserId>,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserNode {
    pub fn new(user_id: UserId, role: Role, organization_id: OrganizationId) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            role,
            status: UserStatus::Active,
            parent_id: None,
            organization_id,
            created_by: None,
            name: String::new(),
            email: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_parent(mut self, parent_id: UserId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_creator(mut self, created_by: UserId) -> Self {
        self.created_by = Some(created_by);
        self
    }

    pub fn with_profile(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.name = name.into();
        self.email = email.into();
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

// DTOs

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    /// Subject issued by the identity provider. Generated when omitted.
    pub user_id: Option<UserId>,
    pub role: Role,
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: String,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
    /// Manager to attach the user under. Defaults to the caller.
    pub parent_id: Option<UserId>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateStatusDto {
    pub status: UserStatus,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReparentUserDto {
    pub parent_id: UserId,
}

#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
pub struct ManagedUsersQuery {
    /// Include every descendant instead of direct reports only.
    #[serde(default = "default_include_indirect")]
    pub include_indirect: bool,
}

impl Default for ManagedUsersQuery {
    fn default() -> Self {
        Self {
            include_indirect: default_include_indirect(),
        }
    }
}

fn default_include_indirect() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
pub struct ProfileQuery {
    /// Another user's id; the caller's own profile when omitted.
    pub user_id: Option<UserId>,
}

/// How a managed user relates to the manager listing them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRelation {
    Direct,
    Indirect,
    /// Enrolled in one of the listing teacher's classes.
    ClassMember,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ManagedUser {
    #[serde(flatten)]
    pub user: UserNode,
    pub relation: UserRelation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusChange {
    pub user: UserNode,
    /// False when the user already had the requested status.
    pub changed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node_is_active_root() {
        let node = UserNode::new(UserId::new(), Role::Admin, OrganizationId::new());
        assert!(node.is_active());
        assert!(node.is_root());
    }

    #[test]
    fn test_builder_sets_parent_and_profile() {
        let parent = UserId::new();
        let node = UserNode::new(UserId::new(), Role::Teacher, OrganizationId::new())
            .with_parent(parent)
            .with_creator(parent)
            .with_profile("Ada", "ada@example.com");
        assert_eq!(node.parent_id, Some(parent));
        assert_eq!(node.created_by, Some(parent));
        assert_eq!(node.email, "ada@example.com");
        assert!(!node.is_root());
    }

    #[test]
    fn test_create_user_dto_validation() {
        let dto = CreateUserDto {
            user_id: None,
            role: Role::Teacher,
            name: "".to_string(),
            email: "not-an-email".to_string(),
            parent_id: None,
        };
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn test_managed_users_query_defaults_to_indirect() {
        let query: ManagedUsersQuery = serde_json::from_str("{}").unwrap();
        assert!(query.include_indirect);
    }

    #[test]
    fn test_managed_user_flattens_node() {
        let node = UserNode::new(UserId::from_u128(5), Role::Student, OrganizationId::new());
        let json = serde_json::to_value(ManagedUser {
            user: node,
            relation: UserRelation::ClassMember,
        })
        .unwrap();
        assert_eq!(json["role"], "student");
        assert_eq!(json["relation"], "class_member");
    }
}
