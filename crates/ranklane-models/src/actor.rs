//! The verified caller identity.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::ids::{OrganizationId, UserId};
use crate::roles::{Page, Role};

/// An already-verified `(user_id, role, organization_id)` tuple.
///
/// Every engine call receives one explicitly; the engine never validates
/// credentials and keeps no ambient "current user".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
    pub organization_id: OrganizationId,
}

impl Actor {
    pub fn new(user_id: UserId, role: Role, organization_id: OrganizationId) -> Self {
        Self {
            user_id,
            role,
            organization_id,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Static capabilities of a role, as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PermissionSet {
    pub role: Role,
    pub accessible_pages: Vec<Page>,
    pub creatable_roles: Vec<Role>,
    /// 0 is the most senior role.
    pub role_level: u8,
}

impl PermissionSet {
    pub fn for_role(role: Role) -> Self {
        Self {
            role,
            accessible_pages: role.accessible_pages().to_vec(),
            creatable_roles: role.creatable_roles().to_vec(),
            role_level: role.level(),
        }
    }
}
