//! The role lattice.
//!
//! Four roles in a fixed total order, `Student < Teacher < Supervisor < Admin`,
//! plus the two capability tables derived from it: which roles a role may
//! create, and which pages a role may reach. Everything that needs to reason
//! about roles goes through [`Role`]; there is no string-based dispatch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;

/// Raised when a role claim or request field names no known role.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid role: {0}")]
pub struct InvalidRole(pub String);

/// A user's rank in the delegation tree.
///
/// Variant order is the lattice order, so the derived `Ord` is authoritative:
/// `Role::Admin > Role::Supervisor > Role::Teacher > Role::Student`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Teacher,
    Supervisor,
    Admin,
}

/// A feature area of the product UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Upload,
    Documents,
    Chat,
    Search,
    Config,
    Health,
    Users,
}

const ADMIN_CREATES: &[Role] = &[Role::Supervisor, Role::Teacher, Role::Student];
const SUPERVISOR_CREATES: &[Role] = &[Role::Teacher, Role::Student];

const ADMIN_PAGES: &[Page] = &[
    Page::Upload,
    Page::Documents,
    Page::Chat,
    Page::Search,
    Page::Config,
    Page::Health,
    Page::Users,
];
const SUPERVISOR_PAGES: &[Page] = &[
    Page::Upload,
    Page::Documents,
    Page::Chat,
    Page::Search,
    Page::Users,
];
const TEACHER_PAGES: &[Page] = &[Page::Upload, Page::Documents, Page::Chat, Page::Users];
const STUDENT_PAGES: &[Page] = &[Page::Chat, Page::Users];

impl Role {
    /// Every role, most senior first.
    pub const ALL: [Role; 4] = [Role::Admin, Role::Supervisor, Role::Teacher, Role::Student];

    /// True iff `self` is strictly senior to `other`.
    #[inline]
    pub fn outranks(self, other: Role) -> bool {
        self > other
    }

    /// Authority level reported to clients: 0 is the most senior role.
    pub fn level(self) -> u8 {
        match self {
            Role::Admin => 0,
            Role::Supervisor => 1,
            Role::Teacher => 2,
            Role::Student => 3,
        }
    }

    /// Roles this role may create accounts for. Teachers manage students
    /// through classes but never create accounts.
    pub fn creatable_roles(self) -> &'static [Role] {
        match self {
            Role::Admin => ADMIN_CREATES,
            Role::Supervisor => SUPERVISOR_CREATES,
            Role::Teacher | Role::Student => &[],
        }
    }

    pub fn can_create(self, target: Role) -> bool {
        self.creatable_roles().contains(&target)
    }

    pub fn accessible_pages(self) -> &'static [Page] {
        match self {
            Role::Admin => ADMIN_PAGES,
            Role::Supervisor => SUPERVISOR_PAGES,
            Role::Teacher => TEACHER_PAGES,
            Role::Student => STUDENT_PAGES,
        }
    }

    pub fn can_access(self, page: Page) -> bool {
        self.accessible_pages().contains(&page)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Supervisor => "supervisor",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = InvalidRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "supervisor" => Ok(Role::Supervisor),
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            _ => Err(InvalidRole(s.to_string())),
        }
    }
}

impl Page {
    pub fn as_str(self) -> &'static str {
        match self {
            Page::Upload => "upload",
            Page::Documents => "documents",
            Page::Chat => "chat",
            Page::Search => "search",
            Page::Config => "config",
            Page::Health => "health",
            Page::Users => "users",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_order() {
        assert!(Role::Admin.outranks(Role::Supervisor));
        assert!(Role::Supervisor.outranks(Role::Teacher));
        assert!(Role::Teacher.outranks(Role::Student));
        assert!(Role::Admin.outranks(Role::Student));
    }

    #[test]
    fn test_outranks_is_strict() {
        for role in Role::ALL {
            assert!(!role.outranks(role), "{role} must not outrank itself");
        }
        assert!(!Role::Student.outranks(Role::Teacher));
    }

    #[test]
    fn test_levels_follow_order() {
        assert_eq!(Role::Admin.level(), 0);
        assert_eq!(Role::Student.level(), 3);
        for pair in Role::ALL.windows(2) {
            assert!(pair[0].level() < pair[1].level());
        }
    }

    #[test]
    fn test_creatable_roles_table() {
        assert_eq!(
            Role::Admin.creatable_roles(),
            &[Role::Supervisor, Role::Teacher, Role::Student]
        );
        assert_eq!(
            Role::Supervisor.creatable_roles(),
            &[Role::Teacher, Role::Student]
        );
        assert!(Role::Teacher.creatable_roles().is_empty());
        assert!(Role::Student.creatable_roles().is_empty());
    }

    #[test]
    fn test_creatable_roles_are_always_outranked() {
        for role in Role::ALL {
            for target in role.creatable_roles() {
                assert!(role.outranks(*target));
            }
        }
    }

    #[test]
    fn test_admin_cannot_create_admin() {
        assert!(!Role::Admin.can_create(Role::Admin));
        assert!(Role::Admin.can_create(Role::Supervisor));
    }

    #[test]
    fn test_accessible_pages_table() {
        assert_eq!(Role::Admin.accessible_pages().len(), 7);
        assert!(Role::Admin.can_access(Page::Config));
        assert!(Role::Admin.can_access(Page::Health));

        assert!(!Role::Supervisor.can_access(Page::Config));
        assert!(!Role::Supervisor.can_access(Page::Health));
        assert!(Role::Supervisor.can_access(Page::Search));

        assert_eq!(
            Role::Teacher.accessible_pages(),
            &[Page::Upload, Page::Documents, Page::Chat, Page::Users]
        );
        assert_eq!(Role::Student.accessible_pages(), &[Page::Chat, Page::Users]);
    }

    #[test]
    fn test_parse_role() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!(" Teacher ".parse::<Role>(), Ok(Role::Teacher));
        assert_eq!(
            "principal".parse::<Role>(),
            Err(InvalidRole("principal".to_string()))
        );
    }

    #[test]
    fn test_role_serde_is_snake_case() {
        assert_eq!(
            serde_json::to_string(&Role::Supervisor).unwrap(),
            "\"supervisor\""
        );
        let role: Role = serde_json::from_str("\"student\"").unwrap();
        assert_eq!(role, Role::Student);
        assert!(serde_json::from_str::<Role>("\"root\"").is_err());
    }
}
