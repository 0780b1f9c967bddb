//! # Ranklane Models
//!
//! Domain records, the role lattice, and request/response DTOs shared by the
//! engine, the HTTP layer, and the CLI.
//!
//! # Modules
//!
//! - [`ids`]: strongly-typed UUID newtypes
//! - [`roles`]: the four ranked roles, creatable-role and page tables
//! - [`actor`]: the verified caller identity and its resolved permission set
//! - [`users`]: delegation-tree nodes and user management DTOs
//! - [`hierarchy`]: ancestor-index rows and rebuild reports
//! - [`classes`]: class assignments and class management DTOs
//! - [`documents`]: document access records and gating DTOs

pub mod actor;
pub mod classes;
pub mod documents;
pub mod hierarchy;
pub mod ids;
pub mod roles;
pub mod users;

pub use actor::{Actor, PermissionSet};
pub use classes::{
    AssignPromptDto, AssignStudentDto, ClassAssignment, ClassSummary, CreateClassDto,
    ReassignTeacherDto, StudentAssignments, TeacherSummary,
};
pub use documents::{
    AccessLevel, DocumentAccessRecord, DocumentCheckDto, DocumentCheckResponse, DocumentFilter,
    RegisterDocumentDto, SetAccessLevelDto, VisibleDocuments,
};
pub use hierarchy::{HierarchyEdge, RebuildReport, Reattachment};
pub use ids::{ClassId, DocumentId, OrganizationId, PromptId, UserId};
pub use roles::{InvalidRole, Page, Role};
pub use users::{
    CreateUserDto, ManagedUser, ManagedUsersQuery, MessageResponse, ProfileQuery, ReparentUserDto,
    StatusChange, UpdateStatusDto, UserNode, UserRelation, UserStatus,
};
