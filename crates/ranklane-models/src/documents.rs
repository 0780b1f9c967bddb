//! Document access records. Content lives in the external document service;
//! only ownership and access level are tracked here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::ids::{DocumentId, OrganizationId, UserId};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    /// Owner only.
    #[default]
    Private,
    /// Owner and the owner's ancestors.
    Hierarchy,
    /// Everyone in the owner's organization.
    Public,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DocumentAccessRecord {
    pub document_id: DocumentId,
    pub owner_id: UserId,
    pub access_level: AccessLevel,
    pub organization_id: OrganizationId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentAccessRecord {
    pub fn new(
        document_id: DocumentId,
        owner_id: UserId,
        access_level: AccessLevel,
        organization_id: OrganizationId,
    ) -> Self {
        let now = Utc::now();
        Self {
            document_id,
            owner_id,
            access_level,
            organization_id,
            created_at: now,
            updated_at: now,
        }
    }
}

// DTOs

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterDocumentDto {
    /// Id assigned by the document service. Generated when omitted.
    pub document_id: Option<DocumentId>,
    #[serde(default)]
    pub access_level: AccessLevel,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetAccessLevelDto {
    pub access_level: AccessLevel,
}

/// Gate check for a document the engine does not track itself.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DocumentCheckDto {
    pub owner_id: UserId,
    pub access_level: AccessLevel,
    /// Defaults to the caller's organization.
    pub organization_id: Option<OrganizationId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DocumentCheckResponse {
    pub allowed: bool,
}

/// Listing predicate in a form an external vector store can apply:
/// `owner_id = $owner_id OR (access_level = 'hierarchy' AND owner_id IN $hierarchy_owner_ids)
/// OR (access_level = 'public' AND organization_id = $organization_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DocumentFilter {
    pub owner_id: UserId,
    pub hierarchy_owner_ids: Vec<UserId>,
    pub organization_id: OrganizationId,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VisibleDocuments {
    pub documents: Vec<DocumentAccessRecord>,
    pub filter: DocumentFilter,
}
