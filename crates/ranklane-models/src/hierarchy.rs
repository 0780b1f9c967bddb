//! Derived hierarchy records: ancestor-index rows and rebuild reports.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::ids::UserId;

/// One row of the materialized ancestor index.
///
/// Derived from `UserNode::parent_id` chains, never authoritative.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
pub struct HierarchyEdge {
    pub ancestor_id: UserId,
    pub descendant_id: UserId,
    /// 1 for a direct parent.
    pub distance: u32,
}

/// A node moved by a rebuild because its parent chain was broken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Reattachment {
    pub user_id: UserId,
    pub previous_parent: Option<UserId>,
    /// `None` when the node was promoted to an organization root.
    pub new_parent: Option<UserId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RebuildReport {
    pub nodes: usize,
    pub edges: usize,
    pub reattached: Vec<Reattachment>,
}

impl RebuildReport {
    pub fn is_clean(&self) -> bool {
        self.reattached.is_empty()
    }
}
