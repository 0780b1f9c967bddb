//! The delegation tree.
//!
//! `HierarchyStore` owns every `UserNode` of one organization together with
//! the ancestor index derived from their parent pointers. Every mutation
//! either succeeds with the index updated or fails with both untouched.

use std::collections::HashMap;

use chrono::Utc;
use metrics::counter;
use ranklane_models::{
    Actor, OrganizationId, RebuildReport, Reattachment, Role, UserId, UserNode, UserStatus,
};
use tracing::{info, warn};

use crate::error::EngineError;
use crate::index::AncestorIndex;

#[derive(Debug, Clone, Default)]
pub struct HierarchyStore {
    nodes: HashMap<UserId, UserNode>,
    index: AncestorIndex,
}

impl HierarchyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty store seeded with a previously persisted index. The index is
    /// only consulted by [`rebuild`](Self::rebuild) to find surviving ancestors.
    pub fn with_index(index: AncestorIndex) -> Self {
        Self {
            nodes: HashMap::new(),
            index,
        }
    }

    pub fn get(&self, user_id: UserId) -> Option<&UserNode> {
        self.nodes.get(&user_id)
    }

    pub fn require(&self, user_id: UserId) -> Result<&UserNode, EngineError> {
        self.nodes
            .get(&user_id)
            .ok_or(EngineError::UnknownUser(user_id))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &UserNode> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn index(&self) -> &AncestorIndex {
        &self.index
    }

    /// Adds `node` under `node.parent_id`.
    ///
    /// A node without a parent must be an Admin. Otherwise the parent must
    /// exist, share the organization, and strictly outrank the node.
    pub fn insert(&mut self, node: UserNode) -> Result<(), EngineError> {
        if self.nodes.contains_key(&node.user_id) {
            return Err(EngineError::DuplicateUser(node.user_id));
        }

        match node.parent_id {
            None if node.role != Role::Admin => {
                return Err(EngineError::RoleOrderViolation {
                    child: node.user_id,
                    child_role: node.role,
                    parent_role: None,
                });
            }
            None => {}
            Some(parent_id) => {
                let parent = self.require(parent_id)?;
                check_link(parent, &node)?;
            }
        }

        self.index.insert_leaf(node.user_id, node.parent_id);
        self.nodes.insert(node.user_id, node);
        Ok(())
    }

    /// Moves `node_id` and its subtree under `new_parent_id`.
    pub fn reparent(&mut self, node_id: UserId, new_parent_id: UserId) -> Result<(), EngineError> {
        let node = self.require(node_id)?;
        let parent = self.require(new_parent_id)?;

        if node_id == new_parent_id || self.index.is_ancestor(node_id, new_parent_id) {
            return Err(EngineError::CycleDetected {
                node: node_id,
                new_parent: new_parent_id,
            });
        }
        check_link(parent, node)?;

        if node.parent_id == Some(new_parent_id) {
            return Ok(());
        }

        self.index.move_subtree(node_id, new_parent_id);
        if let Some(node) = self.nodes.get_mut(&node_id) {
            node.parent_id = Some(new_parent_id);
            node.updated_at = Utc::now();
        }
        Ok(())
    }

    /// Sets `status` on a node. Returns `false` when it already had it.
    pub fn set_status(&mut self, user_id: UserId, status: UserStatus) -> Result<bool, EngineError> {
        let node = self
            .nodes
            .get_mut(&user_id)
            .ok_or(EngineError::UnknownUser(user_id))?;
        if node.status == status {
            return Ok(false);
        }
        node.status = status;
        node.updated_at = Utc::now();
        Ok(true)
    }

    pub fn ancestors(&self, user_id: UserId) -> &[UserId] {
        self.index.ancestors(user_id)
    }

    pub fn descendants(&self, user_id: UserId) -> impl Iterator<Item = UserId> + '_ {
        self.index.descendants(user_id)
    }

    #[inline]
    pub fn is_ancestor(&self, ancestor: UserId, descendant: UserId) -> bool {
        self.index.is_ancestor(ancestor, descendant)
    }

    pub fn children(&self, user_id: UserId) -> impl Iterator<Item = &UserNode> + '_ {
        self.nodes
            .values()
            .filter(move |node| node.parent_id == Some(user_id))
    }

    /// Nearest ancestor of `user_id` holding `role`.
    pub fn nearest_with_role(&self, user_id: UserId, role: Role) -> Option<UserId> {
        self.ancestors(user_id)
            .iter()
            .copied()
            .find(|id| self.nodes.get(id).is_some_and(|node| node.role == role))
    }

    /// Management scope: `target` is a strict descendant of the actor, or the
    /// actor is an Admin and `target` belongs to the actor's organization.
    pub fn manages(&self, actor: &Actor, target: UserId) -> bool {
        if actor.user_id == target {
            return false;
        }
        if self.index.is_ancestor(actor.user_id, target) {
            return true;
        }
        actor.is_admin()
            && self
                .nodes
                .get(&target)
                .is_some_and(|node| node.organization_id == actor.organization_id)
    }

    /// Recomputes the tree and its index from `all_nodes`.
    ///
    /// A node whose link to its parent is broken (parent missing, in another
    /// organization, not outranking it, or a parentless non-Admin) is
    /// reattached to the nearest ancestor from the previous index that still
    /// exists and outranks it, or else to its organization's root Admin. A
    /// broken Admin becomes a root itself. Every reattachment is logged and
    /// reported. When a node has nowhere to go the rebuild fails with
    /// `OrphanDetected` and the store is left unchanged.
    pub fn rebuild<I>(&mut self, all_nodes: I) -> Result<RebuildReport, EngineError>
    where
        I: IntoIterator<Item = UserNode>,
    {
        let mut nodes: HashMap<UserId, UserNode> = all_nodes
            .into_iter()
            .map(|node| (node.user_id, node))
            .collect();

        let roots = organization_roots(&nodes);

        let mut broken: Vec<UserId> = nodes
            .values()
            .filter(|node| !link_holds(&nodes, node))
            .map(|node| node.user_id)
            .collect();
        broken.sort_unstable();

        let mut reattached = Vec::with_capacity(broken.len());
        for user_id in broken {
            let node = &nodes[&user_id];
            let new_parent = if node.role == Role::Admin {
                None
            } else {
                let surviving = self.index.ancestors(user_id).iter().copied().find(|id| {
                    nodes.get(id).is_some_and(|candidate| {
                        candidate.organization_id == node.organization_id
                            && candidate.role.outranks(node.role)
                    })
                });
                match surviving.or_else(|| roots.get(&node.organization_id).copied()) {
                    Some(target) => Some(target),
                    None => {
                        warn!(
                            user_id = %user_id,
                            organization_id = %node.organization_id,
                            "orphan has no surviving ancestor or organization root"
                        );
                        return Err(EngineError::OrphanDetected(user_id));
                    }
                }
            };
            reattached.push(Reattachment {
                user_id,
                previous_parent: node.parent_id,
                new_parent,
            });
        }

        let now = Utc::now();
        for event in &reattached {
            warn!(
                user_id = %event.user_id,
                previous_parent = ?event.previous_parent,
                new_parent = ?event.new_parent,
                "orphan detected, node reattached"
            );
            counter!("hierarchy_orphans_reattached_total").increment(1);
            if let Some(node) = nodes.get_mut(&event.user_id) {
                node.parent_id = event.new_parent;
                node.updated_at = now;
            }
        }

        let index =
            AncestorIndex::from_parents(nodes.values().map(|node| (node.user_id, node.parent_id)));
        let report = RebuildReport {
            nodes: nodes.len(),
            edges: index.edge_count(),
            reattached,
        };

        self.nodes = nodes;
        self.index = index;

        counter!("hierarchy_rebuilds_total").increment(1);
        info!(
            nodes = report.nodes,
            edges = report.edges,
            reattached = report.reattached.len(),
            "hierarchy rebuilt"
        );
        Ok(report)
    }

    /// True when every parent outranks its child.
    pub fn parent_order_holds(&self) -> bool {
        self.nodes.values().all(|node| link_holds(&self.nodes, node))
    }

    /// True when the index matches a fresh computation from parent pointers.
    pub fn index_is_consistent(&self) -> bool {
        let fresh = AncestorIndex::from_parents(
            self.nodes
                .values()
                .map(|node| (node.user_id, node.parent_id)),
        );
        fresh == self.index
    }
}

fn check_link(parent: &UserNode, child: &UserNode) -> Result<(), EngineError> {
    if !parent.role.outranks(child.role) {
        return Err(EngineError::RoleOrderViolation {
            child: child.user_id,
            child_role: child.role,
            parent_role: Some(parent.role),
        });
    }
    if parent.organization_id != child.organization_id {
        return Err(EngineError::ForeignOrganization {
            user_id: child.user_id,
            expected: parent.organization_id,
            found: child.organization_id,
        });
    }
    Ok(())
}

fn link_holds(nodes: &HashMap<UserId, UserNode>, node: &UserNode) -> bool {
    match node.parent_id {
        None => node.role == Role::Admin,
        Some(parent_id) => nodes
            .get(&parent_id)
            .is_some_and(|parent| check_link(parent, node).is_ok()),
    }
}

/// Earliest-created parentless Admin of each organization.
fn organization_roots(nodes: &HashMap<UserId, UserNode>) -> HashMap<OrganizationId, UserId> {
    let mut roots: HashMap<OrganizationId, &UserNode> = HashMap::new();
    for node in nodes
        .values()
        .filter(|node| node.role == Role::Admin && node.parent_id.is_none())
    {
        roots
            .entry(node.organization_id)
            .and_modify(|current| {
                if (node.created_at, node.user_id) < (current.created_at, current.user_id) {
                    *current = node;
                }
            })
            .or_insert(node);
    }
    roots
        .into_iter()
        .map(|(org, node)| (org, node.user_id))
        .collect()
}
