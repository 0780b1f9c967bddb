//! Document access resolution.
//!
//! Visibility flows downward only: an ancestor may see a descendant's
//! `hierarchy` document, never the reverse. Cross-branch sharing is only
//! possible through `public`.

use std::collections::BTreeSet;

use ranklane_models::{
    AccessLevel, Actor, DocumentAccessRecord, DocumentFilter, OrganizationId, Role, UserId,
};

use crate::hierarchy::HierarchyStore;

/// The `(owner, level, organization)` triple visibility is decided on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentRef {
    pub owner_id: UserId,
    pub access_level: AccessLevel,
    pub organization_id: OrganizationId,
}

impl From<&DocumentAccessRecord> for DocumentRef {
    fn from(record: &DocumentAccessRecord) -> Self {
        Self {
            owner_id: record.owner_id,
            access_level: record.access_level,
            organization_id: record.organization_id,
        }
    }
}

pub fn can_view(hierarchy: &HierarchyStore, actor: &Actor, doc: DocumentRef) -> bool {
    match doc.access_level {
        AccessLevel::Private => actor.user_id == doc.owner_id,
        AccessLevel::Hierarchy => {
            actor.user_id == doc.owner_id || hierarchy.is_ancestor(actor.user_id, doc.owner_id)
        }
        AccessLevel::Public => actor.organization_id == doc.organization_id,
    }
}

/// Whether `role` may put a document at `level`. Only Students are limited,
/// and only to `private`.
pub fn can_set_access_level(role: Role, level: AccessLevel) -> bool {
    match level {
        AccessLevel::Private => true,
        AccessLevel::Hierarchy | AccessLevel::Public => role.outranks(Role::Student),
    }
}

/// Whether a document owned by `owner_role` may be public at all.
pub fn owner_may_publish(owner_role: Role) -> bool {
    owner_role >= Role::Teacher
}

/// Listing predicate for one actor, captured from a single snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityFilter {
    actor: Actor,
    descendants: BTreeSet<UserId>,
}

impl VisibilityFilter {
    pub fn new(hierarchy: &HierarchyStore, actor: &Actor) -> Self {
        Self {
            actor: *actor,
            descendants: hierarchy.descendants(actor.user_id).collect(),
        }
    }

    /// Same answer as [`can_view`] for every document, checked cheapest
    /// clause first: ownership, then hierarchy membership, then organization.
    pub fn matches(&self, doc: DocumentRef) -> bool {
        if doc.owner_id == self.actor.user_id {
            return true;
        }
        match doc.access_level {
            AccessLevel::Private => false,
            AccessLevel::Hierarchy => self.descendants.contains(&doc.owner_id),
            AccessLevel::Public => doc.organization_id == self.actor.organization_id,
        }
    }

    /// Owners whose `hierarchy` documents pass the filter, the actor included.
    pub fn hierarchy_owners(&self) -> impl Iterator<Item = UserId> + '_ {
        std::iter::once(self.actor.user_id).chain(self.descendants.iter().copied())
    }

    pub fn to_filter(&self) -> DocumentFilter {
        DocumentFilter {
            owner_id: self.actor.user_id,
            hierarchy_owner_ids: self.hierarchy_owners().collect(),
            organization_id: self.actor.organization_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ranklane_models::UserNode;

    fn org() -> OrganizationId {
        OrganizationId::from_u128(100)
    }

    fn id(n: u128) -> UserId {
        UserId::from_u128(n)
    }

    /// Admin 1 -> Supervisor 2 -> Teacher 3 -> Student 4; Supervisor 5 under 1.
    fn sample() -> HierarchyStore {
        let mut store = HierarchyStore::new();
        store
            .insert(UserNode::new(id(1), Role::Admin, org()))
            .unwrap();
        for (n, role, parent) in [
            (2, Role::Supervisor, 1),
            (3, Role::Teacher, 2),
            (4, Role::Student, 3),
            (5, Role::Supervisor, 1),
        ] {
            store
                .insert(UserNode::new(id(n), role, org()).with_parent(id(parent)))
                .unwrap();
        }
        store
    }

    fn doc(owner: u128, level: AccessLevel) -> DocumentRef {
        DocumentRef {
            owner_id: id(owner),
            access_level: level,
            organization_id: org(),
        }
    }

    fn actor(n: u128, role: Role) -> Actor {
        Actor::new(id(n), role, org())
    }

    #[test]
    fn test_private_is_owner_only() {
        let store = sample();
        let d = doc(3, AccessLevel::Private);
        assert!(can_view(&store, &actor(3, Role::Teacher), d));
        assert!(!can_view(&store, &actor(2, Role::Supervisor), d));
        assert!(!can_view(&store, &actor(1, Role::Admin), d));
    }

    #[test]
    fn test_hierarchy_flows_downward_only() {
        let store = sample();
        let d = doc(3, AccessLevel::Hierarchy);
        assert!(can_view(&store, &actor(3, Role::Teacher), d));
        assert!(can_view(&store, &actor(2, Role::Supervisor), d));
        assert!(can_view(&store, &actor(1, Role::Admin), d));
        assert!(!can_view(&store, &actor(4, Role::Student), d));
        assert!(!can_view(&store, &actor(5, Role::Supervisor), d));
    }

    #[test]
    fn test_public_is_organization_wide() {
        let store = sample();
        let d = doc(3, AccessLevel::Public);
        assert!(can_view(&store, &actor(5, Role::Supervisor), d));
        assert!(can_view(&store, &actor(4, Role::Student), d));

        let outsider = Actor::new(id(9), Role::Admin, OrganizationId::from_u128(200));
        assert!(!can_view(&store, &outsider, d));
    }

    #[test]
    fn test_filter_agrees_with_can_view() {
        let store = sample();
        let levels = [AccessLevel::Private, AccessLevel::Hierarchy, AccessLevel::Public];
        let actors = [
            actor(1, Role::Admin),
            actor(2, Role::Supervisor),
            actor(3, Role::Teacher),
            actor(4, Role::Student),
            actor(5, Role::Supervisor),
        ];
        for actor in &actors {
            let filter = VisibilityFilter::new(&store, actor);
            for owner in 1..=5 {
                for level in levels {
                    let d = doc(owner, level);
                    assert_eq!(filter.matches(d), can_view(&store, actor, d));
                }
            }
        }
    }

    #[test]
    fn test_filter_exposes_hierarchy_owners() {
        let store = sample();
        let filter = VisibilityFilter::new(&store, &actor(2, Role::Supervisor)).to_filter();
        assert_eq!(filter.owner_id, id(2));
        assert_eq!(filter.hierarchy_owner_ids.len(), 3);
        assert!(filter.hierarchy_owner_ids.contains(&id(4)));
        assert!(!filter.hierarchy_owner_ids.contains(&id(1)));
    }

    #[test]
    fn test_can_set_access_level() {
        assert!(can_set_access_level(Role::Teacher, AccessLevel::Public));
        assert!(can_set_access_level(Role::Supervisor, AccessLevel::Hierarchy));
        assert!(can_set_access_level(Role::Student, AccessLevel::Private));
        assert!(!can_set_access_level(Role::Student, AccessLevel::Public));
        assert!(!can_set_access_level(Role::Student, AccessLevel::Hierarchy));
    }

    #[test]
    fn test_owner_may_publish() {
        assert!(owner_may_publish(Role::Teacher));
        assert!(owner_may_publish(Role::Admin));
        assert!(!owner_may_publish(Role::Student));
    }
}
