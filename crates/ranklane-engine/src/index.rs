//! Materialized ancestor index.
//!
//! For every node the index stores its full ancestor chain (nearest first)
//! and, for every ancestor, the set of its descendants. `is_ancestor` is a
//! single hash lookup; no query walks parent pointers.

use std::collections::{HashMap, HashSet};
use std::iter;

use ranklane_models::{HierarchyEdge, UserId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AncestorIndex {
    ancestors: HashMap<UserId, Vec<UserId>>,
    descendants: HashMap<UserId, HashSet<UserId>>,
}

impl AncestorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the index from `(node, parent)` pairs.
    ///
    /// Parents absent from the input end a chain. A chain that loops back on
    /// itself is cut at the first repeated node.
    pub fn from_parents<I>(parents: I) -> Self
    where
        I: IntoIterator<Item = (UserId, Option<UserId>)>,
    {
        let parents: HashMap<UserId, Option<UserId>> = parents.into_iter().collect();
        let mut index = Self::default();

        for &node in parents.keys() {
            let mut chain = Vec::new();
            let mut cursor = parents.get(&node).copied().flatten();
            while let Some(parent) = cursor {
                if parent == node || chain.contains(&parent) || !parents.contains_key(&parent) {
                    break;
                }
                chain.push(parent);
                cursor = parents.get(&parent).copied().flatten();
            }
            index.set_chain(node, chain);
        }

        index
    }

    /// Reconstructs an index from persisted rows.
    pub fn from_edges(edges: &[HierarchyEdge]) -> Self {
        let mut chains: HashMap<UserId, Vec<(u32, UserId)>> = HashMap::new();
        for edge in edges {
            chains
                .entry(edge.descendant_id)
                .or_default()
                .push((edge.distance, edge.ancestor_id));
            chains.entry(edge.ancestor_id).or_default();
        }

        let mut index = Self::default();
        for (node, mut rows) in chains {
            rows.sort_unstable();
            index.set_chain(node, rows.into_iter().map(|(_, id)| id).collect());
        }
        index
    }

    /// Adds a node with no descendants under `parent`.
    pub fn insert_leaf(&mut self, node: UserId, parent: Option<UserId>) {
        let chain = match parent {
            Some(parent) => iter::once(parent)
                .chain(self.ancestors(parent).iter().copied())
                .collect(),
            None => Vec::new(),
        };
        self.set_chain(node, chain);
    }

    /// Moves `node` and its whole subtree under `new_parent`.
    ///
    /// Each member keeps the part of its chain inside the subtree and swaps
    /// the outer part, so every distance to an outside ancestor shifts by the
    /// same amount.
    pub fn move_subtree(&mut self, node: UserId, new_parent: UserId) {
        let old_outer = self.ancestors(node).to_vec();
        let new_outer: Vec<UserId> = iter::once(new_parent)
            .chain(self.ancestors(new_parent).iter().copied())
            .collect();

        let mut members: Vec<UserId> = self.descendants(node).collect();
        members.push(node);

        for member in members {
            let chain = self.ancestors.entry(member).or_default();
            let inner = chain.len().saturating_sub(old_outer.len());
            chain.truncate(inner);
            chain.extend_from_slice(&new_outer);

            for ancestor in &old_outer {
                if let Some(set) = self.descendants.get_mut(ancestor) {
                    set.remove(&member);
                }
            }
            for ancestor in &new_outer {
                self.descendants.entry(*ancestor).or_default().insert(member);
            }
        }
    }

    /// Ancestors of `node`, nearest first.
    pub fn ancestors(&self, node: UserId) -> &[UserId] {
        self.ancestors
            .get(&node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn descendants(&self, node: UserId) -> impl Iterator<Item = UserId> + '_ {
        self.descendants.get(&node).into_iter().flatten().copied()
    }

    pub fn descendant_set(&self, node: UserId) -> HashSet<UserId> {
        self.descendants.get(&node).cloned().unwrap_or_default()
    }

    #[inline]
    pub fn is_ancestor(&self, ancestor: UserId, descendant: UserId) -> bool {
        self.descendants
            .get(&ancestor)
            .is_some_and(|set| set.contains(&descendant))
    }

    pub fn distance(&self, ancestor: UserId, descendant: UserId) -> Option<u32> {
        self.ancestors(descendant)
            .iter()
            .position(|id| *id == ancestor)
            .map(|pos| pos as u32 + 1)
    }

    pub fn contains(&self, node: UserId) -> bool {
        self.ancestors.contains_key(&node)
    }

    pub fn edge_count(&self) -> usize {
        self.ancestors.values().map(Vec::len).sum()
    }

    /// All rows, sorted, in persisted form.
    pub fn edges(&self) -> Vec<HierarchyEdge> {
        let mut edges: Vec<HierarchyEdge> = self
            .ancestors
            .iter()
            .flat_map(|(descendant, chain)| {
                chain.iter().enumerate().map(|(pos, ancestor)| HierarchyEdge {
                    ancestor_id: *ancestor,
                    descendant_id: *descendant,
                    distance: pos as u32 + 1,
                })
            })
            .collect();
        edges.sort_unstable();
        edges
    }

    fn set_chain(&mut self, node: UserId, chain: Vec<UserId>) {
        for ancestor in &chain {
            self.descendants.entry(*ancestor).or_default().insert(node);
        }
        self.descendants.entry(node).or_default();
        self.ancestors.insert(node, chain);
    }
}
