//! Per-organization partitions.
//!
//! Each organization has one writer at a time. A mutation clones the current
//! state, applies the change, persists it, and only then publishes the new
//! snapshot. Readers clone an `Arc` of the latest published snapshot and never
//! wait on a writer, so they observe at most one mutation of staleness.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use ranklane_models::{OrganizationId, RebuildReport};
use tracing::{info, warn};

use crate::error::EngineError;
use crate::hierarchy::HierarchyStore;
use crate::index::AncestorIndex;
use crate::ledger::ClassLedger;
use crate::registry::DocumentRegistry;
use crate::store::{PartitionRecords, PartitionStore};

/// Everything the engine knows about one organization.
#[derive(Debug, Clone, Default)]
pub struct TenantState {
    pub hierarchy: HierarchyStore,
    pub classes: ClassLedger,
    pub documents: DocumentRegistry,
}

impl TenantState {
    /// Restores state from persisted records, recomputing the ancestor index.
    pub fn from_records(records: PartitionRecords) -> Result<(Self, RebuildReport), EngineError> {
        let mut stored_edges = records.edges;
        stored_edges.sort_unstable();

        let mut hierarchy = HierarchyStore::with_index(AncestorIndex::from_edges(&stored_edges));
        let report = hierarchy.rebuild(records.users)?;

        if hierarchy.index().edges() != stored_edges {
            warn!(
                stored = stored_edges.len(),
                recomputed = report.edges,
                "ancestor index drift detected, using recomputed index"
            );
        }

        let mut classes = ClassLedger::from_classes(records.classes);
        classes.refresh_supervisors(&hierarchy);

        let state = Self {
            hierarchy,
            classes,
            documents: DocumentRegistry::from_records(records.documents),
        };
        Ok((state, report))
    }

    pub fn to_records(&self) -> PartitionRecords {
        let mut users: Vec<_> = self.hierarchy.nodes().cloned().collect();
        users.sort_by_key(|node| node.user_id);
        let mut classes: Vec<_> = self.classes.classes().cloned().collect();
        classes.sort_by_key(|class| class.class_id);
        let mut documents: Vec<_> = self.documents.records().cloned().collect();
        documents.sort_by_key(|record| record.document_id);

        PartitionRecords {
            users,
            edges: self.hierarchy.index().edges(),
            classes,
            documents,
        }
    }
}

#[derive(Debug, Default)]
pub struct Partition {
    writer: Mutex<()>,
    snapshot: RwLock<Arc<TenantState>>,
}

impl Partition {
    pub fn new(state: TenantState) -> Self {
        Self {
            writer: Mutex::new(()),
            snapshot: RwLock::new(Arc::new(state)),
        }
    }

    /// The latest committed state.
    pub fn snapshot(&self) -> Arc<TenantState> {
        Arc::clone(&self.snapshot.read())
    }

    /// Applies `change` under the partition's write lock.
    ///
    /// Nothing is published unless `change` succeeds and the store accepts
    /// the new records.
    pub fn mutate<T, F>(
        &self,
        org: OrganizationId,
        store: &dyn PartitionStore,
        change: F,
    ) -> Result<T, EngineError>
    where
        F: FnOnce(&mut TenantState) -> Result<T, EngineError>,
    {
        let _writer = self.writer.lock();

        let mut next = TenantState::clone(&self.snapshot());
        let output = change(&mut next)?;
        store.save(org, &next.to_records())?;

        *self.snapshot.write() = Arc::new(next);
        Ok(output)
    }
}

/// Lazily loaded partitions, one per organization.
#[derive(Debug)]
pub struct Partitions {
    store: Arc<dyn PartitionStore>,
    partitions: DashMap<OrganizationId, Arc<Partition>>,
}

impl Partitions {
    pub fn new(store: Arc<dyn PartitionStore>) -> Self {
        Self {
            store,
            partitions: DashMap::new(),
        }
    }

    pub fn store(&self) -> &dyn PartitionStore {
        self.store.as_ref()
    }

    /// The partition for `org`, loading it from the store on first use.
    pub fn get(&self, org: OrganizationId) -> Result<Arc<Partition>, EngineError> {
        if let Some(partition) = self.partitions.get(&org) {
            return Ok(Arc::clone(partition.value()));
        }

        // Load without holding the shard lock; a concurrent loader may win
        // the insert, in which case its partition is kept.
        let state = match self.store.load(org)? {
            Some(records) => {
                let (state, report) = TenantState::from_records(records)?;
                info!(
                    organization_id = %org,
                    nodes = report.nodes,
                    reattached = report.reattached.len(),
                    "partition loaded"
                );
                state
            }
            None => TenantState::default(),
        };

        let partition = self
            .partitions
            .entry(org)
            .or_insert_with(|| Arc::new(Partition::new(state)));
        Ok(Arc::clone(partition.value()))
    }

    /// Drops the cached partition so the next access reloads it.
    pub fn evict(&self, org: OrganizationId) {
        self.partitions.remove(&org);
    }
}
