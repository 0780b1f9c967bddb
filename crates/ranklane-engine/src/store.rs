//! Persistence contract for organization partitions.
//!
//! A partition is persisted as four flat tables. The ancestor edges are
//! stored for external readers and drift detection; on load they are always
//! recomputed from the users' parent pointers.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use ranklane_config::{StoreBackend, StoreConfig};
use ranklane_models::{
    ClassAssignment, DocumentAccessRecord, HierarchyEdge, OrganizationId, UserNode,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EngineError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionRecords {
    pub users: Vec<UserNode>,
    pub edges: Vec<HierarchyEdge>,
    pub classes: Vec<ClassAssignment>,
    pub documents: Vec<DocumentAccessRecord>,
}

pub trait PartitionStore: Send + Sync + fmt::Debug {
    /// `None` when the organization has never been saved.
    fn load(&self, org: OrganizationId) -> Result<Option<PartitionRecords>, EngineError>;

    fn save(&self, org: OrganizationId, records: &PartitionRecords) -> Result<(), EngineError>;
}

/// Builds the store selected by configuration.
pub fn open_store(config: &StoreConfig) -> Arc<dyn PartitionStore> {
    match &config.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::File { dir } => Arc::new(JsonFileStore::new(dir.clone())),
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    partitions: DashMap<OrganizationId, PartitionRecords>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PartitionStore for MemoryStore {
    fn load(&self, org: OrganizationId) -> Result<Option<PartitionRecords>, EngineError> {
        Ok(self.partitions.get(&org).map(|entry| entry.value().clone()))
    }

    fn save(&self, org: OrganizationId, records: &PartitionRecords) -> Result<(), EngineError> {
        self.partitions.insert(org, records.clone());
        Ok(())
    }
}

/// One pretty-printed JSON file per organization, replaced atomically.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, org: OrganizationId) -> PathBuf {
        self.dir.join(format!("{org}.json"))
    }
}

impl PartitionStore for JsonFileStore {
    fn load(&self, org: OrganizationId) -> Result<Option<PartitionRecords>, EngineError> {
        let path = self.path_for(org);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path).map_err(|e| storage_error(&path, e))?;
        let records = serde_json::from_str(&raw).map_err(|e| storage_error(&path, e))?;
        debug!(path = %path.display(), "partition loaded");
        Ok(Some(records))
    }

    fn save(&self, org: OrganizationId, records: &PartitionRecords) -> Result<(), EngineError> {
        fs::create_dir_all(&self.dir).map_err(|e| storage_error(&self.dir, e))?;

        let path = self.path_for(org);
        let tmp = self.dir.join(format!("{org}.json.tmp"));
        let body = serde_json::to_vec_pretty(records).map_err(|e| storage_error(&path, e))?;
        fs::write(&tmp, body).map_err(|e| storage_error(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| storage_error(&path, e))?;

        debug!(path = %path.display(), users = records.users.len(), "partition saved");
        Ok(())
    }
}

fn storage_error(path: &Path, err: impl fmt::Display) -> EngineError {
    EngineError::Storage(format!("{}: {}", path.display(), err))
}
