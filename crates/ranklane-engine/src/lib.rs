//! # Ranklane Engine
//!
//! Permission and hierarchy resolution for the four-role delegation tree.
//!
//! - [`index`]: materialized ancestor index with O(1) `is_ancestor`
//! - [`hierarchy`]: user nodes, insert/reparent invariants, drift rebuild
//! - [`ledger`]: classes, their teacher, supervisor, students and prompt
//! - [`resolver`]: document visibility and the listing predicate
//! - [`registry`]: document access records
//! - [`partition`]: per-organization single-writer snapshots
//! - [`store`]: the persistence contract and its memory/JSON backends
//! - [`facade`]: the entry point every caller uses
//!
//! The engine is synchronous and never validates credentials; every call
//! receives an already-verified [`Actor`](ranklane_models::Actor).
//!
//! # Example
//!
//! ```ignore
//! use ranklane_engine::PermissionFacade;
//!
//! let engine = PermissionFacade::in_memory();
//! let permissions = engine.permissions(&actor)?;
//! let visible = engine.authorize_document_view(&actor, document_id)?;
//! ```

pub mod error;
pub mod facade;
pub mod hierarchy;
pub mod index;
pub mod ledger;
pub mod partition;
pub mod registry;
pub mod resolver;
pub mod store;

pub use error::EngineError;
pub use facade::PermissionFacade;
pub use hierarchy::HierarchyStore;
pub use index::AncestorIndex;
pub use ledger::ClassLedger;
pub use partition::{Partition, Partitions, TenantState};
pub use registry::DocumentRegistry;
pub use resolver::{DocumentRef, VisibilityFilter, can_set_access_level, can_view};
pub use store::{JsonFileStore, MemoryStore, PartitionRecords, PartitionStore, open_store};
