//! Offline drift repair for a stored partition.

use ranklane_engine::{EngineError, PartitionRecords, TenantState};
use ranklane_models::RebuildReport;

pub struct RebuildPlan {
    pub report: RebuildReport,
    pub stored_edges: usize,
    /// Records to write back, or `None` when the stored partition already
    /// matches what a reload would produce.
    pub records: Option<PartitionRecords>,
}

/// Reloads `stored` through the engine and compares the result record by
/// record, so drifted edges are caught even when their count is unchanged.
pub fn plan_rebuild(stored: PartitionRecords) -> Result<RebuildPlan, EngineError> {
    let mut expected = stored.clone();
    expected.edges.sort_unstable();
    expected.users.sort_by_key(|node| node.user_id);
    expected.classes.sort_by_key(|class| class.class_id);
    expected.documents.sort_by_key(|record| record.document_id);

    let (state, report) = TenantState::from_records(stored)?;
    let rebuilt = state.to_records();

    Ok(RebuildPlan {
        stored_edges: expected.edges.len(),
        records: (rebuilt != expected || !report.is_clean()).then_some(rebuilt),
        report,
    })
}
