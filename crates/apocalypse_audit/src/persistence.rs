//! Storage of audit snapshots and run history.

use crate::error::Result;
use crate::types::{AuditRecord, AuditRun, PendingRecord, RunSummary, SortOrder};

/// Persisted audit state.
///
/// Implementations must make [`replace_snapshot`](Self::replace_snapshot)
/// all-or-nothing: on error, the previous snapshot and run history are
/// left exactly as they were.
pub trait AuditPersistence {
    /// Delete every audit record, insert `records`, and append one run
    /// record stamped `run_at` with the inserted count.
    fn replace_snapshot(&self, records: &[PendingRecord], run_at: i64) -> Result<RunSummary>;

    /// One page of the current snapshot. `limit == 0` returns every row from
    /// `offset` on. Ties in the sort column are ordered by id.
    fn list_page(&self, offset: u64, limit: u64, sort: SortOrder) -> Result<Vec<AuditRecord>>;

    fn count(&self) -> Result<u64>;

    /// Most recent run, or `None` before the first completed run.
    fn last_run(&self) -> Result<Option<AuditRun>>;

    /// Run history, newest first. `limit == 0` returns all runs.
    fn list_runs(&self, limit: u64) -> Result<Vec<AuditRun>>;

    /// Delete all but the newest `keep_last` runs. Returns the number removed.
    fn prune_runs(&self, keep_last: u64) -> Result<u64>;
}
