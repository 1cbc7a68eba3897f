//! The `ReportWriter` trait implemented by all backend writers.

use crate::{AgentSnapshotRow, ReportResult, TickSummaryRow};

/// Trait implemented by report backends (currently CSV).
///
/// Errors surface through `ReportResult`; when driven from observer
/// callbacks they are stored by [`ReportObserver`][crate::ReportObserver]
/// and retrieved after the run.
pub trait ReportWriter {
    /// Write one tick summary row.
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> ReportResult<()>;

    /// Write a batch of agent snapshots.
    fn write_agent_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> ReportResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent — safe to call more than once.
    fn finish(&mut self) -> ReportResult<()>;
}
