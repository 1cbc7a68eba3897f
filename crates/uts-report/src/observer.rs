//! `ReportObserver<W>` — bridges `SimObserver` to a `ReportWriter`.

use uts_engine::{AgentView, SimObserver, TickSummary};

use crate::row::{AgentSnapshotRow, TickSummaryRow};
use crate::writer::ReportWriter;
use crate::ReportError;

/// A [`SimObserver`] that writes every tick summary to a
/// [`ReportWriter`] backend.
///
/// Errors from the writer are stored internally because observer methods
/// have no return value.  After the run, check with
/// [`take_error`][Self::take_error].
///
/// Agent snapshots are not produced by the tick hook (a `TickSummary`
/// carries no agents); drivers that want them call
/// [`snapshot_agents`][Self::snapshot_agents] at their chosen interval with
/// the engine's `agents()` projection.
pub struct ReportObserver<W: ReportWriter> {
    writer:     W,
    last_error: Option<ReportError>,
}

impl<W: ReportWriter> ReportObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Record an agent snapshot batch for `step`.
    pub fn snapshot_agents(&mut self, step: u64, agents: &[AgentView]) {
        let rows: Vec<AgentSnapshotRow> = agents
            .iter()
            .map(|view| AgentSnapshotRow::from_view(step, view))
            .collect();
        if !rows.is_empty() {
            let result = self.writer.write_agent_snapshots(&rows);
            self.store_err(result);
        }
    }

    /// Flush the backend.  Call once after the run.
    pub fn finish(&mut self) {
        let result = self.writer.finish();
        self.store_err(result);
    }

    /// Take the stored write error (if any) after the run.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<ReportError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: crate::ReportResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: ReportWriter> SimObserver for ReportObserver<W> {
    fn on_tick(&mut self, summary: &TickSummary) {
        let row = TickSummaryRow::from(summary);
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }
}
