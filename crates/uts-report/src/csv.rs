//! CSV report backend.
//!
//! Creates two files in the configured output directory:
//! - `tick_summaries.csv`
//! - `agent_snapshots.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::row::{AgentSnapshotRow, TickSummaryRow};
use crate::writer::ReportWriter;
use crate::ReportResult;

/// Writes simulation telemetry to two CSV files.
pub struct CsvReporter {
    summaries: Writer<File>,
    snapshots: Writer<File>,
    finished:  bool,
}

impl CsvReporter {
    /// Open (or create) the two CSV files in `dir` and write header rows.
    pub fn new(dir: &Path) -> ReportResult<Self> {
        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record([
            "step",
            "dt",
            "active_agents",
            "moved_agents",
            "arrived_agents",
            "accident_count",
            "blocked_count",
        ])?;

        let mut snapshots = Writer::from_path(dir.join("agent_snapshots.csv"))?;
        snapshots.write_record([
            "step",
            "agent",
            "mode",
            "status",
            "current",
            "next",
            "position_on_edge",
            "current_speed",
        ])?;

        Ok(Self { summaries, snapshots, finished: false })
    }
}

impl ReportWriter for CsvReporter {
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> ReportResult<()> {
        self.summaries.write_record(&[
            row.step.to_string(),
            row.dt.to_string(),
            row.active_agents.to_string(),
            row.moved_agents.to_string(),
            row.arrived_agents.to_string(),
            row.accident_count.to_string(),
            row.blocked_count.to_string(),
        ])?;
        Ok(())
    }

    fn write_agent_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> ReportResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.step.to_string(),
                row.agent.clone(),
                row.mode.clone(),
                row.status.clone(),
                row.current.clone(),
                row.next.clone(),
                row.position_on_edge.to_string(),
                row.current_speed.to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> ReportResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.summaries.flush()?;
        self.snapshots.flush()?;
        Ok(())
    }
}
