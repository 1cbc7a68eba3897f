//! Tests for uts-report, writing real files into a temp directory.

#[cfg(test)]
mod csv_backend {
    use std::fs;

    use uts_core::{SimConfig, VehicleMode};
    use uts_engine::SimBuilder;

    use crate::{CsvReporter, ReportObserver, ReportWriter, TickSummaryRow};

    fn summary_row(step: u64) -> TickSummaryRow {
        TickSummaryRow {
            step,
            dt: 0.1,
            active_agents: 3,
            moved_agents: 2,
            arrived_agents: 1,
            accident_count: 0,
            blocked_count: 0,
        }
    }

    #[test]
    fn writes_headers_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut reporter = CsvReporter::new(dir.path()).unwrap();
        reporter.write_tick_summary(&summary_row(1)).unwrap();
        reporter.write_tick_summary(&summary_row(2)).unwrap();
        reporter.finish().unwrap();
        // finish() is idempotent.
        reporter.finish().unwrap();

        let summaries = fs::read_to_string(dir.path().join("tick_summaries.csv")).unwrap();
        let mut lines = summaries.lines();
        assert_eq!(
            lines.next().unwrap(),
            "step,dt,active_agents,moved_agents,arrived_agents,accident_count,blocked_count"
        );
        assert_eq!(lines.count(), 2);

        let snapshots = fs::read_to_string(dir.path().join("agent_snapshots.csv")).unwrap();
        assert!(snapshots.starts_with("step,agent,mode,status,current,next,"));
    }

    #[test]
    fn observer_records_a_full_run() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = CsvReporter::new(dir.path()).unwrap();
        let mut observer = ReportObserver::new(reporter);

        let mut sim = SimBuilder::new(SimConfig { seed: 5, ..Default::default() })
            .map("square")
            .build()
            .unwrap();
        sim.spawn(VehicleMode::Car, Some("A"), Some("C")).unwrap();

        sim.run_ticks(10, 0.1, &mut observer);
        observer.snapshot_agents(sim.step(), &sim.agents());
        observer.finish();
        assert!(observer.take_error().is_none());

        let summaries = fs::read_to_string(dir.path().join("tick_summaries.csv")).unwrap();
        assert_eq!(summaries.lines().count(), 11); // header + 10 ticks

        let snapshots = fs::read_to_string(dir.path().join("agent_snapshots.csv")).unwrap();
        let rows: Vec<&str> = snapshots.lines().skip(1).collect();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].starts_with("10,car_0,car,"));
    }

    #[test]
    fn empty_snapshot_batch_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = CsvReporter::new(dir.path()).unwrap();
        let mut observer = ReportObserver::new(reporter);
        observer.snapshot_agents(0, &[]);
        observer.finish();

        let mut writer = observer.into_writer();
        writer.finish().unwrap();
        let snapshots = fs::read_to_string(dir.path().join("agent_snapshots.csv")).unwrap();
        assert_eq!(snapshots.lines().count(), 1); // header only
    }
}
