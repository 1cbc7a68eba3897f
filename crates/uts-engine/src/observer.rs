//! Simulation observer trait for progress reporting and data collection.

use uts_graph::RoadNetwork;

use crate::snapshot::TickSummary;

/// Callbacks invoked by the simulator at key points of its lifecycle.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.  The engine stays ignorant of output
/// formats; exporters (e.g. the CSV reporter in `uts-report`) live entirely
/// behind this trait.
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick(&mut self, summary: &TickSummary) {
///         if summary.step % self.interval == 0 {
///             println!("step {}: {} active", summary.step, summary.active);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called after every completed tick with that tick's summary.
    fn on_tick(&mut self, _summary: &TickSummary) {}

    /// Called after a map switch, before any tick on the new map.
    fn on_map_loaded(&mut self, _map_id: &str, _network: &RoadNetwork) {}

    /// Called after a state reset.
    fn on_reset(&mut self) {}
}

/// A [`SimObserver`] that does nothing.  Use when driving the simulator
/// without progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
