//! Fluent builder for constructing a [`Simulator`].

use std::sync::Arc;
use std::time::Instant;

use uts_agent::AgentStore;
use uts_core::{SimClock, SimConfig, SimRng};
use uts_graph::{AStarPlanner, MapCatalog, Planner};
use uts_traffic::{AccidentTable, BlockedEdges, CongestionAnalyzer, MultiplierField};

use crate::error::EngineResult;
use crate::sim::{compute_hotspots, Simulator};

/// Fluent builder for [`Simulator<P>`].
///
/// # Defaults
///
/// | Method        | Default                               |
/// |---------------|---------------------------------------|
/// | `.catalog(c)` | [`MapCatalog::with_builtins`]         |
/// | `.map(id)`    | `"downtown"`                          |
/// | `.planner(p)` | [`AStarPlanner`]                      |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(SimConfig { seed: 42, ..Default::default() })
///     .map("square")
///     .build()?;
/// sim.spawn_many(100, None)?;
/// sim.tick_with_dt(0.1);
/// ```
pub struct SimBuilder<P: Planner = AStarPlanner> {
    config:  SimConfig,
    catalog: MapCatalog,
    map_id:  String,
    planner: P,
}

impl SimBuilder<AStarPlanner> {
    /// Start a builder with the default catalog, map, and planner.
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            catalog: MapCatalog::with_builtins(),
            map_id:  "downtown".to_string(),
            planner: AStarPlanner,
        }
    }
}

impl<P: Planner> SimBuilder<P> {
    /// Replace the map catalog (e.g. after registering application maps).
    pub fn catalog(mut self, catalog: MapCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Select the initially loaded map.
    pub fn map(mut self, id: &str) -> Self {
        self.map_id = id.to_string();
        self
    }

    /// Swap the planning strategy.
    pub fn planner<Q: Planner>(self, planner: Q) -> SimBuilder<Q> {
        SimBuilder {
            config:  self.config,
            catalog: self.catalog,
            map_id:  self.map_id,
            planner,
        }
    }

    /// Validate the configuration, build the initial map, and return a
    /// ready simulator.
    pub fn build(self) -> EngineResult<Simulator<P>> {
        self.config.validate()?;
        let network = Arc::new(self.catalog.get(&self.map_id)?.build()?);

        let mut rng = SimRng::new(self.config.seed);
        let mut multipliers =
            MultiplierField::new(network.edge_count(), self.config.default_multiplier);
        multipliers.resample_free_flow(&mut rng);

        let analyzer =
            CongestionAnalyzer::new(network.edge_count(), self.config.history_capacity);
        let hotspot_edges = compute_hotspots(&network, self.config.hotspot_fraction);
        let clock = SimClock::new(self.config.max_dt);

        Ok(Simulator {
            config: self.config,
            planner: self.planner,
            catalog: self.catalog,
            map_id: self.map_id,
            network,
            clock,
            rng,
            store: AgentStore::new(),
            analyzer,
            multipliers,
            accident_table: AccidentTable::new(),
            blocked_edges: BlockedEdges::new(),
            hotspot_edges,
            running: true,
            last_tick_at: Some(Instant::now()),
        })
    }
}
