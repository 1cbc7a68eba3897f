//! Agent spawning: single, coordinate-snapped, and batched.

use log::debug;

use uts_agent::Agent;
use uts_core::{NodeId, Point, VehicleMode};
use uts_graph::Planner;

use crate::error::{EngineError, EngineResult};
use crate::sim::Simulator;

impl<P: Planner> Simulator<P> {
    /// Spawn one agent of `mode`.
    ///
    /// Omitted endpoints are chosen uniformly at random among the map's
    /// nodes.  The agent is added only if a path exists; a planner no-path
    /// outcome is returned to the caller and leaves no trace in the store.
    /// Returns the new agent's external label.
    pub fn spawn(
        &mut self,
        mode:  VehicleMode,
        start: Option<&str>,
        goal:  Option<&str>,
    ) -> EngineResult<String> {
        let start = match start {
            Some(name) => self.network.node_id(name)?,
            None => self.random_node()?,
        };
        let goal = match goal {
            Some(name) => self.network.node_id(name)?,
            None => self.random_node()?,
        };
        self.spawn_between(mode, start, goal)
    }

    /// Spawn one agent between the nodes nearest to two coordinates.
    pub fn spawn_at(&mut self, mode: VehicleMode, start: Point, goal: Point) -> EngineResult<String> {
        let start = self
            .network
            .nearest_node(start)
            .ok_or(EngineError::EmptyNetwork)?;
        let goal = self
            .network
            .nearest_node(goal)
            .ok_or(EngineError::EmptyNetwork)?;
        self.spawn_between(mode, start, goal)
    }

    /// Spawn up to `count` agents with modes drawn from `distribution`
    /// (car/bicycle/pedestrian weights; defaults to the configured
    /// distribution).  Individual no-path failures are skipped; the number
    /// of successful spawns is returned.
    pub fn spawn_many(
        &mut self,
        count:        usize,
        distribution: Option<[f64; 3]>,
    ) -> EngineResult<usize> {
        let weights = distribution.unwrap_or(self.config.spawn_distribution);
        let sum: f64 = weights.iter().sum();
        if weights.iter().any(|&w| w < 0.0) || (sum - 1.0).abs() > 1e-6 {
            return Err(EngineError::BadDistribution { weights });
        }

        let mut spawned = 0usize;
        for _ in 0..count {
            let mode = self.sample_mode(weights);
            match self.spawn(mode, None, None) {
                Ok(_) => spawned += 1,
                Err(e) if e.is_no_path() => {
                    debug!("spawn_many: skipped unroutable {mode} spawn");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(spawned)
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn spawn_between(
        &mut self,
        mode:  VehicleMode,
        start: NodeId,
        goal:  NodeId,
    ) -> EngineResult<String> {
        let path = self
            .planner
            .plan(&self.network, start, goal, mode, &self.cost_field())?;

        let nominal = self.config.speed_profile(mode).sample(&mut self.rng);
        let (id, label) = self.store.peek_handle(mode);
        let agent = Agent::new(
            id,
            label.clone(),
            mode,
            path.nodes,
            nominal,
            self.config.capacity_usage(mode),
            self.clock.elapsed_secs,
        );
        self.store.insert(agent);
        debug!(
            "spawned {label} {} -> {} (nominal {nominal:.1})",
            self.network.node_name(start),
            self.network.node_name(goal)
        );
        Ok(label)
    }

    fn random_node(&mut self) -> EngineResult<NodeId> {
        let count = self.network.node_count();
        if count == 0 {
            return Err(EngineError::EmptyNetwork);
        }
        Ok(NodeId(self.rng.gen_range(0..count as u32)))
    }

    fn sample_mode(&mut self, weights: [f64; 3]) -> VehicleMode {
        let draw: f64 = self.rng.gen_range(0.0..1.0);
        let mut cumulative = 0.0;
        for mode in VehicleMode::ALL {
            cumulative += weights[mode.index()];
            if draw < cumulative {
                return mode;
            }
        }
        // Rounding at the top of the range falls through to the last mode.
        VehicleMode::Pedestrian
    }
}
