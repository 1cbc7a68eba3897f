//! The `Simulator` struct, its tick loop, and the command surface.
//!
//! # Tick sequence
//!
//! ```text
//! tick(dt):
//!   ① clock     — clamp dt to [0, max_dt], advance step counter
//!   ② incidents — maybe inject a random accident; expire past-due ones
//!   ③ refresh   — measure densities, re-sample band multipliers,
//!                 apply accident boosts / hotspot buildup / blocked sentinel
//!   ④ follow    — car-following scan against pre-tick positions
//!                 (targets + stuck/moving status)
//!   ⑤ integrate — accelerate toward targets, advance positions,
//!                 consume node crossings, record arrivals
//!   ⑥ occupancy — rebuild the edge-occupancy index from scratch
//!   ⑦ reroute   — blocked/congested lookahead, on-demand re-planning
//!   ⑧ summary   — TickSummary for the caller / observers
//! ```
//!
//! The two kinematic passes are deliberately sequential over the full
//! active set: pass ④ reads every agent's pre-tick position, pass ⑤ reads
//! the targets ④ produced.  Parallelising across agents would require a
//! position snapshot taken before ④.
//!
//! # Ownership
//!
//! The simulator exclusively owns all mutable state (agents, multipliers,
//! incidents, clock, RNG); the road network is shared immutably via `Arc`.
//! All mutation happens inside `tick()` and the command methods, which a
//! façade serialises behind a single mutex.

use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};
use rustc_hash::FxHashSet;

use uts_agent::{AgentStatus, AgentStore};
use uts_core::{AgentId, EdgeId, NodeId, SimClock, SimConfig, SimRng};
use uts_graph::{AStarPlanner, CostField, GraphError, MapCatalog, Planner, RoadNetwork};
use uts_traffic::{
    random_duration, random_severity, AccidentTable, BlockedEdges, CongestionAnalyzer,
    MultiplierField, Severity, TrafficError, BLOCKED_MULTIPLIER,
};

use crate::error::{EngineError, EngineResult};
use crate::observer::SimObserver;
use crate::snapshot::{AccidentView, TickSummary};

/// The urban traffic simulator.
///
/// Create via [`SimBuilder`][crate::SimBuilder].  The planner is a type
/// parameter so applications can swap the search strategy at compile time;
/// the default [`AStarPlanner`] fits city-scale maps.
pub struct Simulator<P: Planner = AStarPlanner> {
    /// Global configuration; validated once at build time.
    pub(crate) config: SimConfig,

    /// The shortest-path strategy used for spawns, reroutes, and queries.
    pub(crate) planner: P,

    /// Known maps for `load_map` / `maps()`.
    pub(crate) catalog: MapCatalog,

    /// Id of the currently loaded map.
    pub(crate) map_id: String,

    /// The immutable road graph of the current map.
    pub(crate) network: Arc<RoadNetwork>,

    /// Step counter and accumulated simulated time.
    pub(crate) clock: SimClock,

    /// The single seeded RNG behind all stochastic behaviour.
    pub(crate) rng: SimRng,

    /// All live agents plus their indices.
    pub(crate) store: AgentStore,

    /// Densities, band histories, and congestion probabilities.
    pub(crate) analyzer: CongestionAnalyzer,

    /// The dynamic per-edge planning-cost field.
    pub(crate) multipliers: MultiplierField,

    /// Active accidents.
    pub(crate) accident_table: AccidentTable,

    /// Manually blocked edges.
    pub(crate) blocked_edges: BlockedEdges,

    /// Edges touching a high-out-degree node; receive time-based buildup.
    pub(crate) hotspot_edges: FxHashSet<EdgeId>,

    /// Scheduler flag consumed between ticks, never mid-tick.
    pub(crate) running: bool,

    /// Wall-clock instant of the previous `tick()` call.
    pub(crate) last_tick_at: Option<Instant>,
}

/// One agent's car-following outcome, applied after the read-only scan.
struct FollowDecision {
    agent:  AgentId,
    target: f64,
    status: AgentStatus,
}

impl<P: Planner> Simulator<P> {
    // ── Tick entry points ─────────────────────────────────────────────────

    /// Advance one tick using real elapsed time since the previous call
    /// (clamped to the configured cap).
    pub fn tick(&mut self) -> TickSummary {
        let now = Instant::now();
        let raw = self
            .last_tick_at
            .map(|prev| now.duration_since(prev).as_secs_f64())
            .unwrap_or(0.0);
        self.last_tick_at = Some(now);
        let dt = self.clock.clamp_dt(raw);
        self.step_tick(dt)
    }

    /// Advance one tick with an explicit `dt` (still clamped).  The
    /// deterministic entry point for tests and fixed-step drivers.
    pub fn tick_with_dt(&mut self, dt: f64) -> TickSummary {
        let dt = self.clock.clamp_dt(dt);
        self.last_tick_at = Some(Instant::now());
        self.step_tick(dt)
    }

    /// Drive `n` fixed-step ticks, notifying `observer` after each.
    /// Returns the final tick's summary.
    pub fn run_ticks<O: SimObserver>(
        &mut self,
        n:        u64,
        dt:       f64,
        observer: &mut O,
    ) -> Option<TickSummary> {
        let mut last = None;
        for _ in 0..n {
            let summary = self.tick_with_dt(dt);
            observer.on_tick(&summary);
            last = Some(summary);
        }
        last
    }

    /// The stop/start flag.  Set by a façade's stop command; the scheduler
    /// checks it before each tick, so a tick is never interrupted.
    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn network(&self) -> &Arc<RoadNetwork> {
        &self.network
    }

    pub fn map_id(&self) -> &str {
        &self.map_id
    }

    pub fn step(&self) -> u64 {
        self.clock.step
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.clock.elapsed_secs
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn step_tick(&mut self, dt: f64) -> TickSummary {
        self.clock.advance(dt);
        let now = self.clock.elapsed_secs;

        // ── ② Incident lifecycle ──────────────────────────────────────────
        if self.config.random_accident_probability > 0.0
            && self.rng.gen_bool(self.config.random_accident_probability)
        {
            match self.create_accident(None, None) {
                Ok(view) => debug!("random accident {} on {}", view.id, view.edge),
                Err(e) => debug!("random accident skipped: {e}"),
            }
        }
        for accident in self.accident_table.expire_due(now) {
            // The refresh below re-derives the band multiplier; restoring
            // the prior value keeps the field sane for this tick's planning.
            self.multipliers.set(accident.edge, accident.prior_multiplier);
            info!(
                "accident {} on {} expired after {:.0} s",
                accident.label,
                self.network.edge_label(accident.edge),
                accident.duration_secs
            );
        }

        // ── ③ Multiplier refresh ──────────────────────────────────────────
        self.refresh_multipliers(now);

        // ── ④ Car-following pass ──────────────────────────────────────────
        self.car_following_pass();

        // ── ⑤ Kinematic integration pass ──────────────────────────────────
        let moved = self.integration_pass(dt, now);

        // ── ⑥ Occupancy rebuild ───────────────────────────────────────────
        self.store.rebuild_occupancy(&self.network);

        // ── ⑦ Reroute decider ─────────────────────────────────────────────
        let rerouted = self.reroute_pass();
        if rerouted > 0 {
            // A reroute can change an agent's heading, moving it onto a
            // different edge; re-index so tick-boundary snapshots never see
            // an agent filed under a stale edge.
            self.store.rebuild_occupancy(&self.network);
        }

        // ── ⑧ Summary ─────────────────────────────────────────────────────
        let arrived = self.store.len() - self.store.active_count();
        TickSummary {
            step:        self.clock.step,
            dt,
            active:      self.store.active_count(),
            moved,
            arrived,
            accidents:   self.accidents(),
            blocked:     self.blocked(),
            multipliers: self.multiplier_snapshot(),
        }
    }

    /// Re-sample every edge's multiplier from its density band, then layer
    /// accident boosts, hotspot buildup, and the blocked sentinel.
    fn refresh_multipliers(&mut self, now: f64) {
        self.analyzer
            .measure(&self.network, &self.store, self.config.base_edge_capacity);

        // Hotspot buildup ramps in over the first rampup window of the run.
        let congestion_factor = (now / self.config.hotspot_rampup_secs).min(1.0);

        for edge in 0..self.network.edge_count() {
            let edge = EdgeId(edge as u32);
            if self.blocked_edges.contains(edge) {
                self.multipliers.set(edge, BLOCKED_MULTIPLIER);
                continue;
            }
            let mut multiplier = self.analyzer.sample_multiplier(edge, &mut self.rng);
            if let Some(accident) = self.accident_table.get_by_edge(edge) {
                multiplier *= accident.severity.boost();
            } else if self.hotspot_edges.contains(&edge) {
                multiplier *= 1.0 + congestion_factor * self.rng.gen_range(0.5..2.0);
            }
            self.multipliers.set(edge, multiplier);
        }
    }

    /// Pass ④: derive every en-route agent's target speed and stuck/moving
    /// status from the gap to the nearest agent ahead on its edge.
    ///
    /// The scan reads the occupancy index rebuilt at the end of the previous
    /// tick together with pre-tick positions, so ordering within the pass
    /// cannot influence the outcome.
    fn car_following_pass(&mut self) {
        let min_gap   = self.config.min_following_distance;
        let clear_gap = self.config.clear_following_distance;

        let mut decisions: Vec<FollowDecision> = Vec::with_capacity(self.store.len());
        for agent in self.store.iter() {
            if !agent.status.is_active() {
                continue;
            }
            let Some((from, to)) = agent.current_edge_key() else {
                continue; // single-node path; the integrator arrives it
            };
            let Some(edge) = self.network.edge_between(from, to) else {
                debug_assert!(false, "agent {} on unknown edge", agent.label);
                continue;
            };
            // A blocked edge bars entry: agents queued on it hold position
            // until a reroute succeeds or the blockage lifts.
            if self.blocked_edges.contains(edge) {
                decisions.push(FollowDecision {
                    agent:  agent.id,
                    target: 0.0,
                    status: AgentStatus::Stuck,
                });
                continue;
            }
            let edge_length = self.network.edge_distance[edge.index()];

            let mut d_front = f64::INFINITY;
            for &other_id in self.store.agents_on_edge(edge) {
                if other_id == agent.id {
                    continue;
                }
                let Some(other) = self.store.get(other_id) else { continue };
                if other.position_on_edge > agent.position_on_edge {
                    let gap = (other.position_on_edge - agent.position_on_edge) * edge_length;
                    d_front = d_front.min(gap);
                }
            }

            let (target, status) = if d_front < min_gap {
                (0.0, AgentStatus::Stuck)
            } else if d_front < clear_gap {
                (agent.nominal_speed * d_front / clear_gap, AgentStatus::Stuck)
            } else {
                (agent.nominal_speed, AgentStatus::Moving)
            };
            decisions.push(FollowDecision { agent: agent.id, target, status });
        }

        for decision in decisions {
            if let Some(agent) = self.store.get_mut(decision.agent) {
                agent.target_speed = decision.target;
                agent.status = decision.status;
            }
        }
    }

    /// Pass ⑤: integrate speeds and positions, consume node crossings, and
    /// record arrivals.  Returns how many agents advanced this tick.
    fn integration_pass(&mut self, dt: f64, now: f64) -> usize {
        let network = Arc::clone(&self.network);
        let accel_cap = self.config.acceleration * dt;
        let mut moved = 0usize;

        for id in self.store.ids() {
            let Some(agent) = self.store.get_mut(id) else { continue };
            if agent.status == AgentStatus::Arrived {
                continue;
            }

            // Trivial plans (start == goal) arrive on their first tick.
            let Some(next) = agent.next else {
                if agent.current == agent.destination {
                    agent.status = AgentStatus::Arrived;
                    agent.travel_time = Some(now - agent.spawned_at);
                    agent.current_speed = 0.0;
                }
                continue;
            };

            // Approach the target speed, bounded by the acceleration cap.
            let delta = (agent.target_speed - agent.current_speed).clamp(-accel_cap, accel_cap);
            agent.current_speed = (agent.current_speed + delta).max(0.0);

            let Some(edge) = network.edge_between(agent.current, next) else {
                debug_assert!(false, "agent {} on unknown edge", agent.label);
                continue;
            };
            // Never integrate across a blocked edge; the agent waits at its
            // current position for a reroute or an unblock.
            if self.blocked_edges.contains(edge) {
                agent.current_speed = 0.0;
                agent.wait_time += dt;
                continue;
            }
            let edge_length = network.edge_distance[edge.index()];

            let advance = agent.current_speed * dt / edge_length;
            if advance > 0.0 {
                agent.position_on_edge = (agent.position_on_edge + advance).min(1.0);
                moved += 1;
            }

            if agent.position_on_edge >= 1.0 {
                agent.distance_travelled += edge_length;
                agent.advance_node();
                if agent.current == agent.destination {
                    agent.status = AgentStatus::Arrived;
                    agent.travel_time = Some(now - agent.spawned_at);
                    agent.current_speed = 0.0;
                }
            }

            if agent.status == AgentStatus::Stuck {
                agent.wait_time += dt;
            }
        }
        moved
    }

    /// Pass ⑦: reroute agents whose upcoming edges are blocked or likely
    /// congested.  Failed re-plans keep the old path and mark the agent
    /// stuck; they are retried next tick.  Returns how many agents changed
    /// path.
    fn reroute_pass(&mut self) -> usize {
        // Read-only candidate scan first; planning mutates the store below.
        let mut candidates: Vec<AgentId> = Vec::new();
        for agent in self.store.iter() {
            if !agent.status.is_en_route() {
                continue;
            }
            let mut force = false;
            for (from, to) in agent.upcoming_edges(self.config.reroute_lookahead) {
                let Some(edge) = self.network.edge_between(from, to) else { continue };
                if self.blocked_edges.contains(edge)
                    || self.analyzer.probability(edge)
                        > self.config.reroute_probability_threshold
                {
                    force = true;
                    break;
                }
            }
            if force {
                candidates.push(agent.id);
            }
        }

        let network = Arc::clone(&self.network);
        let mut rerouted = 0usize;
        for id in candidates {
            let Some(agent) = self.store.get(id) else { continue };
            let (current, destination, mode, label) =
                (agent.current, agent.destination, agent.mode, agent.label.clone());

            let plan = self.planner.plan(
                &network,
                current,
                destination,
                mode,
                &CostField::new(self.multipliers.as_slice(), self.blocked_edges.as_set()),
            );
            let Some(agent) = self.store.get_mut(id) else { continue };
            match plan {
                Ok(path) => {
                    agent.adopt_path(path.nodes);
                    agent.status = AgentStatus::Rerouting;
                    agent.target_speed = agent.nominal_speed;
                    agent.reroute_count += 1;
                    rerouted += 1;
                    debug!("rerouted {label} (reroute #{})", agent.reroute_count);
                }
                Err(GraphError::NoPath { .. }) => {
                    agent.status = AgentStatus::Stuck;
                    debug!("reroute failed for {label}: no path; keeping old route");
                }
                Err(e) => {
                    agent.status = AgentStatus::Stuck;
                    warn!("reroute failed for {label}: {e}");
                }
            }
        }
        rerouted
    }

    // ── Commands ──────────────────────────────────────────────────────────

    /// Switch to a known map.  Destructive: all per-instance state resets.
    pub fn load_map(&mut self, id: &str) -> EngineResult<()> {
        let network = self.catalog.get(id)?.build()?;
        self.map_id = id.to_string();
        self.network = Arc::new(network);
        self.reset();
        info!(
            "loaded map `{id}` ({} nodes, {} edges, {} hotspot edges)",
            self.network.node_count(),
            self.network.edge_count(),
            self.hotspot_edges.len()
        );
        Ok(())
    }

    /// Drop all agents, accidents, and blockages; reset the clock and RNG;
    /// re-sample the multiplier field into the free-flow band.
    ///
    /// Reseeding the RNG makes `reset()` equivalent to constructing a fresh
    /// simulator with the same config and map.
    pub fn reset(&mut self) {
        self.store.clear();
        self.accident_table.clear();
        self.blocked_edges.clear();
        self.clock.reset();
        self.rng = SimRng::new(self.config.seed);
        self.analyzer =
            CongestionAnalyzer::new(self.network.edge_count(), self.config.history_capacity);
        self.multipliers =
            MultiplierField::new(self.network.edge_count(), self.config.default_multiplier);
        self.multipliers.resample_free_flow(&mut self.rng);
        self.hotspot_edges = compute_hotspots(&self.network, self.config.hotspot_fraction);
        self.last_tick_at = Some(Instant::now());
        info!("simulator reset on map `{}`", self.map_id);
    }

    /// Remove an agent (any status).  Unknown labels are errors.
    pub fn remove_agent(&mut self, label: &str) -> EngineResult<()> {
        self.store.remove_by_label(label)?;
        self.store.rebuild_occupancy(&self.network);
        debug!("removed agent {label}");
        Ok(())
    }

    /// Create an accident.
    ///
    /// With `edge` omitted, a uniformly random eligible (non-blocked,
    /// accident-free) edge is chosen; with `severity` omitted, one is drawn
    /// uniformly.  Rejected if the named edge is blocked or already carries
    /// an accident.
    pub fn create_accident(
        &mut self,
        edge:     Option<(&str, &str)>,
        severity: Option<Severity>,
    ) -> EngineResult<AccidentView> {
        let edge = match edge {
            Some((from, to)) => {
                let e = self.resolve_edge(from, to)?;
                if self.blocked_edges.contains(e) {
                    return Err(TrafficError::EdgeBlocked(e).into());
                }
                if self.accident_table.contains_edge(e) {
                    return Err(TrafficError::DuplicateAccident(e).into());
                }
                e
            }
            None => {
                let eligible: Vec<EdgeId> = self
                    .network
                    .edges()
                    .filter(|&e| {
                        !self.blocked_edges.contains(e) && !self.accident_table.contains_edge(e)
                    })
                    .collect();
                *self
                    .rng
                    .choose(&eligible)
                    .ok_or(TrafficError::NoEligibleEdge)?
            }
        };

        let severity = severity.unwrap_or_else(|| random_severity(&mut self.rng));
        let duration = random_duration(severity, &mut self.rng);
        let prior    = self.multipliers.get(edge);
        let now      = self.clock.elapsed_secs;

        let accident = self
            .accident_table
            .create(edge, severity, now, duration, prior)?;
        let view = AccidentView::project(accident, &self.network);

        // Severity boost is post-multiplicative on the current field value.
        self.multipliers.set(edge, prior * severity.boost());
        info!(
            "accident {} ({severity}) on {} for {duration:.0} s",
            view.id, view.edge
        );
        Ok(view)
    }

    /// Resolve an accident immediately, restoring the edge's pre-boost
    /// multiplier.
    pub fn resolve_accident(&mut self, label: &str) -> EngineResult<()> {
        let accident = self.accident_table.resolve(label)?;
        self.multipliers.set(accident.edge, accident.prior_multiplier);
        info!(
            "accident {label} on {} resolved",
            self.network.edge_label(accident.edge)
        );
        Ok(())
    }

    /// Block a directed edge.  Agents whose upcoming path contains it become
    /// reroute candidates on the next tick.
    pub fn block(&mut self, from: &str, to: &str, reason: &str) -> EngineResult<()> {
        let edge = self.resolve_edge(from, to)?;
        self.blocked_edges.block(edge, reason, self.clock.elapsed_secs);
        self.multipliers.set(edge, BLOCKED_MULTIPLIER);
        info!("blocked {} ({reason})", self.network.edge_label(edge));
        Ok(())
    }

    /// Unblock a directed edge.  Unblocking an edge that is not blocked is a
    /// no-op; the next refresh returns the edge to band-derived multipliers.
    pub fn unblock(&mut self, from: &str, to: &str) -> EngineResult<()> {
        let edge = self.resolve_edge(from, to)?;
        if self.blocked_edges.unblock(edge) {
            self.multipliers.set(edge, self.config.default_multiplier);
            info!("unblocked {}", self.network.edge_label(edge));
        }
        Ok(())
    }

    // ── Internal helpers ──────────────────────────────────────────────────

    /// The planner's view of the current costs.
    pub(crate) fn cost_field(&self) -> CostField<'_> {
        CostField::new(self.multipliers.as_slice(), self.blocked_edges.as_set())
    }

    /// Resolve an external `(from, to)` name pair to an `EdgeId`.
    pub(crate) fn resolve_edge(&self, from: &str, to: &str) -> EngineResult<EdgeId> {
        let from_id = self.network.node_id(from)?;
        let to_id   = self.network.node_id(to)?;
        self.network
            .edge_between(from_id, to_id)
            .ok_or_else(|| EngineError::UnknownEdge {
                from: from.to_string(),
                to:   to.to_string(),
            })
    }
}

// ── Hotspots ──────────────────────────────────────────────────────────────────

/// Identify hotspot edges: those touching one of the top-`fraction`
/// highest-out-degree nodes of the network.
pub(crate) fn compute_hotspots(network: &RoadNetwork, fraction: f64) -> FxHashSet<EdgeId> {
    if network.is_empty() || fraction <= 0.0 {
        return FxHashSet::default();
    }

    let mut nodes: Vec<NodeId> = network.nodes().collect();
    // Descending out-degree, ascending id on ties — the cut is stable.
    nodes.sort_by(|&a, &b| {
        network
            .out_degree(b)
            .cmp(&network.out_degree(a))
            .then(a.cmp(&b))
    });
    let keep = ((network.node_count() as f64 * fraction).ceil() as usize).max(1);
    let hot: FxHashSet<NodeId> = nodes.into_iter().take(keep).collect();

    network
        .edges()
        .filter(|&e| {
            let (from, to) = network.edge_key(e);
            hot.contains(&from) || hot.contains(&to)
        })
        .collect()
}
