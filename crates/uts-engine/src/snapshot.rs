//! Read-only state projections.
//!
//! Every type here is a plain serde-serialisable copy of engine state, cut
//! loose from the simulator's internals: ids are external labels, edges are
//! `"from->to"` strings, enums are their lowercase names.  External
//! collaborators (an HTTP façade, a visualiser) consume these snapshots and
//! never see `NodeId`/`EdgeId` values.
//!
//! Queries run between ticks on the owning thread; each call copies the
//! state it reports, so callers can hold a snapshot while the simulation
//! moves on.

use std::collections::BTreeMap;

use serde::Serialize;

use uts_agent::Agent;
use uts_graph::{Planner, RoadNetwork};
use uts_traffic::{Accident, Blockage, CongestionLevel};

use crate::error::EngineResult;
use crate::sim::Simulator;

// ── Map projections ───────────────────────────────────────────────────────────

/// One node of the loaded map.
#[derive(Debug, Clone, Serialize)]
pub struct NodeView {
    pub id: String,
    pub x:  f64,
    pub y:  f64,
}

/// One directed edge of the loaded map.
#[derive(Debug, Clone, Serialize)]
pub struct EdgeView {
    pub from:          String,
    pub to:            String,
    pub distance:      f64,
    pub allowed_modes: Vec<String>,
}

/// The full loaded map, for rendering front-ends.
#[derive(Debug, Clone, Serialize)]
pub struct MapDataView {
    pub id:    String,
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
}

/// A planning-query result.
#[derive(Debug, Clone, Serialize)]
pub struct PlanView {
    pub path: Vec<String>,
    pub cost: f64,
}

// ── Agent projections ─────────────────────────────────────────────────────────

/// One agent's externally visible state.
#[derive(Debug, Clone, Serialize)]
pub struct AgentView {
    pub id:                 String,
    pub mode:               String,
    pub status:             String,
    pub origin:             String,
    pub destination:        String,
    pub current:            String,
    pub next:               Option<String>,
    pub path:               Vec<String>,
    pub path_index:         usize,
    pub position_on_edge:   f64,
    pub current_speed:      f64,
    pub target_speed:       f64,
    pub nominal_speed:      f64,
    pub distance_travelled: f64,
    pub wait_time:          f64,
    pub reroute_count:      u32,
    pub travel_time:        Option<f64>,
}

impl AgentView {
    pub(crate) fn project(agent: &Agent, network: &RoadNetwork) -> Self {
        let name = |n: uts_core::NodeId| network.node_name(n).to_string();
        Self {
            id:                 agent.label.clone(),
            mode:               agent.mode.as_str().to_string(),
            status:             agent.status.as_str().to_string(),
            origin:             name(agent.origin),
            destination:        name(agent.destination),
            current:            name(agent.current),
            next:               agent.next.map(name),
            path:               agent.path.iter().map(|&n| name(n)).collect(),
            path_index:         agent.path_index,
            position_on_edge:   agent.position_on_edge,
            current_speed:      agent.current_speed,
            target_speed:       agent.target_speed,
            nominal_speed:      agent.nominal_speed,
            distance_travelled: agent.distance_travelled,
            wait_time:          agent.wait_time,
            reroute_count:      agent.reroute_count,
            travel_time:        agent.travel_time,
        }
    }
}

// ── Incident projections ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct AccidentView {
    pub id:            String,
    pub edge:          String,
    pub severity:      String,
    pub created_at:    f64,
    pub duration_secs: f64,
    pub expires_at:    f64,
}

impl AccidentView {
    pub(crate) fn project(accident: &Accident, network: &RoadNetwork) -> Self {
        Self {
            id:            accident.label.clone(),
            edge:          network.edge_label(accident.edge),
            severity:      accident.severity.as_str().to_string(),
            created_at:    accident.created_at,
            duration_secs: accident.duration_secs,
            expires_at:    accident.expires_at(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockageView {
    pub edge:   String,
    pub reason: String,
    pub since:  f64,
}

impl BlockageView {
    pub(crate) fn project(edge: uts_core::EdgeId, blockage: &Blockage, network: &RoadNetwork) -> Self {
        Self {
            edge:   network.edge_label(edge),
            reason: blockage.reason.clone(),
            since:  blockage.since,
        }
    }
}

// ── Aggregate statistics ──────────────────────────────────────────────────────

/// Fleet-level statistics over all agents (including arrived ones).
#[derive(Debug, Clone, Serialize)]
pub struct VehicleStats {
    pub total:               usize,
    pub active:              usize,
    pub arrived:             usize,
    pub by_type:             BTreeMap<String, usize>,
    pub by_status:           BTreeMap<String, usize>,
    /// Mean current speed over active agents; 0 with no active agents.
    pub average_speed:       f64,
    pub total_distance:      f64,
    pub total_wait_time:     f64,
    /// Mean completed trip time over arrived agents.
    pub average_travel_time: f64,
    pub total_reroutes:      u64,
}

/// Network-level congestion statistics.
#[derive(Debug, Clone, Serialize)]
pub struct TrafficStats {
    pub average_multiplier:      f64,
    /// Percentage of edges per band; sums to ~100.
    pub congestion_distribution: BTreeMap<String, f64>,
    pub accident_count:          usize,
    pub blocked_count:           usize,
}

/// One edge's live traffic condition.
#[derive(Debug, Clone, Serialize)]
pub struct EdgeTrafficView {
    pub edge:          String,
    pub vehicle_count: usize,
    pub density:       f64,
    pub level:         String,
    pub multiplier:    f64,
    pub probability:   f64,
}

/// A bottleneck entry of the congestion report.
#[derive(Debug, Clone, Serialize)]
pub struct BottleneckView {
    pub edge:        String,
    pub density:     f64,
    pub level:       String,
    pub multiplier:  f64,
    pub probability: f64,
}

/// The reroute-relevant congestion overview.
#[derive(Debug, Clone, Serialize)]
pub struct CongestionReport {
    pub congestion_distribution: BTreeMap<String, f64>,
    /// Densest edges first, clipped to the report's top-k.
    pub bottlenecks: Vec<BottleneckView>,
}

/// Engine metadata for dashboards and debugging.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationInfo {
    pub map:                String,
    pub step:               u64,
    pub elapsed_secs:       f64,
    pub running:            bool,
    pub node_count:         usize,
    pub edge_count:         usize,
    pub hotspot_edge_count: usize,
    pub agent_count:        usize,
    pub active_agents:      usize,
    pub total_spawned:      u64,
    pub accident_count:     usize,
    pub blocked_count:      usize,
    pub seed:               u64,
}

/// The whole-world snapshot served to front-ends each poll.
#[derive(Debug, Clone, Serialize)]
pub struct StateView {
    pub step:           u64,
    pub running:        bool,
    pub agents:         Vec<AgentView>,
    pub vehicle_stats:  VehicleStats,
    pub traffic_stats:  TrafficStats,
    pub edge_traffic:   Vec<EdgeTrafficView>,
    pub multipliers:    BTreeMap<String, f64>,
    pub total_spawned:  u64,
}

/// What one `tick()` did.
#[derive(Debug, Clone, Serialize)]
pub struct TickSummary {
    pub step:        u64,
    pub dt:          f64,
    /// Agents whose status is not arrived, post-tick.
    pub active:      usize,
    /// Agents that advanced along an edge this tick.
    pub moved:       usize,
    /// Agents arrived in total, post-tick.
    pub arrived:     usize,
    pub accidents:   Vec<AccidentView>,
    pub blocked:     Vec<BlockageView>,
    pub multipliers: BTreeMap<String, f64>,
}

// ── Query implementations ─────────────────────────────────────────────────────

/// Number of bottleneck entries a congestion report carries.
const REPORT_TOP_K: usize = 10;

impl<P: Planner> Simulator<P> {
    /// All nodes of the loaded map.
    pub fn nodes(&self) -> Vec<NodeView> {
        self.network
            .nodes()
            .map(|n| {
                let pos = self.network.node_pos[n.index()];
                NodeView { id: self.network.node_name(n).to_string(), x: pos.x, y: pos.y }
            })
            .collect()
    }

    /// The loaded map as rendering data.
    pub fn map_data(&self) -> MapDataView {
        let edges = self
            .network
            .edges()
            .map(|e| {
                let (from, to) = self.network.edge_key(e);
                EdgeView {
                    from:     self.network.node_name(from).to_string(),
                    to:       self.network.node_name(to).to_string(),
                    distance: self.network.edge_distance[e.index()],
                    allowed_modes: self.network.edge_modes[e.index()]
                        .modes()
                        .map(|m| m.as_str().to_string())
                        .collect(),
                }
            })
            .collect();
        MapDataView { id: self.map_id.clone(), nodes: self.nodes(), edges }
    }

    /// Ids of all maps known to the catalog.
    pub fn maps(&self) -> Vec<String> {
        self.catalog.ids()
    }

    /// Plan a path under the current multiplier field without spawning.
    ///
    /// Returns `Ok(None)` for the planner's explicit no-path outcome;
    /// unknown node names are validation errors.
    pub fn plan_route(
        &self,
        start: &str,
        goal:  &str,
        mode:  uts_core::VehicleMode,
    ) -> EngineResult<Option<PlanView>> {
        let start = self.network.node_id(start)?;
        let goal  = self.network.node_id(goal)?;
        match self.planner.plan(&self.network, start, goal, mode, &self.cost_field()) {
            Ok(path) => Ok(Some(PlanView {
                path: path.nodes.iter().map(|&n| self.network.node_name(n).to_string()).collect(),
                cost: path.cost,
            })),
            Err(uts_graph::GraphError::NoPath { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// One agent by external label.
    pub fn agent(&self, label: &str) -> EngineResult<AgentView> {
        let agent = self.store.get_by_label(label)?;
        Ok(AgentView::project(agent, &self.network))
    }

    /// All agents, ascending by spawn order.
    pub fn agents(&self) -> Vec<AgentView> {
        self.store
            .iter()
            .map(|a| AgentView::project(a, &self.network))
            .collect()
    }

    /// Active accidents, ascending by id.
    pub fn accidents(&self) -> Vec<AccidentView> {
        self.accident_table
            .iter()
            .map(|a| AccidentView::project(a, &self.network))
            .collect()
    }

    /// Current blockages, ascending by edge.
    pub fn blocked(&self) -> Vec<BlockageView> {
        self.blocked_edges
            .iter_sorted()
            .into_iter()
            .map(|(e, b)| BlockageView::project(e, b, &self.network))
            .collect()
    }

    /// Fleet statistics.
    pub fn vehicle_statistics(&self) -> VehicleStats {
        let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_status: BTreeMap<String, usize> = BTreeMap::new();
        let mut active = 0usize;
        let mut arrived = 0usize;
        let mut speed_sum = 0.0;
        let mut total_distance = 0.0;
        let mut total_wait = 0.0;
        let mut travel_sum = 0.0;
        let mut total_reroutes = 0u64;

        for agent in self.store.iter() {
            *by_type.entry(agent.mode.as_str().to_string()).or_default() += 1;
            *by_status.entry(agent.status.as_str().to_string()).or_default() += 1;
            total_distance += agent.distance_travelled;
            total_wait += agent.wait_time;
            total_reroutes += agent.reroute_count as u64;
            if agent.status.is_active() {
                active += 1;
                speed_sum += agent.current_speed;
            } else {
                arrived += 1;
                travel_sum += agent.travel_time.unwrap_or(0.0);
            }
        }

        VehicleStats {
            total: self.store.len(),
            active,
            arrived,
            by_type,
            by_status,
            average_speed: if active > 0 { speed_sum / active as f64 } else { 0.0 },
            total_distance,
            total_wait_time: total_wait,
            average_travel_time: if arrived > 0 { travel_sum / arrived as f64 } else { 0.0 },
            total_reroutes,
        }
    }

    /// Network congestion statistics.
    pub fn traffic_statistics(&self) -> TrafficStats {
        let edge_count = self.network.edge_count();
        let average_multiplier = if edge_count > 0 {
            self.multipliers.as_slice().iter().sum::<f64>() / edge_count as f64
        } else {
            0.0
        };
        TrafficStats {
            average_multiplier,
            congestion_distribution: self.congestion_distribution(),
            accident_count: self.accident_table.len(),
            blocked_count: self.blocked_edges.len(),
        }
    }

    /// Per-edge live conditions, ascending by edge id.
    pub fn edge_traffic(&self) -> Vec<EdgeTrafficView> {
        self.network
            .edges()
            .map(|e| EdgeTrafficView {
                edge:          self.network.edge_label(e),
                vehicle_count: self.store.agents_on_edge(e).len(),
                density:       self.analyzer.density(e),
                level:         self.analyzer.level(e).as_str().to_string(),
                multiplier:    self.multipliers.get(e),
                probability:   self.analyzer.probability(e),
            })
            .collect()
    }

    /// Bottleneck-focused congestion report.
    pub fn congestion_report(&self) -> CongestionReport {
        let bottlenecks = self
            .analyzer
            .bottlenecks(self.config.bottleneck_density, REPORT_TOP_K)
            .into_iter()
            .map(|(e, density)| BottleneckView {
                edge:        self.network.edge_label(e),
                density,
                level:       CongestionLevel::from_density(density).as_str().to_string(),
                multiplier:  self.multipliers.get(e),
                probability: self.analyzer.probability(e),
            })
            .collect();
        CongestionReport {
            congestion_distribution: self.congestion_distribution(),
            bottlenecks,
        }
    }

    /// Engine metadata.
    pub fn simulation_info(&self) -> SimulationInfo {
        SimulationInfo {
            map:                self.map_id.clone(),
            step:               self.clock.step,
            elapsed_secs:       self.clock.elapsed_secs,
            running:            self.running,
            node_count:         self.network.node_count(),
            edge_count:         self.network.edge_count(),
            hotspot_edge_count: self.hotspot_edges.len(),
            agent_count:        self.store.len(),
            active_agents:      self.store.active_count(),
            total_spawned:      self.store.total_spawned(),
            accident_count:     self.accident_table.len(),
            blocked_count:      self.blocked_edges.len(),
            seed:               self.config.seed,
        }
    }

    /// The whole-world snapshot.
    pub fn state(&self) -> StateView {
        StateView {
            step:          self.clock.step,
            running:       self.running,
            agents:        self.agents(),
            vehicle_stats: self.vehicle_statistics(),
            traffic_stats: self.traffic_statistics(),
            edge_traffic:  self.edge_traffic(),
            multipliers:   self.multiplier_snapshot(),
            total_spawned: self.store.total_spawned(),
        }
    }

    // ── Shared projection helpers ─────────────────────────────────────────

    pub(crate) fn multiplier_snapshot(&self) -> BTreeMap<String, f64> {
        self.network
            .edges()
            .map(|e| (self.network.edge_label(e), self.multipliers.get(e)))
            .collect()
    }

    fn congestion_distribution(&self) -> BTreeMap<String, f64> {
        let shares = self.analyzer.level_distribution();
        CongestionLevel::ALL
            .into_iter()
            .map(|level| (level.as_str().to_string(), shares[level.index()]))
            .collect()
    }
}
