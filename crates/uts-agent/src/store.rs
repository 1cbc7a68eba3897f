//! The `AgentStore` — all live agents plus lookup indices.
//!
//! # Indices
//!
//! | Index        | Keyed by            | Use                                   |
//! |--------------|---------------------|---------------------------------------|
//! | primary      | `AgentId` (ordered) | deterministic tick iteration          |
//! | `by_label`   | external label      | command boundary (`remove`, `agent`)  |
//! | `occupancy`  | `EdgeId`            | car-following scan, density measure   |
//!
//! The primary map is a `BTreeMap` so every per-tick pass visits agents in
//! ascending `AgentId` order; all RNG consumption downstream of agent
//! iteration is therefore reproducible.  The occupancy index is rebuilt from
//! scratch once per tick after the integration pass — the scan is O(agents)
//! and sidesteps stale entries under reroutes and removals.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use uts_core::{AgentId, EdgeId, VehicleMode};
use uts_graph::RoadNetwork;

use crate::agent::Agent;
use crate::error::{AgentError, AgentResult};

/// Owner of all agent records and their indices.
#[derive(Default)]
pub struct AgentStore {
    agents:    BTreeMap<AgentId, Agent>,
    by_label:  FxHashMap<String, AgentId>,
    occupancy: FxHashMap<EdgeId, Vec<AgentId>>,
    next_id:   u32,
    /// Per-mode label counters (`car_0`, `car_1`, … independent of other modes).
    label_counters: [u32; 3],
    /// Successful spawns since construction or the last `clear`.
    total_spawned: u64,
}

impl AgentStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Reserve the next `(AgentId, label)` pair for an agent of `mode`.
    ///
    /// Reservation and insertion are separate because planning happens in
    /// between and may fail — a failed spawn must not consume a label.
    pub fn peek_handle(&self, mode: VehicleMode) -> (AgentId, String) {
        let id = AgentId(self.next_id);
        let label = format!("{}_{}", mode.as_str(), self.label_counters[mode.index()]);
        (id, label)
    }

    /// Insert a freshly constructed agent, consuming the handle returned by
    /// [`peek_handle`](Self::peek_handle).
    pub fn insert(&mut self, agent: Agent) {
        debug_assert_eq!(agent.id.0, self.next_id, "agents must be inserted in handle order");
        self.next_id += 1;
        self.label_counters[agent.mode.index()] += 1;
        self.total_spawned += 1;
        self.by_label.insert(agent.label.clone(), agent.id);
        self.agents.insert(agent.id, agent);
    }

    /// Remove an agent by its external label.
    pub fn remove_by_label(&mut self, label: &str) -> AgentResult<Agent> {
        let id = self
            .by_label
            .remove(label)
            .ok_or_else(|| AgentError::NotFound(label.to_string()))?;
        // The primary entry always exists when the label index has it.
        self.agents
            .remove(&id)
            .ok_or_else(|| AgentError::NotFound(label.to_string()))
    }

    /// Drop all agents and counters (reset / map switch).
    pub fn clear(&mut self) {
        self.agents.clear();
        self.by_label.clear();
        self.occupancy.clear();
        self.next_id = 0;
        self.label_counters = [0; 3];
        self.total_spawned = 0;
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(&id)
    }

    pub fn get_by_label(&self, label: &str) -> AgentResult<&Agent> {
        self.by_label
            .get(label)
            .and_then(|id| self.agents.get(id))
            .ok_or_else(|| AgentError::NotFound(label.to_string()))
    }

    /// All agents in ascending `AgentId` order.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Agent> {
        self.agents.values_mut()
    }

    /// Ids of all agents, ascending.  Useful when a pass needs to mutate
    /// agents while consulting the rest of the store.
    pub fn ids(&self) -> Vec<AgentId> {
        self.agents.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Number of agents whose status is not `Arrived`.
    pub fn active_count(&self) -> usize {
        self.agents.values().filter(|a| a.status.is_active()).count()
    }

    pub fn total_spawned(&self) -> u64 {
        self.total_spawned
    }

    // ── Edge occupancy ────────────────────────────────────────────────────

    /// Agents currently on `edge`, ascending by `AgentId`.
    pub fn agents_on_edge(&self, edge: EdgeId) -> &[AgentId] {
        self.occupancy.get(&edge).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Rebuild the edge-occupancy index from scratch.
    ///
    /// Every en-route agent (moving, stuck, or rerouting, with a next node)
    /// lands on exactly one edge; waiting and arrived agents appear nowhere.
    pub fn rebuild_occupancy(&mut self, network: &RoadNetwork) {
        self.occupancy.clear();
        for agent in self.agents.values() {
            if !agent.status.is_en_route() {
                continue;
            }
            let Some((from, to)) = agent.current_edge_key() else {
                continue;
            };
            match network.edge_between(from, to) {
                Some(edge) => self.occupancy.entry(edge).or_default().push(agent.id),
                // A path can only reference edges of the network it was
                // planned on; reaching here means state crossed a map switch.
                None => debug_assert!(false, "agent {} on unknown edge", agent.label),
            }
        }
    }

    /// Edges with at least one occupant, with their occupant lists.
    pub fn occupied_edges(&self) -> impl Iterator<Item = (EdgeId, &[AgentId])> {
        self.occupancy.iter().map(|(e, v)| (*e, v.as_slice()))
    }
}
