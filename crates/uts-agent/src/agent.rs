//! The per-agent kinematic record.
//!
//! # Path/position invariants
//!
//! For every agent: `path[0]` is the origin, `path[last]` the destination,
//! and `path[path_index]` the current node.  While the agent is not arrived,
//! `next == Some(path[path_index + 1])` and the agent sits at
//! `position_on_edge ∈ [0, 1]` along the directed edge `(current, next)`.
//! Crossing 1.0 consumes a node transition atomically inside the tick;
//! `position_on_edge` resets to 0 on the new edge.
//!
//! These invariants are debug-asserted after every mutation; release builds
//! log-and-continue at the engine level instead.

use uts_core::{AgentId, NodeId, VehicleMode};

// ── AgentStatus ───────────────────────────────────────────────────────────────

/// Lifecycle / kinematic state of an agent.  A closed five-variant set.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum AgentStatus {
    /// Spawned but not yet advanced by a tick.
    Waiting,
    /// Travelling with a clear road ahead.
    Moving,
    /// Halted or crawling behind a leader, or unable to replan.
    Stuck,
    /// Reached the destination; inert until removed.
    Arrived,
    /// Adopted a fresh path this tick; reverts to moving/stuck next tick.
    Rerouting,
}

impl AgentStatus {
    /// `true` for any status other than `Arrived`.
    #[inline]
    pub fn is_active(self) -> bool {
        self != AgentStatus::Arrived
    }

    /// `true` while the agent occupies an edge (moving, stuck, rerouting).
    /// Waiting agents stand at a node; arrived agents are off the road.
    #[inline]
    pub fn is_en_route(self) -> bool {
        matches!(
            self,
            AgentStatus::Moving | AgentStatus::Stuck | AgentStatus::Rerouting
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AgentStatus::Waiting   => "waiting",
            AgentStatus::Moving    => "moving",
            AgentStatus::Stuck     => "stuck",
            AgentStatus::Arrived   => "arrived",
            AgentStatus::Rerouting => "rerouting",
        }
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Agent ─────────────────────────────────────────────────────────────────────

/// One moving agent.  A closed record — every field the simulator tracks is
/// declared here; there is no dynamic attribute storage.
#[derive(Debug, Clone)]
pub struct Agent {
    pub id:    AgentId,
    /// External identifier, `{type}_{n}` with a per-type counter.
    pub label: String,
    pub mode:  VehicleMode,

    // ── Route ─────────────────────────────────────────────────────────────
    pub origin:      NodeId,
    pub destination: NodeId,
    /// Full planned node sequence; replaced wholesale on reroute.
    pub path:        Vec<NodeId>,
    /// Index of the current node within `path`.
    pub path_index:  usize,
    pub current:     NodeId,
    /// `path[path_index + 1]`, or `None` at the destination.
    pub next:        Option<NodeId>,

    // ── Kinematics ────────────────────────────────────────────────────────
    pub status:           AgentStatus,
    /// Fraction of the way along the edge `(current, next)`, in [0, 1].
    pub position_on_edge: f64,
    /// Current speed in length units per second.
    pub current_speed:    f64,
    /// Speed the integrator steers toward, set by the car-following pass.
    pub target_speed:     f64,
    /// Personal nominal speed sampled at spawn from the mode's profile.
    pub nominal_speed:    f64,
    /// Road-space contribution used by the congestion analyser.
    pub capacity_usage:   f64,

    // ── Statistics ────────────────────────────────────────────────────────
    pub distance_travelled: f64,
    pub wait_time:          f64,
    pub reroute_count:      u32,
    /// Simulated time at spawn.
    pub spawned_at:         f64,
    /// Total trip time, recorded once on arrival.
    pub travel_time:        Option<f64>,
}

impl Agent {
    /// Construct a freshly spawned agent from a planned path.
    ///
    /// The path must be non-empty and begin at the spawn node.  Agents start
    /// `Waiting` at full nominal speed; the first tick promotes them to
    /// moving (or arrives them immediately for a single-node path).
    pub fn new(
        id:             AgentId,
        label:          String,
        mode:           VehicleMode,
        path:           Vec<NodeId>,
        nominal_speed:  f64,
        capacity_usage: f64,
        spawned_at:     f64,
    ) -> Self {
        debug_assert!(!path.is_empty(), "agent path must contain the origin");
        let origin      = path[0];
        let destination = *path.last().unwrap_or(&origin);
        let next        = path.get(1).copied();
        Self {
            id,
            label,
            mode,
            origin,
            destination,
            path,
            path_index: 0,
            current: origin,
            next,
            status: AgentStatus::Waiting,
            position_on_edge: 0.0,
            current_speed: nominal_speed,
            target_speed: nominal_speed,
            nominal_speed,
            capacity_usage,
            distance_travelled: 0.0,
            wait_time: 0.0,
            reroute_count: 0,
            spawned_at,
            travel_time: None,
        }
    }

    /// The directed edge key the agent currently travels, if any.
    #[inline]
    pub fn current_edge_key(&self) -> Option<(NodeId, NodeId)> {
        self.next.map(|next| (self.current, next))
    }

    /// Consume one node crossing: step to `next`, advance the path index,
    /// and reset the edge position.
    ///
    /// Callers must only invoke this when `next` is `Some`.
    pub fn advance_node(&mut self) {
        debug_assert!(self.next.is_some(), "advance_node without a next node");
        if let Some(next) = self.next {
            self.current = next;
            self.path_index += 1;
            self.next = self.path.get(self.path_index + 1).copied();
            self.position_on_edge = 0.0;
        }
        self.debug_check();
    }

    /// Adopt a replacement path starting at the current node.
    ///
    /// The edge position is preserved when the immediate next hop is
    /// unchanged (the agent keeps rolling along the same edge) and reset to
    /// 0 otherwise.
    pub fn adopt_path(&mut self, path: Vec<NodeId>) {
        debug_assert_eq!(path.first(), Some(&self.current), "reroute path must start here");
        let new_next = path.get(1).copied();
        if new_next != self.next {
            self.position_on_edge = 0.0;
        }
        self.path = path;
        self.path_index = 0;
        self.next = new_next;
        self.destination = *self.path.last().unwrap_or(&self.current);
        self.debug_check();
    }

    /// The next `k` directed edge keys of the remaining path, clipped at the
    /// path end.  Used by the reroute decider's lookahead.
    pub fn upcoming_edges(&self, k: usize) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.path[self.path_index..]
            .windows(2)
            .take(k)
            .map(|w| (w[0], w[1]))
    }

    /// Debug-build invariant checks (§ module docs).
    #[inline]
    pub fn debug_check(&self) {
        debug_assert_eq!(self.path.get(self.path_index), Some(&self.current));
        debug_assert!((0.0..=1.0).contains(&self.position_on_edge));
        if self.status.is_active() && self.next.is_some() {
            debug_assert_eq!(self.path.get(self.path_index + 1).copied(), self.next);
        }
    }
}
