//! Road network representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_from[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! All edge arrays (`edge_from`, `edge_to`, `edge_distance`, `edge_modes`)
//! are sorted by source node and indexed by `EdgeId`.  Iteration over a
//! node's outgoing edges is therefore a contiguous memory scan — ideal for
//! the planner's inner loop.  Per-edge dynamic state elsewhere in the
//! simulator (multipliers, history, densities) reuses the same `EdgeId`
//! indexing.
//!
//! # Name interning
//!
//! Map documents identify nodes by string; the builder interns each name to
//! a dense `NodeId` and keeps the reverse table for snapshots.  An "edge
//! key" — the ordered `(from, to)` node pair — resolves to an `EdgeId`
//! through `edge_between`.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(x, y)` to the nearest `NodeId`.  Used by
//! coordinate-based spawning and by front-ends that translate clicks into
//! nodes.

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;

use uts_core::{EdgeId, ModeMask, NodeId, Point, VehicleMode};

use crate::error::{GraphError, GraphResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a 2-D `[x, y]` point with the
/// associated `NodeId`.
#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2],
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Directed road graph in CSR format plus name interning and a spatial
/// index.
///
/// Immutable for the lifetime of a loaded map.  Dense fields are `pub` for
/// direct indexed access on hot paths.  Do not construct directly; use
/// [`RoadNetworkBuilder`] or [`MapDoc::build`][crate::MapDoc::build].
pub struct RoadNetwork {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<Point>,

    /// External name of each node.  Indexed by `NodeId`.
    pub node_names: Vec<String>,

    /// Reverse lookup: node name → `NodeId`.
    name_index: FxHashMap<String, NodeId>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Outgoing edges of node `n` are at EdgeIds
    /// `node_out_start[n] .. node_out_start[n+1]`.
    /// Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId = position in sorted order) ──────────
    /// Source node of each edge.
    pub edge_from: Vec<NodeId>,

    /// Destination node of each edge.
    pub edge_to: Vec<NodeId>,

    /// Geometric length of each edge in abstract length units.  Strictly
    /// positive (validated at load).
    pub edge_distance: Vec<f64>,

    /// Modes allowed on each edge.
    pub edge_modes: Vec<ModeMask>,

    /// Edge-key lookup: ordered `(from, to)` pair → `EdgeId`.
    pair_index: FxHashMap<(NodeId, NodeId), EdgeId>,

    // ── Spatial index ─────────────────────────────────────────────────────
    spatial_idx: RTree<NodeEntry>,
}

impl RoadNetwork {
    /// Construct an empty network with no nodes or edges.
    pub fn empty() -> Self {
        RoadNetworkBuilder::new().build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    /// Iterator over all `NodeId`s in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.node_pos.len()).map(|i| NodeId(i as u32))
    }

    /// Iterator over all `EdgeId`s in ascending order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        (0..self.edge_to.len()).map(|i| EdgeId(i as u32))
    }

    // ── Name interning ────────────────────────────────────────────────────

    /// Resolve a node name to its `NodeId`.
    pub fn node_id(&self, name: &str) -> GraphResult<NodeId> {
        self.name_index
            .get(name)
            .copied()
            .ok_or_else(|| GraphError::UnknownNode(name.to_string()))
    }

    /// External name of `node`.
    #[inline]
    pub fn node_name(&self, node: NodeId) -> &str {
        &self.node_names[node.index()]
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    ///
    /// This is a contiguous index range — no heap allocation.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    /// Out-degree of `node` (number of outgoing edges).
    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// Resolve an edge key — the ordered `(from, to)` pair — to its
    /// `EdgeId`, if such an edge exists.
    #[inline]
    pub fn edge_between(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.pair_index.get(&(from, to)).copied()
    }

    /// The `(from, to)` node pair of `edge`.
    #[inline]
    pub fn edge_key(&self, edge: EdgeId) -> (NodeId, NodeId) {
        (self.edge_from[edge.index()], self.edge_to[edge.index()])
    }

    /// `"from->to"` label of `edge`, using external node names.
    pub fn edge_label(&self, edge: EdgeId) -> String {
        format!(
            "{}->{}",
            self.node_name(self.edge_from[edge.index()]),
            self.node_name(self.edge_to[edge.index()])
        )
    }

    /// `true` iff `mode` may use `edge`.
    #[inline]
    pub fn edge_allows(&self, edge: EdgeId, mode: VehicleMode) -> bool {
        self.edge_modes[edge.index()].allows(mode)
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Return the `NodeId` nearest to `pos`.
    ///
    /// Returns `None` only if the network has no nodes.
    pub fn nearest_node(&self, pos: Point) -> Option<NodeId> {
        self.spatial_idx
            .nearest_neighbor(&[pos.x, pos.y])
            .map(|e| e.id)
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`RoadNetwork`] incrementally, then call [`build`](Self::build).
///
/// The builder accepts named nodes and edges in any order.  `build()` sorts
/// edges by source node, constructs the CSR arrays, and bulk-loads the
/// R-tree.  A non-one-way edge materialises both directions.
pub struct RoadNetworkBuilder {
    names:      Vec<String>,
    positions:  Vec<Point>,
    name_index: FxHashMap<String, NodeId>,
    raw_edges:  Vec<RawEdge>,
}

struct RawEdge {
    from:     NodeId,
    to:       NodeId,
    distance: f64,
    modes:    ModeMask,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self {
            names:      Vec::new(),
            positions:  Vec::new(),
            name_index: FxHashMap::default(),
            raw_edges:  Vec::new(),
        }
    }

    /// Add a named node and return its `NodeId` (sequential from 0).
    ///
    /// # Errors
    /// `DuplicateNode` if `name` was already added.
    pub fn add_node(&mut self, name: &str, pos: Point) -> GraphResult<NodeId> {
        if self.name_index.contains_key(name) {
            return Err(GraphError::DuplicateNode(name.to_string()));
        }
        let id = NodeId(self.names.len() as u32);
        self.names.push(name.to_string());
        self.positions.push(pos);
        self.name_index.insert(name.to_string(), id);
        Ok(id)
    }

    /// Add an edge from `from` to `to`.  Unless `one_way`, the reverse
    /// direction is materialised as well.
    ///
    /// # Errors
    /// `NonPositiveDistance` if `distance <= 0` (zero-length edges would
    /// produce degenerate kinematics and are rejected at load time).
    pub fn add_edge(
        &mut self,
        from:     NodeId,
        to:       NodeId,
        distance: f64,
        modes:    ModeMask,
        one_way:  bool,
    ) -> GraphResult<()> {
        if !(distance > 0.0) || !distance.is_finite() {
            return Err(GraphError::NonPositiveDistance {
                from:     self.names[from.index()].clone(),
                to:       self.names[to.index()].clone(),
                distance,
            });
        }
        self.raw_edges.push(RawEdge { from, to, distance, modes });
        if !one_way {
            self.raw_edges.push(RawEdge { from: to, to: from, distance, modes });
        }
        Ok(())
    }

    /// Resolve a node name added earlier.
    pub fn node_id(&self, name: &str) -> GraphResult<NodeId> {
        self.name_index
            .get(name)
            .copied()
            .ok_or_else(|| GraphError::UnknownNode(name.to_string()))
    }

    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    /// Consume the builder and produce a [`RoadNetwork`].
    ///
    /// Time complexity: O(E log E) for the edge sort + O(N log N) for the
    /// R-tree bulk load.
    pub fn build(self) -> RoadNetwork {
        let node_count = self.names.len();
        let edge_count = self.raw_edges.len();

        // Stable sort by source node: edges from the same node keep their
        // insertion order, which in turn keeps planner expansion (and the
        // RNG stream feeding on edge iteration) reproducible across runs.
        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| e.from.0);

        let edge_from:     Vec<NodeId>   = raw.iter().map(|e| e.from).collect();
        let edge_to:       Vec<NodeId>   = raw.iter().map(|e| e.to).collect();
        let edge_distance: Vec<f64>      = raw.iter().map(|e| e.distance).collect();
        let edge_modes:    Vec<ModeMask> = raw.iter().map(|e| e.modes).collect();

        // Build CSR row pointer (node_out_start).
        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        // Edge-key lookup.  The first edge for a given (from, to) pair wins;
        // later duplicates remain reachable through CSR iteration only.
        let mut pair_index = FxHashMap::default();
        for (i, e) in raw.iter().enumerate() {
            pair_index.entry((e.from, e.to)).or_insert(EdgeId(i as u32));
        }

        // Bulk-load R-tree for O(N log N) construction (faster than N inserts).
        let entries: Vec<NodeEntry> = self
            .positions
            .iter()
            .enumerate()
            .map(|(i, &pos)| NodeEntry {
                point: [pos.x, pos.y],
                id: NodeId(i as u32),
            })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        RoadNetwork {
            node_pos: self.positions,
            node_names: self.names,
            name_index: self.name_index,
            node_out_start,
            edge_from,
            edge_to,
            edge_distance,
            edge_modes,
            pair_index,
            spatial_idx,
        }
    }
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
