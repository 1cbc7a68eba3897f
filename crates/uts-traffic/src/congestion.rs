//! Density bands, the multiplier field, and the congestion analyser.
//!
//! # Band model
//!
//! Edge density (occupant capacity-usage over edge capacity) classifies into
//! five bands.  Each refresh draws a uniform multiplier sample from the
//! band's range, so planning costs wander stochastically within the band
//! instead of snapping between fixed values:
//!
//! | Band       | Density       | Sample range |
//! |------------|---------------|--------------|
//! | free_flow  | `< 0.2`       | (0.5, 0.8)   |
//! | light      | `[0.2, 0.4)`  | (1.0, 1.5)   |
//! | moderate   | `[0.4, 0.7)`  | (1.5, 2.5)   |
//! | heavy      | `[0.7, 1.0)`  | (2.5, 4.0)   |
//! | congested  | `≥ 1.0`       | (4.0, 6.0)   |
//!
//! Samples are retained in a bounded per-edge ring (last 100 by default);
//! the running mean feeds the congestion probability used by the reroute
//! decider.

use std::collections::VecDeque;

use uts_core::{EdgeId, SimRng};
use uts_agent::AgentStore;
use uts_graph::RoadNetwork;

/// Sentinel multiplier held by blocked edges.  Planners skip blocked edges
/// via the blocked set; the sentinel keeps the field self-describing for
/// snapshot consumers.
pub const BLOCKED_MULTIPLIER: f64 = 100.0;

// ── CongestionLevel ───────────────────────────────────────────────────────────

/// Named density band.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum CongestionLevel {
    FreeFlow,
    Light,
    Moderate,
    Heavy,
    Congested,
}

impl CongestionLevel {
    /// All bands in ascending density order.
    pub const ALL: [CongestionLevel; 5] = [
        CongestionLevel::FreeFlow,
        CongestionLevel::Light,
        CongestionLevel::Moderate,
        CongestionLevel::Heavy,
        CongestionLevel::Congested,
    ];

    /// Classify a density value.
    pub fn from_density(density: f64) -> Self {
        if density < 0.2 {
            CongestionLevel::FreeFlow
        } else if density < 0.4 {
            CongestionLevel::Light
        } else if density < 0.7 {
            CongestionLevel::Moderate
        } else if density < 1.0 {
            CongestionLevel::Heavy
        } else {
            CongestionLevel::Congested
        }
    }

    /// Uniform sampling interval for the band's multiplier.
    pub fn sample_range(self) -> (f64, f64) {
        match self {
            CongestionLevel::FreeFlow  => (0.5, 0.8),
            CongestionLevel::Light     => (1.0, 1.5),
            CongestionLevel::Moderate  => (1.5, 2.5),
            CongestionLevel::Heavy     => (2.5, 4.0),
            CongestionLevel::Congested => (4.0, 6.0),
        }
    }

    /// Position in [`CongestionLevel::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CongestionLevel::FreeFlow  => "free_flow",
            CongestionLevel::Light     => "light",
            CongestionLevel::Moderate  => "moderate",
            CongestionLevel::Heavy     => "heavy",
            CongestionLevel::Congested => "congested",
        }
    }
}

impl std::fmt::Display for CongestionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── MultiplierField ───────────────────────────────────────────────────────────

/// The current planning-cost multiplier of every edge, dense by `EdgeId`.
pub struct MultiplierField {
    values: Vec<f64>,
}

impl MultiplierField {
    /// Field of `edge_count` edges, all at `default`.
    pub fn new(edge_count: usize, default: f64) -> Self {
        Self { values: vec![default; edge_count] }
    }

    #[inline]
    pub fn get(&self, edge: EdgeId) -> f64 {
        self.values[edge.index()]
    }

    #[inline]
    pub fn set(&mut self, edge: EdgeId, value: f64) {
        self.values[edge.index()] = value;
    }

    /// Dense view for the planner's [`CostField`][uts_graph::CostField].
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Re-draw every edge from the free-flow band (reset semantics).
    pub fn resample_free_flow(&mut self, rng: &mut SimRng) {
        let (lo, hi) = CongestionLevel::FreeFlow.sample_range();
        for value in &mut self.values {
            *value = rng.gen_range(lo..hi);
        }
    }
}

// ── Per-edge sample history ───────────────────────────────────────────────────

/// Bounded ring of recent multiplier samples for one edge.
#[derive(Clone)]
struct History {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl History {
    fn new(capacity: usize) -> Self {
        Self { samples: VecDeque::with_capacity(capacity), capacity }
    }

    fn push(&mut self, sample: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Mean of retained samples; 1.0 (neutral) while empty.
    fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 1.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

// ── CongestionAnalyzer ────────────────────────────────────────────────────────

/// Derives densities, band samples, and congestion probabilities per edge.
///
/// Sized to one map; the engine constructs a fresh analyser on map switch.
pub struct CongestionAnalyzer {
    densities: Vec<f64>,
    histories: Vec<History>,
}

impl CongestionAnalyzer {
    pub fn new(edge_count: usize, history_capacity: usize) -> Self {
        Self {
            densities: vec![0.0; edge_count],
            histories: vec![History::new(history_capacity); edge_count],
        }
    }

    pub fn edge_count(&self) -> usize {
        self.densities.len()
    }

    // ── Density measurement ───────────────────────────────────────────────

    /// Recompute every edge's density from the store's occupancy index:
    /// `Σ capacity-usage of occupants / (base_capacity × distance)`.
    pub fn measure(&mut self, network: &RoadNetwork, store: &AgentStore, base_capacity: f64) {
        self.densities.fill(0.0);
        for (edge, occupants) in store.occupied_edges() {
            let usage: f64 = occupants
                .iter()
                .filter_map(|&id| store.get(id))
                .map(|a| a.capacity_usage)
                .sum();
            let capacity = base_capacity * network.edge_distance[edge.index()];
            self.densities[edge.index()] = usage / capacity;
        }
    }

    #[inline]
    pub fn density(&self, edge: EdgeId) -> f64 {
        self.densities[edge.index()]
    }

    pub fn densities(&self) -> &[f64] {
        &self.densities
    }

    /// Current band of `edge`.
    #[inline]
    pub fn level(&self, edge: EdgeId) -> CongestionLevel {
        CongestionLevel::from_density(self.densities[edge.index()])
    }

    // ── Band sampling & history ───────────────────────────────────────────

    /// Draw one multiplier sample from `edge`'s current band and record it
    /// in the history ring.
    pub fn sample_multiplier(&mut self, edge: EdgeId, rng: &mut SimRng) -> f64 {
        let (lo, hi) = self.level(edge).sample_range();
        let sample = rng.gen_range(lo..hi);
        self.histories[edge.index()].push(sample);
        sample
    }

    /// `clamp(density, 0, 1) + (mean(history) − 1) / 4`, clamped to [0, 1].
    pub fn probability(&self, edge: EdgeId) -> f64 {
        let density = self.densities[edge.index()].clamp(0.0, 1.0);
        let history_term = (self.histories[edge.index()].mean() - 1.0) / 4.0;
        (density + history_term).clamp(0.0, 1.0)
    }

    pub fn history_len(&self, edge: EdgeId) -> usize {
        self.histories[edge.index()].len()
    }

    pub fn history_mean(&self, edge: EdgeId) -> f64 {
        self.histories[edge.index()].mean()
    }

    // ── Aggregates ────────────────────────────────────────────────────────

    /// Edges at or above `threshold` density, sorted by descending density
    /// (ties ascending by edge id), clipped to `k`.
    pub fn bottlenecks(&self, threshold: f64, k: usize) -> Vec<(EdgeId, f64)> {
        let mut hits: Vec<(EdgeId, f64)> = self
            .densities
            .iter()
            .enumerate()
            .filter(|&(_, &d)| d >= threshold)
            .map(|(i, &d)| (EdgeId(i as u32), d))
            .collect();
        hits.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        hits.truncate(k);
        hits
    }

    /// Percentage of edges in each band, indexed by
    /// [`CongestionLevel::index`].  Sums to ~100 for a non-empty map.
    pub fn level_distribution(&self) -> [f64; 5] {
        let mut counts = [0usize; 5];
        for &d in &self.densities {
            counts[CongestionLevel::from_density(d).index()] += 1;
        }
        let total = self.densities.len().max(1) as f64;
        let mut out = [0.0; 5];
        for (slot, count) in out.iter_mut().zip(counts) {
            *slot = count as f64 / total * 100.0;
        }
        out
    }
}
