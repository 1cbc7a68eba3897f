//! Accidents and blockages.
//!
//! Both incident kinds push an edge's multiplier away from its band value:
//! an accident applies a severity boost on top of the band sample and
//! expires on its own; a blockage pins the sentinel and lasts until an
//! explicit `unblock`.  At most one accident may be active per edge — a
//! second `create` on the same edge is rejected rather than overlaid or
//! overwritten, so resolve/expiry can restore the exact pre-boost
//! multiplier it stored at creation.

use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};

use uts_core::{AccidentId, EdgeId, SimRng};

use crate::error::{TrafficError, TrafficResult};

// ── Severity ──────────────────────────────────────────────────────────────────

/// How bad an accident is; drives both the multiplier boost and how long
/// the accident lingers.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Severity {
    Minor,
    Moderate,
    Severe,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Minor, Severity::Moderate, Severity::Severe];

    /// Post-multiplicative factor applied to the edge's multiplier.
    pub fn boost(self) -> f64 {
        match self {
            Severity::Minor    => 2.0,
            Severity::Moderate => 4.0,
            Severity::Severe   => 10.0,
        }
    }

    /// Uniform sampling interval for the accident duration, in seconds.
    pub fn duration_range(self) -> (f64, f64) {
        match self {
            Severity::Minor    => (30.0, 60.0),
            Severity::Moderate => (60.0, 90.0),
            Severity::Severe   => (90.0, 120.0),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Minor    => "minor",
            Severity::Moderate => "moderate",
            Severity::Severe   => "severe",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Accident ──────────────────────────────────────────────────────────────────

/// One active accident.
#[derive(Debug, Clone)]
pub struct Accident {
    pub id:       AccidentId,
    /// External identifier, `acc_{n}`.
    pub label:    String,
    pub edge:     EdgeId,
    pub severity: Severity,
    /// Simulated time at creation.
    pub created_at: f64,
    /// Lifetime in simulated seconds, sampled from the severity's range.
    pub duration_secs: f64,
    /// The edge's multiplier before the boost, restored on resolve/expiry.
    pub prior_multiplier: f64,
}

impl Accident {
    #[inline]
    pub fn expires_at(&self) -> f64 {
        self.created_at + self.duration_secs
    }

    #[inline]
    pub fn is_expired(&self, now: f64) -> bool {
        self.expires_at() < now
    }
}

// ── AccidentTable ─────────────────────────────────────────────────────────────

/// All active accidents, indexed by id and by edge.
#[derive(Default)]
pub struct AccidentTable {
    by_id:   BTreeMap<AccidentId, Accident>,
    by_edge: FxHashMap<EdgeId, AccidentId>,
    next_id: u32,
}

impl AccidentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new accident on `edge`.
    ///
    /// `duration_secs` is sampled by the caller (it owns the RNG policy);
    /// `prior_multiplier` is the edge's field value before the boost.
    ///
    /// # Errors
    /// `DuplicateAccident` if the edge already carries one.
    pub fn create(
        &mut self,
        edge:             EdgeId,
        severity:         Severity,
        created_at:       f64,
        duration_secs:    f64,
        prior_multiplier: f64,
    ) -> TrafficResult<&Accident> {
        if self.by_edge.contains_key(&edge) {
            return Err(TrafficError::DuplicateAccident(edge));
        }
        let id = AccidentId(self.next_id);
        self.next_id += 1;
        let accident = Accident {
            id,
            label: format!("acc_{}", id.0),
            edge,
            severity,
            created_at,
            duration_secs,
            prior_multiplier,
        };
        self.by_edge.insert(edge, id);
        Ok(self.by_id.entry(id).or_insert(accident))
    }

    /// Remove an accident by its external label.
    pub fn resolve(&mut self, label: &str) -> TrafficResult<Accident> {
        let id = self
            .by_id
            .values()
            .find(|a| a.label == label)
            .map(|a| a.id)
            .ok_or_else(|| TrafficError::UnknownAccident(label.to_string()))?;
        let accident = self
            .by_id
            .remove(&id)
            .ok_or_else(|| TrafficError::UnknownAccident(label.to_string()))?;
        self.by_edge.remove(&accident.edge);
        Ok(accident)
    }

    /// Remove and return every accident past due at `now`, ascending by id.
    pub fn expire_due(&mut self, now: f64) -> Vec<Accident> {
        let due: Vec<AccidentId> = self
            .by_id
            .values()
            .filter(|a| a.is_expired(now))
            .map(|a| a.id)
            .collect();
        due.into_iter()
            .filter_map(|id| {
                let accident = self.by_id.remove(&id)?;
                self.by_edge.remove(&accident.edge);
                Some(accident)
            })
            .collect()
    }

    #[inline]
    pub fn contains_edge(&self, edge: EdgeId) -> bool {
        self.by_edge.contains_key(&edge)
    }

    pub fn get_by_edge(&self, edge: EdgeId) -> Option<&Accident> {
        self.by_edge.get(&edge).and_then(|id| self.by_id.get(id))
    }

    /// Active accidents in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Accident> {
        self.by_id.values()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_id.clear();
        self.by_edge.clear();
        self.next_id = 0;
    }
}

/// Sample a severity uniformly (used when `create_accident` omits one).
pub fn random_severity(rng: &mut SimRng) -> Severity {
    *rng.choose(&Severity::ALL).unwrap_or(&Severity::Minor)
}

/// Sample an accident duration from the severity's range.
pub fn random_duration(severity: Severity, rng: &mut SimRng) -> f64 {
    let (lo, hi) = severity.duration_range();
    rng.gen_range(lo..hi)
}

// ── BlockedEdges ──────────────────────────────────────────────────────────────

/// Why and when an edge was blocked.
#[derive(Debug, Clone)]
pub struct Blockage {
    pub reason: String,
    /// Simulated time of insertion.
    pub since: f64,
}

/// The set of manually blocked edges.
///
/// Keeps a parallel `FxHashSet` of keys so the planner's
/// [`CostField`][uts_graph::CostField] can borrow the set without copying.
#[derive(Default)]
pub struct BlockedEdges {
    entries: FxHashMap<EdgeId, Blockage>,
    keys:    FxHashSet<EdgeId>,
}

impl BlockedEdges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block `edge`.  Re-blocking an already blocked edge refreshes the
    /// reason and timestamp.
    pub fn block(&mut self, edge: EdgeId, reason: &str, now: f64) {
        self.entries.insert(edge, Blockage { reason: reason.to_string(), since: now });
        self.keys.insert(edge);
    }

    /// Unblock `edge`.  Returns whether a blockage was present — unblocking
    /// an unblocked edge is a no-op, not an error.
    pub fn unblock(&mut self, edge: EdgeId) -> bool {
        self.keys.remove(&edge);
        self.entries.remove(&edge).is_some()
    }

    #[inline]
    pub fn contains(&self, edge: EdgeId) -> bool {
        self.keys.contains(&edge)
    }

    /// Borrow the key set for planner cost views.
    #[inline]
    pub fn as_set(&self) -> &FxHashSet<EdgeId> {
        &self.keys
    }

    /// All blockages sorted ascending by edge id (stable snapshots).
    pub fn iter_sorted(&self) -> Vec<(EdgeId, &Blockage)> {
        let mut entries: Vec<_> = self.entries.iter().map(|(e, b)| (*e, b)).collect();
        entries.sort_by_key(|(e, _)| *e);
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.keys.clear();
    }
}
