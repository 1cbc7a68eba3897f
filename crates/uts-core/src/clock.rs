//! Simulation time model.
//!
//! # Design
//!
//! Time advances by a variable floating-point `dt` per tick, clamped to
//! `max_dt` (default 0.2 s) to bound integration error when the driving
//! process stalls between ticks.  A monotonically increasing step counter
//! identifies ticks; elapsed simulated seconds accumulate separately because
//! `dt` varies.
//!
//! The clock itself does not read wall time — the engine measures real
//! elapsed time (or supplies a fixed `dt` for deterministic runs) and passes
//! it through [`SimClock::clamp_dt`] before [`SimClock::advance`].

use std::fmt;

/// Step counter plus accumulated simulated time.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// The number of completed ticks.
    pub step: u64,
    /// Simulated seconds elapsed since construction or the last reset.
    pub elapsed_secs: f64,
    /// Upper bound applied to every `dt`.
    pub max_dt: f64,
}

impl SimClock {
    pub fn new(max_dt: f64) -> Self {
        Self { step: 0, elapsed_secs: 0.0, max_dt }
    }

    /// Clamp a raw elapsed-time measurement into the valid `dt` range
    /// `[0, max_dt]`.  Negative and non-finite inputs clamp to 0.
    #[inline]
    pub fn clamp_dt(&self, raw: f64) -> f64 {
        if raw.is_finite() { raw.clamp(0.0, self.max_dt) } else { 0.0 }
    }

    /// Record one completed tick of `dt` simulated seconds.
    #[inline]
    pub fn advance(&mut self, dt: f64) {
        self.step += 1;
        self.elapsed_secs += dt;
    }

    /// Return to step 0 at time 0 (map switch / reset command).
    pub fn reset(&mut self) {
        self.step = 0;
        self.elapsed_secs = 0.0;
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {} (t = {:.2} s)", self.step, self.elapsed_secs)
    }
}
