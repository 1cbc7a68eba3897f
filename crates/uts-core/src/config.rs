//! Simulation configuration.
//!
//! All tunables live in one `SimConfig` value owned by the simulator.
//! Defaults match the reference parameter set: nominal speeds 60/40/20
//! units/s for car/bicycle/pedestrian, capacity usage 1.0/0.5/0.2, base edge
//! capacity 3.0 usage-units per length unit, and a 0.2 s integration cap.

use crate::error::{CoreError, CoreResult};
use crate::mode::VehicleMode;
use crate::rng::SimRng;

// ── SpeedProfile ──────────────────────────────────────────────────────────────

/// Per-mode nominal-speed distribution.
///
/// On spawn each agent samples its personal nominal speed from
/// `Normal(mean, std_dev)` clamped to `[min, max]`.  That speed drives the
/// car-following target whenever the road ahead is clear.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeedProfile {
    /// Mean nominal speed in length units per second.
    pub mean: f64,
    /// Standard deviation of the normal distribution.
    pub std_dev: f64,
    /// Lower clamp applied to the sample.
    pub min: f64,
    /// Upper clamp applied to the sample.
    pub max: f64,
}

impl SpeedProfile {
    /// Profile centred on `mean` with a 10 % spread, clamped to ±50 %.
    pub fn centred(mean: f64) -> Self {
        Self {
            mean,
            std_dev: mean * 0.1,
            min: mean * 0.5,
            max: mean * 1.5,
        }
    }

    /// Draw one nominal speed.
    pub fn sample(&self, rng: &mut SimRng) -> f64 {
        use rand_distr::{Distribution, Normal};
        // std_dev > 0 is checked by SimConfig::validate; fall back to the
        // mean if the distribution is degenerate anyway.
        match Normal::new(self.mean, self.std_dev) {
            Ok(normal) => normal.sample(rng.inner()).clamp(self.min, self.max),
            Err(_) => self.mean,
        }
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
///
/// Typically constructed via `SimConfig { seed, ..Default::default() }` and
/// validated once by the engine builder.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Master RNG seed.  The same seed with a fixed `dt` always produces
    /// identical results.
    pub seed: u64,

    /// Upper bound on the per-tick integration step, in seconds.
    pub max_dt: f64,

    /// Speed change limit per second (units/s²), applied symmetrically when
    /// accelerating toward or braking away from the target speed.
    pub acceleration: f64,

    /// Capacity-usage units per length unit of edge; an edge's capacity is
    /// `base_edge_capacity × distance`.
    pub base_edge_capacity: f64,

    /// Multiplier applied to edges with no congestion information.
    pub default_multiplier: f64,
    /// Narrow-band multiplier floor (band sampling may go lower only for
    /// free-flow, whose range starts at this value).
    pub min_multiplier: f64,
    /// Narrow-band multiplier ceiling.  Band sampling extends past this up
    /// to 6.0 for congested edges.
    pub max_multiplier: f64,

    /// Cost-increase ratio that would trigger opportunistic rerouting.
    /// Reserved; the current decider reroutes on blockage and congestion
    /// probability only.
    pub reroute_threshold: f64,
    /// How many upcoming path edges the reroute decider inspects.
    pub reroute_lookahead: usize,
    /// Congestion probability above which an upcoming edge forces a reroute.
    pub reroute_probability_threshold: f64,

    /// Gap (length units) under which a follower fully stops.
    pub min_following_distance: f64,
    /// Gap (length units) above which the road counts as clear.
    pub clear_following_distance: f64,

    /// Per-mode nominal speed distributions, indexed by `VehicleMode::index()`.
    pub speed_profiles: [SpeedProfile; 3],
    /// Per-mode capacity usage, indexed by `VehicleMode::index()`.
    pub capacity_usage: [f64; 3],
    /// Default spawn-type distribution (car, bicycle, pedestrian).
    pub spawn_distribution: [f64; 3],

    /// Probability per tick of injecting a random accident.  Essentially off
    /// by default.
    pub random_accident_probability: f64,

    /// Fraction of highest-out-degree nodes treated as hotspots on map load.
    pub hotspot_fraction: f64,
    /// Simulated seconds over which hotspot congestion ramps to full effect.
    pub hotspot_rampup_secs: f64,

    /// Ring-buffer capacity of per-edge multiplier history.
    pub history_capacity: usize,
    /// Density at or above which an edge counts as a bottleneck.
    pub bottleneck_density: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            max_dt: 0.2,
            acceleration: 0.2,
            base_edge_capacity: 3.0,
            default_multiplier: 1.0,
            min_multiplier: 0.5,
            max_multiplier: 3.0,
            reroute_threshold: 0.2,
            reroute_lookahead: 3,
            reroute_probability_threshold: 0.5,
            min_following_distance: 30.0,
            clear_following_distance: 60.0,
            speed_profiles: [
                SpeedProfile::centred(60.0),
                SpeedProfile::centred(40.0),
                SpeedProfile::centred(20.0),
            ],
            capacity_usage: [1.0, 0.5, 0.2],
            spawn_distribution: [0.6, 0.25, 0.15],
            random_accident_probability: 0.0,
            hotspot_fraction: 0.2,
            hotspot_rampup_secs: 60.0,
            history_capacity: 100,
            bottleneck_density: 0.7,
        }
    }
}

impl SimConfig {
    /// Nominal-speed distribution for `mode`.
    #[inline]
    pub fn speed_profile(&self, mode: VehicleMode) -> &SpeedProfile {
        &self.speed_profiles[mode.index()]
    }

    /// Road-space contribution of one agent of `mode`.
    #[inline]
    pub fn capacity_usage(&self, mode: VehicleMode) -> f64 {
        self.capacity_usage[mode.index()]
    }

    /// Check internal consistency.  Called once by the engine builder so
    /// that runtime code never has to re-validate.
    pub fn validate(&self) -> CoreResult<()> {
        fn positive(name: &str, v: f64) -> CoreResult<()> {
            if v > 0.0 && v.is_finite() {
                Ok(())
            } else {
                Err(CoreError::Config(format!("{name} must be positive, got {v}")))
            }
        }
        fn probability(name: &str, v: f64) -> CoreResult<()> {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(CoreError::Config(format!("{name} must be in [0, 1], got {v}")))
            }
        }

        positive("max_dt", self.max_dt)?;
        positive("acceleration", self.acceleration)?;
        positive("base_edge_capacity", self.base_edge_capacity)?;
        positive("default_multiplier", self.default_multiplier)?;
        positive("min_multiplier", self.min_multiplier)?;
        positive("max_multiplier", self.max_multiplier)?;
        if self.min_multiplier > self.max_multiplier {
            return Err(CoreError::Config(format!(
                "min_multiplier {} exceeds max_multiplier {}",
                self.min_multiplier, self.max_multiplier
            )));
        }
        positive("min_following_distance", self.min_following_distance)?;
        positive("clear_following_distance", self.clear_following_distance)?;
        if self.min_following_distance > self.clear_following_distance {
            return Err(CoreError::Config(format!(
                "min_following_distance {} exceeds clear_following_distance {}",
                self.min_following_distance, self.clear_following_distance
            )));
        }
        for mode in VehicleMode::ALL {
            let p = self.speed_profile(mode);
            positive(&format!("{mode} speed mean"), p.mean)?;
            positive(&format!("{mode} speed std_dev"), p.std_dev)?;
            positive(&format!("{mode} capacity usage"), self.capacity_usage(mode))?;
        }
        probability("random_accident_probability", self.random_accident_probability)?;
        probability("reroute_probability_threshold", self.reroute_probability_threshold)?;
        probability("hotspot_fraction", self.hotspot_fraction)?;
        positive("hotspot_rampup_secs", self.hotspot_rampup_secs)?;
        positive("bottleneck_density", self.bottleneck_density)?;
        if self.history_capacity == 0 {
            return Err(CoreError::Config("history_capacity must be nonzero".into()));
        }
        let dist_sum: f64 = self.spawn_distribution.iter().sum();
        if (dist_sum - 1.0).abs() > 1e-6 || self.spawn_distribution.iter().any(|&p| p < 0.0) {
            return Err(CoreError::Config(format!(
                "spawn_distribution must be non-negative and sum to 1, got {:?}",
                self.spawn_distribution
            )));
        }
        Ok(())
    }
}
