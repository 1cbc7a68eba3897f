//! Deterministic simulation-level RNG wrapper.
//!
//! # Determinism strategy
//!
//! The simulator owns exactly one `SimRng`, seeded at construction from
//! `SimConfig::seed`.  Every stochastic decision — multiplier band samples,
//! random spawn endpoints, severity draws, accident durations — pulls from
//! this single stream, and all iteration orders feeding it are deterministic
//! (ascending ids).  A fixed seed plus a fixed `dt` therefore reproduces a
//! run exactly.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Seeded simulation-level RNG.
///
/// The type is deliberately `!Sync`: the engine is single-threaded and the
/// RNG must never be shared across threads.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Expose the inner `SmallRng` for use with `rand`/`rand_distr`
    /// distribution types (`Normal::sample(rng.inner())`, etc.)
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Sample a uniformly distributed value of any `Standard`-distributed type.
    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Choose a random element from a slice.
    /// Returns `None` if the slice is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }
}
