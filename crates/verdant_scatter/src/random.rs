//! # Random Sources
//!
//! The planner needs two kinds of draw: a uniform real in `[0, 1)` and a
//! uniform integer in `[0, n)`. Anything that can produce those can drive it.
//!
//! ## Determinism Guarantee
//!
//! `SeededRandom` is ChaCha8 seeded from a `PlacementSeed`. Given the same
//! seed it yields **exactly** the same stream on any platform.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seed for a placement pass.
///
/// Sub-seeds for independent passes (one per region, say) come from
/// [`PlacementSeed::derive`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlacementSeed(u64);

impl PlacementSeed {
    /// Creates a seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Derives an independent sub-seed for `purpose`.
    #[inline]
    #[must_use]
    pub const fn derive(self, purpose: u64) -> Self {
        let mut hash = self.0;
        hash ^= purpose;
        hash = hash.wrapping_mul(0x517c_c1b7_2722_0a95);
        hash ^= hash >> 32;
        Self(hash)
    }
}

impl From<u64> for PlacementSeed {
    fn from(seed: u64) -> Self {
        Self(seed)
    }
}

/// Uniform draws consumed by the planner.
pub trait RandomSource {
    /// Uniform real in `[0, 1)`.
    fn next_f32(&mut self) -> f32;

    /// Uniform integer in `[0, n)`. Returns 0 when `n` is 0.
    fn next_below(&mut self, n: usize) -> usize;
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    #[inline]
    fn next_f32(&mut self) -> f32 {
        (**self).next_f32()
    }

    #[inline]
    fn next_below(&mut self, n: usize) -> usize {
        (**self).next_below(n)
    }
}

/// Seeded ChaCha8 stream.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    /// Creates a stream from a seed.
    #[must_use]
    pub fn new(seed: impl Into<PlacementSeed>) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed.into().value()),
        }
    }
}

impl RandomSource for SeededRandom {
    #[inline]
    fn next_f32(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    #[inline]
    fn next_below(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        self.rng.gen_range(0..n)
    }
}
