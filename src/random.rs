//! Shared buffer of uniform randoms.
//!
//! Every shape generator draws its scatter from one [`RandomField`] instead of
//! resampling, so regenerating the same shape within a session gives the same
//! layout. Each engine instance owns its own field; nothing is process-global.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Depth of the field per position component.
///
/// Generators read offsets `i * 3 + c` with `c` up to 12, so the depth must be
/// at least 13.
pub const RANDOM_FIELD_DEPTH: usize = 13;

/// A fixed-size, seeded-once buffer of uniform randoms in `[0, 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomField {
    values: Vec<f32>,
    count: usize,
    seed: u64,
}

impl RandomField {
    /// Create a field for `count` particles with a fresh seed.
    pub fn new(count: usize) -> Self {
        Self::with_seed(count, rand::random())
    }

    /// Create a field for `count` particles from a fixed seed.
    pub fn with_seed(count: usize, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let len = (count * 3 * RANDOM_FIELD_DEPTH).max(RANDOM_FIELD_DEPTH);
        let values = (0..len).map(|_| rng.gen::<f32>()).collect();
        Self {
            values,
            count,
            seed,
        }
    }

    /// Random value for particle `index` at the small constant `offset`.
    ///
    /// Reads slot `index * 3 + offset`, wrapping at the end of the field so a
    /// field built for fewer particles never panics.
    #[inline]
    pub fn sample(&self, index: usize, offset: usize) -> f32 {
        self.values[(index * 3 + offset) % self.values.len()]
    }

    /// Same as [`sample`](Self::sample), mapped to `[-0.5, 0.5)`.
    #[inline]
    pub fn centered(&self, index: usize, offset: usize) -> f32 {
        self.sample(index, offset) - 0.5
    }

    /// Number of particles this field was sized for.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Seed the field was generated from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Raw values.
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}
