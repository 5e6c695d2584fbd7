//! Random number generator abstraction for determinism.
//!
//! Condition assignment is the only consumer. In production this wraps a
//! seeded `StdRng`; tests inject a scripted sequence.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Abstraction over random number generation.
pub trait DeterministicRng: Send + Sync {
    /// Returns an index uniformly distributed over `0..len`.
    ///
    /// Callers must pass `len > 0`.
    fn next_index(&mut self, len: usize) -> usize;
}

/// Production RNG seeded from the operating system.
#[derive(Debug)]
pub struct SystemRng(StdRng);

impl SystemRng {
    /// Creates a new RNG seeded from OS entropy.
    #[must_use]
    pub fn new() -> Self {
        Self(StdRng::from_os_rng())
    }

    /// Creates an RNG with a fixed seed, for reproducible assignment runs.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for SystemRng {
    fn default() -> Self {
        Self::new()
    }
}

impl DeterministicRng for SystemRng {
    fn next_index(&mut self, len: usize) -> usize {
        self.0.random_range(0..len)
    }
}
