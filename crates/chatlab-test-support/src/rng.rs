//! Test RNG — deterministic `DeterministicRng` implementations for tests.

use chatlab_core::rng::DeterministicRng;

/// An RNG that always picks index 0, i.e. the first declared condition.
#[derive(Debug)]
pub struct MockRng;

impl DeterministicRng for MockRng {
    fn next_index(&mut self, _len: usize) -> usize {
        0
    }
}

/// An RNG that returns indices from a predetermined sequence. Panics if the
/// sequence is exhausted. Used where a test needs a specific arm assignment.
#[derive(Debug)]
pub struct SequenceRng {
    values: Vec<usize>,
    index: usize,
}

impl SequenceRng {
    /// Create a new `SequenceRng` with the given values.
    #[must_use]
    pub fn new(values: Vec<usize>) -> Self {
        Self { values, index: 0 }
    }
}

impl DeterministicRng for SequenceRng {
    fn next_index(&mut self, _len: usize) -> usize {
        let val = self.values[self.index];
        self.index += 1;
        val
    }
}
