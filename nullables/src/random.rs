//! Nullable random: scripted random draws.

use std::sync::Mutex;
use vvp_types::RandomSource;

/// A deterministic [`RandomSource`] for testing.
///
/// Returns pre-configured values in order, cycling when the script runs out.
pub struct NullRandom {
    outputs: Vec<u64>,
    index: Mutex<usize>,
}

impl NullRandom {
    /// Create with a sequence of deterministic values.
    ///
    /// # Panics
    /// Panics if `outputs` is empty.
    pub fn new(outputs: Vec<u64>) -> Self {
        assert!(!outputs.is_empty(), "NullRandom needs at least one output");
        Self {
            outputs,
            index: Mutex::new(0),
        }
    }

    /// Create with a single value that will be returned for every call.
    pub fn constant(value: u64) -> Self {
        Self::new(vec![value])
    }

    /// Every `chance` draw succeeds: codes are accepted, scans come back clear.
    pub fn favourable() -> Self {
        Self::constant(0)
    }

    /// Every `chance` draw below certainty fails: codes are rejected, scans
    /// come back flagged.
    pub fn unfavourable() -> Self {
        Self::constant(u64::MAX)
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> usize {
        *self.index.lock().unwrap()
    }
}

impl RandomSource for NullRandom {
    fn next_u64(&self) -> u64 {
        let mut idx = self.index.lock().unwrap();
        let value = self.outputs[*idx % self.outputs.len()];
        *idx += 1;
        value
    }
}
