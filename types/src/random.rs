//! Pluggable randomness for the simulated outcomes.
//!
//! Every probabilistic decision (OTP acceptance, duplicate verdict, per-partition
//! record counts, verification id suffixes) draws from a [`RandomSource`], so
//! tests can script the outcomes exactly.

use rand::RngCore;

/// A source of uniformly distributed 64-bit values.
pub trait RandomSource: Send + Sync {
    fn next_u64(&self) -> u64;

    /// A uniform draw in `[0, 1)` built from the top 53 bits of one `next_u64`.
    fn next_unit(&self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// `true` with the given probability (clamped to `[0, 1]`).
    fn chance(&self, probability: f64) -> bool {
        self.next_unit() < probability.clamp(0.0, 1.0)
    }

    /// A value in `[low, high)`. Returns `low` when the range is empty.
    fn range(&self, low: u64, high: u64) -> u64 {
        if high <= low {
            return low;
        }
        low + self.next_u64() % (high - low)
    }
}

/// Thread-local CSPRNG from the `rand` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn next_u64(&self) -> u64 {
        rand::thread_rng().next_u64()
    }
}
