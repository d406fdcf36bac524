//! Nullable infrastructure for deterministic testing.
//!
//! The workflow reaches the outside world only through the [`Clock`] and
//! [`RandomSource`] traits. This crate provides test-friendly implementations
//! that return deterministic values and can be steered programmatically.
//!
//! Usage: hand a nullable to `Session::with_clock` / `Session::with_random`
//! in tests.
//!
//! [`Clock`]: vvp_types::Clock
//! [`RandomSource`]: vvp_types::RandomSource

pub mod clock;
pub mod random;

pub use clock::NullClock;
pub use random::NullRandom;
