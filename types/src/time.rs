//! Wall-clock seconds and the [`Clock`] seam.
//!
//! Only the resend cooldown and result issuance read the time. Both go
//! through a [`Clock`], which tests replace with a settable one.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

/// Whole seconds since the Unix epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    /// Current wall-clock time. Clocks set before 1970 read as [`EPOCH`](Self::EPOCH).
    pub fn now() -> Self {
        SystemTime::UNIX_EPOCH
            .elapsed()
            .map_or(Self::EPOCH, |d| Self(d.as_secs()))
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Seconds from `now` until `secs` after this instant; zero once reached.
    pub fn remaining(&self, secs: u64, now: Timestamp) -> u64 {
        self.0.saturating_add(secs).saturating_sub(now.0)
    }

    /// Whether `now` is at least `secs` after this instant.
    pub fn has_expired(&self, secs: u64, now: Timestamp) -> bool {
        self.remaining(secs, now) == 0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Reads [`Timestamp::now`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
