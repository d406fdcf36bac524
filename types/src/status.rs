//! Per-dimension verification status values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of the identity or biometric dimension.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckStatus {
    #[default]
    Pending,
    Verifying,
    Verified,
    Failed,
}

impl CheckStatus {
    /// Whether `next` is a legal move from `self`.
    ///
    /// Moves only go forward, with one exception: `Failed -> Verifying` is a
    /// retry. `Verifying -> Verifying` restarts an abandoned attempt.
    pub fn can_transition_to(&self, next: CheckStatus) -> bool {
        use CheckStatus::*;
        matches!(
            (self, next),
            (Pending, Verifying)
                | (Verifying, Verifying)
                | (Verifying, Verified)
                | (Verifying, Failed)
                | (Failed, Verifying)
        )
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verifying => "verifying",
            Self::Verified => "verified",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of the duplicate-registration dimension.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DuplicateStatus {
    #[default]
    Pending,
    Scanning,
    Clear,
    Flagged,
}

impl DuplicateStatus {
    /// Whether `next` is a legal move from `self`. A scan is never retried
    /// once it produced a verdict.
    pub fn can_transition_to(&self, next: DuplicateStatus) -> bool {
        use DuplicateStatus::*;
        matches!(
            (self, next),
            (Pending, Scanning) | (Scanning, Scanning) | (Scanning, Clear) | (Scanning, Flagged)
        )
    }

    pub fn is_clear(&self) -> bool {
        matches!(self, Self::Clear)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Scanning => "scanning",
            Self::Clear => "clear",
            Self::Flagged => "flagged",
        }
    }
}

impl fmt::Display for DuplicateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the three verification dimensions, in required order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Identity,
    Biometric,
    Duplicate,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Biometric => "biometric",
            Self::Duplicate => "duplicate",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of all three dimensions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationStatus {
    pub identity: CheckStatus,
    pub biometric: CheckStatus,
    pub duplicate: DuplicateStatus,
}

impl VerificationStatus {
    /// Whether every dimension is still in its initial state.
    pub fn is_pending(&self) -> bool {
        *self == Self::default()
    }
}
