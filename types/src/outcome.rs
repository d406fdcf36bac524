//! Results produced by the duplicate scan and by completion.

use crate::record::VoterRecord;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The binary outcome of the duplicate scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DuplicateVerdict {
    Clear,
    Flagged,
}

/// Immutable output of one duplicate-scan run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateCheckResult {
    pub verdict: DuplicateVerdict,
    /// Confidence in the verdict, 0..=100.
    pub confidence_score: u8,
    /// Why the record was flagged. `None` for a clear verdict.
    pub reason: Option<String>,
    pub matched_record_count: u32,
    /// Total records compared across all partitions.
    pub records_checked: u64,
    pub partitions_scanned: u32,
}

impl DuplicateCheckResult {
    pub fn is_clear(&self) -> bool {
        matches!(self.verdict, DuplicateVerdict::Clear)
    }
}

/// Whether the session ended in a registration or a review hand-off.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationOutcome {
    Success,
    PendingReview,
}

/// Identifier printed on the applicant's confirmation, e.g. `VVP-T3K9ZQ-8F2KD1`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerificationId(String);

impl VerificationId {
    pub const PREFIX: &'static str = "VVP-";

    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VerificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Issued exactly once per session, never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub verification_id: VerificationId,
    pub issued_at: Timestamp,
    pub outcome: VerificationOutcome,
    /// The record as it stood when the result was issued.
    pub snapshot: VoterRecord,
}
