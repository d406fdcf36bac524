//! Manual-review hand-off for flagged registrations.

use serde::{Deserialize, Serialize};
use vvp_types::{ConstituencyBinding, DuplicateCheckResult, Timestamp, VerificationResult};

/// What a reviewer sees for a flagged session. Only the last four digits of
/// the national id leave the session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlaggedCase {
    pub case_id: String,
    pub voter_name: String,
    pub national_id_last4: Option<String>,
    pub binding: ConstituencyBinding,
    pub confidence_score: u8,
    pub reason: String,
    pub flagged_at: Timestamp,
}

impl FlaggedCase {
    /// Build the case from the pending-review result and the scan that flagged it.
    pub fn open(result: &VerificationResult, scan: &DuplicateCheckResult) -> Self {
        let record = &result.snapshot;
        let id = result.verification_id.as_str();
        let case_id = format!(
            "CASE-{}",
            id.strip_prefix(vvp_types::VerificationId::PREFIX).unwrap_or(id)
        );
        Self {
            case_id,
            voter_name: record.full_name.clone(),
            national_id_last4: record.national_id.as_ref().map(|n| n.last4().to_string()),
            binding: record.binding.clone(),
            confidence_score: scan.confidence_score,
            reason: scan
                .reason
                .clone()
                .unwrap_or_else(|| "flagged by duplicate scan".to_string()),
            flagged_at: result.issued_at,
        }
    }
}
