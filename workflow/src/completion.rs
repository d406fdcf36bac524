//! Verification result issuance.

use vvp_types::{
    Clock, RandomSource, Timestamp, VerificationId, VerificationOutcome, VerificationResult,
    VoterRecord,
};

const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of the random part of a verification id.
pub const ID_SUFFIX_LEN: usize = 6;

/// Uppercase base-36 rendering of `n`.
pub fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

/// `VVP-<issued-at in base 36>-<six random base-36 characters>`.
///
/// The time part orders ids across sessions; the random part separates
/// sessions issued within the same second.
pub fn verification_id(issued_at: Timestamp, random: &dyn RandomSource) -> VerificationId {
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| BASE36[random.range(0, 36) as usize] as char)
        .collect();
    VerificationId::new(format!(
        "{}{}-{}",
        VerificationId::PREFIX,
        to_base36(issued_at.as_secs()),
        suffix
    ))
}

/// Issue a result with a snapshot of `record` as it stands now.
pub fn issue(
    record: &VoterRecord,
    outcome: VerificationOutcome,
    clock: &dyn Clock,
    random: &dyn RandomSource,
) -> VerificationResult {
    let issued_at = clock.now();
    VerificationResult {
        verification_id: verification_id(issued_at, random),
        issued_at,
        outcome,
        snapshot: record.clone(),
    }
}
