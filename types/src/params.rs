//! Workflow parameters read by the simulators.
//!
//! All durations are milliseconds unless the field name says otherwise.

use serde::{Deserialize, Serialize};

/// Tunables for a verification session.
///
/// Missing fields in a config file fall back to [`WorkflowParams::default`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowParams {
    // ── Identity (one-time code) ─────────────────────────────────────────
    /// Simulated code delivery latency.
    pub otp_delivery_ms: u64,

    /// Simulated code verification latency.
    pub otp_verify_ms: u64,

    /// Seconds after a delivery before another code may be requested.
    pub resend_cooldown_secs: u64,

    /// Probability that a non-sentinel code is accepted.
    pub otp_accept_probability: f64,

    /// A code that is always accepted.
    pub otp_accept_sentinel: String,

    /// Failed submissions allowed per delivered code.
    pub max_otp_attempts: u32,

    // ── Biometric capture ────────────────────────────────────────────────
    /// Interval between capture progress updates.
    pub capture_step_ms: u64,

    /// Progress gained per capture step (percent).
    pub capture_increment: u8,

    /// Processing delay after a capture reaches 100 %.
    pub capture_processing_ms: u64,

    // ── Duplicate scan ───────────────────────────────────────────────────
    /// Number of regional partitions scanned in sequence.
    pub scan_partitions: u32,

    /// Time spent on each partition.
    pub scan_partition_ms: u64,

    /// Lower bound (inclusive) of records checked per partition.
    pub scan_records_min: u64,

    /// Upper bound (exclusive) of records checked per partition.
    pub scan_records_max: u64,

    /// Progress reached when the last partition is scanned (percent).
    pub scan_phase_ceiling: u8,

    /// Interval between analysis progress updates.
    pub analysis_step_ms: u64,

    /// Progress gained per analysis step (percent).
    pub analysis_increment: u8,

    /// Probability of a clear verdict.
    pub clear_probability: f64,

    /// Confidence reported with a clear verdict.
    pub clear_confidence: u8,

    /// Confidence reported with a flagged verdict.
    pub flagged_confidence: u8,

    /// How long a clear verdict is shown before moving on to mobility.
    pub clear_display_ms: u64,

    // ── Mobility ─────────────────────────────────────────────────────────
    /// How long a relocation is shown as confirmed before completion.
    pub relocation_confirm_ms: u64,
}

impl WorkflowParams {
    /// The reference timings of the demonstration portal.
    pub fn reference() -> Self {
        Self {
            otp_delivery_ms: 2_000,
            otp_verify_ms: 3_000,
            resend_cooldown_secs: 30,
            otp_accept_probability: 0.8,
            otp_accept_sentinel: "000000".to_string(),
            max_otp_attempts: 3,

            capture_step_ms: 200,
            capture_increment: 10,
            capture_processing_ms: 1_500,

            scan_partitions: 28,
            scan_partition_ms: 100,
            scan_records_min: 10_000,
            scan_records_max: 60_000,
            scan_phase_ceiling: 70,
            analysis_step_ms: 200,
            analysis_increment: 5,
            clear_probability: 0.85,
            clear_confidence: 98,
            flagged_confidence: 87,
            clear_display_ms: 3_000,

            relocation_confirm_ms: 2_000,
        }
    }

    /// Same policy with every delay cut down, for quick demo runs.
    pub fn fast() -> Self {
        Self {
            otp_delivery_ms: 50,
            otp_verify_ms: 50,
            capture_step_ms: 10,
            capture_processing_ms: 50,
            scan_partition_ms: 5,
            analysis_step_ms: 10,
            clear_display_ms: 100,
            relocation_confirm_ms: 100,
            ..Self::reference()
        }
    }
}

/// Default is the reference configuration.
impl Default for WorkflowParams {
    fn default() -> Self {
        Self::reference()
    }
}
