//! Pre-built [`tracing::Span`] constructors for the timed workflow phases.
//!
//! Consistent span names and fields make it easy to follow one session's
//! checks through the logs.

use crate::biometric::BiometricKind;
use tracing::{info_span, Span};
use vvp_types::Stage;

/// Span covering a code delivery.
pub fn code_delivery_span() -> Span {
    info_span!("code_delivery")
}

/// Span covering the check of one submitted code.
pub fn code_check_span(attempt: u32) -> Span {
    info_span!("code_check", attempt = attempt)
}

/// Span covering one biometric capture.
pub fn capture_span(kind: BiometricKind) -> Span {
    info_span!("capture", kind = %kind)
}

/// Span covering a full duplicate scan.
pub fn duplicate_scan_span(region: &str, partitions: u32) -> Span {
    info_span!("duplicate_scan", region = %region, partitions = partitions)
}

/// Span covering a stage transition and any result it issues.
pub fn transition_span(from: Stage, to: Stage) -> Span {
    info_span!("transition", from = %from, to = %to)
}
