//! Progress events emitted while a session runs.
//!
//! Presentation layers subscribe to the feed to animate progress bars and
//! show transient messages; the session never waits on subscribers.

use crate::biometric::BiometricKind;
use tokio::sync::broadcast;
use vvp_types::{ConstituencyBinding, DuplicateVerdict, Stage, VerificationId, VerificationOutcome};

/// Buffered events per subscriber before the oldest are dropped.
const FEED_CAPACITY: usize = 256;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgressEvent {
    StageEntered(Stage),
    CodeSending,
    CodeSent { resend_after_secs: u64 },
    CodeChecking,
    CodeAccepted,
    CodeRejected { attempts_remaining: u32 },
    CaptureProgress { kind: BiometricKind, progress: u8 },
    CaptureProcessing { kind: BiometricKind },
    CaptureSucceeded { kind: BiometricKind },
    ScanProgress {
        partitions_scanned: u32,
        records_checked: u64,
        progress: u8,
    },
    AnalysisProgress { progress: u8 },
    ScanFinished {
        verdict: DuplicateVerdict,
        confidence_score: u8,
    },
    Relocated { binding: ConstituencyBinding },
    ResultIssued {
        verification_id: VerificationId,
        outcome: VerificationOutcome,
    },
    SessionReset,
}

/// Fan-out channel for [`ProgressEvent`]s.
#[derive(Clone, Debug)]
pub struct ProgressFeed {
    tx: broadcast::Sender<ProgressEvent>,
}

impl ProgressFeed {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(FEED_CAPACITY);
        Self { tx }
    }

    /// Get a receiver for every event emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.tx.subscribe()
    }

    /// Emit an event. Having no subscribers is not an error.
    pub fn emit(&self, event: ProgressEvent) {
        let _ = self.tx.send(event);
    }
}

/// Percentages from `start` to 100 in `step` increments. The last value is
/// always 100, even when `step` does not divide the span.
pub fn progress_steps(start: u8, step: u8) -> Vec<u8> {
    let mut steps: Vec<u8> = (start.min(100)..=100).step_by(step.max(1) as usize).collect();
    if steps.last() != Some(&100) {
        steps.push(100);
    }
    steps
}

impl Default for ProgressFeed {
    fn default() -> Self {
        Self::new()
    }
}
