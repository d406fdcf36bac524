//! Biometric check simulator: face, then fingerprint.
//!
//! Each capture runs `Idle → Scanning(0..=100) → Processing → Success`. The
//! biometric dimension passes only when both captures have succeeded.

use crate::error::WorkflowError;
use crate::progress::{progress_steps, ProgressEvent, ProgressFeed};
use crate::spans;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::Instrument;
use vvp_types::WorkflowParams;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BiometricKind {
    Face,
    Fingerprint,
}

impl BiometricKind {
    /// Capture that must succeed before this one may start.
    pub fn prerequisite(&self) -> Option<BiometricKind> {
        match self {
            Self::Face => None,
            Self::Fingerprint => Some(Self::Face),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Face => "face",
            Self::Fingerprint => "fingerprint",
        }
    }
}

impl fmt::Display for BiometricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CaptureState {
    #[default]
    Idle,
    Scanning { progress: u8 },
    Processing,
    Success,
    /// Never produced by the simulator; kept for real capture back-ends.
    Failed,
}

impl CaptureState {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Sub-state of the biometric stage.
#[derive(Clone, Debug, Default)]
pub struct BiometricCheck {
    face: CaptureState,
    fingerprint: CaptureState,
}

impl BiometricCheck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, kind: BiometricKind) -> CaptureState {
        match kind {
            BiometricKind::Face => self.face,
            BiometricKind::Fingerprint => self.fingerprint,
        }
    }

    /// The conjunction gate: both captures succeeded.
    pub fn gate_satisfied(&self) -> bool {
        self.face.is_success() && self.fingerprint.is_success()
    }

    /// The next capture still to run, in order.
    pub fn next_pending(&self) -> Option<BiometricKind> {
        [BiometricKind::Face, BiometricKind::Fingerprint]
            .into_iter()
            .find(|k| !self.state(*k).is_success())
    }

    fn set(&mut self, kind: BiometricKind, state: CaptureState) {
        match kind {
            BiometricKind::Face => self.face = state,
            BiometricKind::Fingerprint => self.fingerprint = state,
        }
    }

    /// Check ordering and mark the capture as started. An abandoned scan
    /// restarts from zero.
    pub(crate) fn begin(&mut self, kind: BiometricKind) -> Result<(), WorkflowError> {
        if self.state(kind).is_success() {
            return Err(WorkflowError::AlreadyCaptured(kind));
        }
        if let Some(requires) = kind.prerequisite() {
            if !self.state(requires).is_success() {
                return Err(WorkflowError::CaptureOutOfOrder { kind, requires });
            }
        }
        self.set(kind, CaptureState::Scanning { progress: 0 });
        Ok(())
    }

    /// Run the timed capture, updating this check's state at every step.
    ///
    /// Must be preceded by [`begin`](Self::begin).
    pub(crate) async fn capture(
        &mut self,
        kind: BiometricKind,
        params: &WorkflowParams,
        feed: &ProgressFeed,
    ) -> CaptureState {
        async {
            for progress in progress_steps(0, params.capture_increment) {
                tokio::time::sleep(Duration::from_millis(params.capture_step_ms)).await;
                self.set(kind, CaptureState::Scanning { progress });
                feed.emit(ProgressEvent::CaptureProgress { kind, progress });
            }

            self.set(kind, CaptureState::Processing);
            feed.emit(ProgressEvent::CaptureProcessing { kind });
            tokio::time::sleep(Duration::from_millis(params.capture_processing_ms)).await;

            self.set(kind, CaptureState::Success);
            feed.emit(ProgressEvent::CaptureSucceeded { kind });
            tracing::debug!("capture succeeded");
            CaptureState::Success
        }
        .instrument(spans::capture_span(kind))
        .await
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_waits_for_face() {
        let mut check = BiometricCheck::new();
        assert!(matches!(
            check.begin(BiometricKind::Fingerprint),
            Err(WorkflowError::CaptureOutOfOrder {
                kind: BiometricKind::Fingerprint,
                requires: BiometricKind::Face
            })
        ));
        assert_eq!(check.state(BiometricKind::Fingerprint), CaptureState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn gate_needs_both_captures() {
        let params = WorkflowParams::default();
        let feed = ProgressFeed::new();
        let mut check = BiometricCheck::new();

        check.begin(BiometricKind::Face).unwrap();
        check.capture(BiometricKind::Face, &params, &feed).await;
        assert!(check.state(BiometricKind::Face).is_success());
        assert!(!check.gate_satisfied());
        assert_eq!(check.next_pending(), Some(BiometricKind::Fingerprint));

        check.begin(BiometricKind::Fingerprint).unwrap();
        check.capture(BiometricKind::Fingerprint, &params, &feed).await;
        assert!(check.gate_satisfied());
        assert_eq!(check.next_pending(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn progress_climbs_in_fixed_increments() {
        let params = WorkflowParams::default();
        let feed = ProgressFeed::new();
        let mut rx = feed.subscribe();
        let mut check = BiometricCheck::new();

        check.begin(BiometricKind::Face).unwrap();
        check.capture(BiometricKind::Face, &params, &feed).await;

        let mut seen = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let ProgressEvent::CaptureProgress { progress, .. } = event {
                seen.push(progress);
            }
        }
        assert_eq!(seen, (0..=100).step_by(10).collect::<Vec<u8>>());
    }

    #[tokio::test(start_paused = true)]
    async fn uneven_increment_still_reaches_full_before_processing() {
        let params = WorkflowParams {
            capture_increment: 30,
            ..WorkflowParams::fast()
        };
        let feed = ProgressFeed::new();
        let mut rx = feed.subscribe();
        let mut check = BiometricCheck::new();

        check.begin(BiometricKind::Face).unwrap();
        let state = check.capture(BiometricKind::Face, &params, &feed).await;
        assert_eq!(state, CaptureState::Success);

        let mut seen = Vec::new();
        let mut processing_after_full = false;
        while let Ok(event) = rx.try_recv() {
            match event {
                ProgressEvent::CaptureProgress { progress, .. } => seen.push(progress),
                ProgressEvent::CaptureProcessing { .. } => {
                    processing_after_full = seen.last() == Some(&100)
                }
                _ => {}
            }
        }
        assert_eq!(seen, vec![0, 30, 60, 90, 100]);
        assert!(processing_after_full);
    }

    #[tokio::test(start_paused = true)]
    async fn succeeded_capture_cannot_rerun() {
        let params = WorkflowParams::fast();
        let feed = ProgressFeed::new();
        let mut check = BiometricCheck::new();
        check.begin(BiometricKind::Face).unwrap();
        check.capture(BiometricKind::Face, &params, &feed).await;
        assert!(matches!(
            check.begin(BiometricKind::Face),
            Err(WorkflowError::AlreadyCaptured(BiometricKind::Face))
        ));
    }
}
