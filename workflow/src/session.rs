//! The session aggregate: one exclusively-owned holder for everything a
//! verification run produces.
//!
//! Every operation takes `&mut Session`, so only one check can run at a time.
//! State is committed synchronously between awaits: dropping an in-flight
//! operation leaves the last committed values, and the in-flight markers
//! (`Sending`, `Verifying`, `Scanning`) can be restarted by repeating the call.

use crate::biometric::{BiometricCheck, BiometricKind, CaptureState};
use crate::completion;
use crate::config::SessionConfig;
use crate::duplicate;
use crate::error::WorkflowError;
use crate::identity::{self, IdentityCheck, IdentityOutcome};
use crate::mobility::MobilityDecision;
use crate::progress::{ProgressEvent, ProgressFeed};
use crate::record::{IntakeForm, RecordStore};
use crate::review::FlaggedCase;
use crate::sequencer::{StageOverride, StageSequencer};
use crate::spans;
use crate::status::{dimension_for, StatusTracker};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use vvp_types::{
    CheckStatus, Clock, ConstituencyBinding, Dimension, DuplicateCheckResult, DuplicateStatus,
    DuplicateVerdict, OsRandom, RandomSource, RegionDirectory, Stage, SystemClock,
    VerificationOutcome, VerificationResult, VerificationStatus, VoterRecord, WorkflowParams,
};

/// What presentation layers observe after every committed change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionView {
    pub stage: Stage,
    pub status: VerificationStatus,
    pub binding: ConstituencyBinding,
    pub duplicate: Option<DuplicateCheckResult>,
    /// Set when a flagged scan has handed the session to manual review.
    pub flagged: Option<FlaggedCase>,
    pub result: Option<VerificationResult>,
}

impl Default for SessionView {
    fn default() -> Self {
        Self {
            stage: Stage::Intake,
            status: VerificationStatus::default(),
            binding: ConstituencyBinding::default(),
            duplicate: None,
            flagged: None,
            result: None,
        }
    }
}

pub struct Session {
    params: WorkflowParams,
    regions: Arc<dyn RegionDirectory>,
    clock: Arc<dyn Clock>,
    random: Arc<dyn RandomSource>,

    records: RecordStore,
    status: StatusTracker,
    sequencer: StageSequencer,
    identity: IdentityCheck,
    biometric: BiometricCheck,
    duplicate: Option<DuplicateCheckResult>,
    flagged: Option<FlaggedCase>,
    result: Option<VerificationResult>,

    views: watch::Sender<SessionView>,
    progress: ProgressFeed,
}

impl Session {
    /// Create a session backed by the system clock and OS randomness.
    pub fn new(params: WorkflowParams, regions: Arc<dyn RegionDirectory>) -> Self {
        let (views, _) = watch::channel(SessionView::default());
        Self {
            params,
            regions,
            clock: Arc::new(SystemClock),
            random: Arc::new(OsRandom),
            records: RecordStore::new(),
            status: StatusTracker::new(),
            sequencer: StageSequencer::new(),
            identity: IdentityCheck::new(),
            biometric: BiometricCheck::new(),
            duplicate: None,
            flagged: None,
            result: None,
            views,
            progress: ProgressFeed::new(),
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.params.clone(), Arc::new(config.region_directory()))
    }

    /// Replace the clock (tests use `NullClock`).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the randomness source (tests use `NullRandom`).
    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    // ── Read points ────────────────────────────────────────────────────

    pub fn params(&self) -> &WorkflowParams {
        &self.params
    }

    pub fn stage(&self) -> Stage {
        self.sequencer.current()
    }

    pub fn status(&self) -> VerificationStatus {
        self.status.status()
    }

    pub fn record(&self) -> &VoterRecord {
        self.records.record()
    }

    pub fn duplicate_result(&self) -> Option<&DuplicateCheckResult> {
        self.duplicate.as_ref()
    }

    pub fn verification_result(&self) -> Option<&VerificationResult> {
        self.result.as_ref()
    }

    pub fn flagged_case(&self) -> Option<&FlaggedCase> {
        self.flagged.as_ref()
    }

    pub fn identity(&self) -> &IdentityCheck {
        &self.identity
    }

    pub fn biometric(&self) -> &BiometricCheck {
        &self.biometric
    }

    /// Stages visited since the last reset, in order.
    pub fn stage_history(&self) -> &[Stage] {
        self.sequencer.history()
    }

    pub fn overrides(&self) -> &[StageOverride] {
        self.sequencer.overrides()
    }

    pub fn waivers(&self) -> Vec<Dimension> {
        self.status.waivers().collect()
    }

    /// Seconds until another code may be requested.
    pub fn resend_available_in(&self) -> u64 {
        self.identity
            .resend_available_in(self.clock.now(), self.params.resend_cooldown_secs)
    }

    pub fn snapshot(&self) -> SessionView {
        SessionView {
            stage: self.stage(),
            status: self.status(),
            binding: self.record().binding.clone(),
            duplicate: self.duplicate.clone(),
            flagged: self.flagged.clone(),
            result: self.result.clone(),
        }
    }

    /// Receive a fresh [`SessionView`] after every committed change.
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.views.subscribe()
    }

    /// Receive progress events from the timed phases.
    pub fn progress(&self) -> broadcast::Receiver<ProgressEvent> {
        self.progress.subscribe()
    }

    // ── Intake ─────────────────────────────────────────────────────────

    /// Validate the intake form and move on to identity.
    pub fn submit_intake(&mut self, form: &IntakeForm) -> Result<(), WorkflowError> {
        self.require_stage("submit_intake", Stage::Intake)?;
        self.records.accept(form, self.regions.as_ref())?;
        tracing::info!(
            binding = %self.records.record().binding,
            "intake accepted"
        );
        self.advance(Stage::Identity)
    }

    // ── Identity ───────────────────────────────────────────────────────

    /// Deliver a one-time code.
    pub async fn send_code(&mut self) -> Result<(), WorkflowError> {
        self.require_stage("send_code", Stage::Identity)?;
        self.identity.begin_send(self.clock.now(), &self.params)?;

        identity::simulate_delivery(&self.params, &self.progress).await;

        self.identity.complete_send(self.clock.now());
        self.progress.emit(ProgressEvent::CodeSent {
            resend_after_secs: self.params.resend_cooldown_secs,
        });
        tracing::info!(
            resend_after = %vvp_utils::format_duration(self.params.resend_cooldown_secs),
            "verification code sent"
        );
        Ok(())
    }

    /// Check a submitted code. A rejected code is an outcome, not an error.
    pub async fn submit_code(&mut self, code: &str) -> Result<IdentityOutcome, WorkflowError> {
        self.require_stage("submit_code", Stage::Identity)?;
        self.identity.begin_submit(code, &self.params)?;
        if self.status.status().identity != CheckStatus::Verifying {
            self.status.set_identity(CheckStatus::Verifying)?;
        }
        self.publish();

        let attempt = self.identity.attempts() + 1;
        let accepted = identity::simulate_verification(
            code,
            attempt,
            self.random.as_ref(),
            &self.params,
            &self.progress,
        )
        .await;

        let outcome = self.identity.commit(accepted, &self.params);
        match outcome {
            IdentityOutcome::Verified => {
                self.status.set_identity(CheckStatus::Verified)?;
                self.progress.emit(ProgressEvent::CodeAccepted);
                tracing::info!(attempt, "identity verified");
                self.advance(Stage::Biometric)?;
            }
            IdentityOutcome::Rejected { attempts_remaining } => {
                self.status.set_identity(CheckStatus::Failed)?;
                self.progress
                    .emit(ProgressEvent::CodeRejected { attempts_remaining });
                tracing::warn!(attempt, attempts_remaining, "verification code rejected");
                self.publish();
            }
        }
        Ok(outcome)
    }

    // ── Biometric ──────────────────────────────────────────────────────

    /// Run one capture. Face must succeed before fingerprint may start.
    pub async fn run_capture(&mut self, kind: BiometricKind) -> Result<CaptureState, WorkflowError> {
        self.require_stage("run_capture", Stage::Biometric)?;
        self.biometric.begin(kind)?;
        if self.status.status().biometric == CheckStatus::Pending {
            self.status.set_biometric(CheckStatus::Verifying)?;
            self.publish();
        }

        let state = self
            .biometric
            .capture(kind, &self.params, &self.progress)
            .await;
        tracing::info!(%kind, "capture complete");

        if self.biometric.gate_satisfied() {
            self.status.set_biometric(CheckStatus::Verified)?;
            tracing::info!("biometric verified");
            self.advance(Stage::Duplicate)?;
        }
        Ok(state)
    }

    /// Run every capture that has not yet succeeded, in order.
    pub async fn run_biometrics(&mut self) -> Result<(), WorkflowError> {
        while let Some(kind) = self.biometric.next_pending() {
            self.run_capture(kind).await?;
        }
        Ok(())
    }

    // ── Duplicate scan ─────────────────────────────────────────────────

    /// Scan for an existing registration.
    ///
    /// Clear: the session moves on to mobility after the display delay.
    /// Flagged: a pending-review result and a [`FlaggedCase`] are issued and
    /// the session stays at the duplicate stage.
    pub async fn run_duplicate_scan(&mut self) -> Result<DuplicateCheckResult, WorkflowError> {
        if self.flagged.is_some() {
            return Err(WorkflowError::AwaitingReview);
        }
        self.require_stage("run_duplicate_scan", Stage::Duplicate)?;
        if self.status.status().duplicate == DuplicateStatus::Clear {
            // Only reachable when the display delay was abandoned.
            self.proceed()?;
            return self
                .duplicate
                .clone()
                .ok_or(WorkflowError::StageIncomplete(Stage::Duplicate));
        }
        self.status.set_duplicate(DuplicateStatus::Scanning)?;
        self.publish();

        let result = duplicate::run_scan(
            self.records.record(),
            self.random.as_ref(),
            &self.params,
            &self.progress,
        )
        .await;

        match result.verdict {
            DuplicateVerdict::Clear => {
                self.status.set_duplicate(DuplicateStatus::Clear)?;
                self.duplicate = Some(result.clone());
                tracing::info!(
                    confidence = result.confidence_score,
                    records_checked = result.records_checked,
                    "duplicate scan clear"
                );
                self.publish();

                tokio::time::sleep(Duration::from_millis(self.params.clear_display_ms)).await;
                self.advance(Stage::Mobility)?;
            }
            DuplicateVerdict::Flagged => {
                self.status.set_duplicate(DuplicateStatus::Flagged)?;
                self.duplicate = Some(result.clone());
                let issued = self.issue_result(VerificationOutcome::PendingReview)?;
                let case = FlaggedCase::open(&issued, &result);
                tracing::warn!(
                    case_id = %case.case_id,
                    confidence = result.confidence_score,
                    "duplicate scan flagged, routed to manual review"
                );
                self.flagged = Some(case);
                self.publish();
            }
        }
        Ok(result)
    }

    // ── Mobility ───────────────────────────────────────────────────────

    /// Keep or move the constituency, then complete the session.
    ///
    /// A relocation is committed at once and shown as confirmed for
    /// `relocation_confirm_ms` before completion. If that wait is dropped the
    /// new binding stays, and repeating the decision completes the session.
    pub async fn decide_mobility(
        &mut self,
        decision: MobilityDecision,
    ) -> Result<VerificationResult, WorkflowError> {
        if self.flagged.is_some() {
            return Err(WorkflowError::AwaitingReview);
        }
        self.require_stage("decide_mobility", Stage::Mobility)?;

        if let Some(binding) = decision.resolve(self.regions.as_ref())? {
            let previous = self.records.rebind(binding.clone());
            tracing::info!(from = %previous, to = %binding, "constituency relocated");
            self.progress.emit(ProgressEvent::Relocated { binding });
            self.publish();

            tokio::time::sleep(Duration::from_millis(self.params.relocation_confirm_ms)).await;
        }

        self.advance(Stage::Complete)?;
        self.result.clone().ok_or(WorkflowError::StageIncomplete(Stage::Complete))
    }

    // ── Stage control ──────────────────────────────────────────────────

    /// Move to the next stage if the current stage's gate is already met.
    ///
    /// Mobility cannot be passed this way: it needs a decision.
    pub fn proceed(&mut self) -> Result<Stage, WorkflowError> {
        let current = self.stage();
        let gate_met = match current {
            Stage::Intake => self.records.is_accepted(),
            Stage::Identity | Stage::Biometric | Stage::Duplicate => dimension_for(current)
                .map(|d| self.status.is_satisfied(d))
                .unwrap_or(false),
            Stage::Mobility => false,
            Stage::Complete => {
                return Err(WorkflowError::InvalidTransition {
                    from: current,
                    to: current,
                })
            }
        };
        if !gate_met {
            return Err(WorkflowError::StageIncomplete(current));
        }
        let next = current
            .successor()
            .ok_or(WorkflowError::StageIncomplete(current))?;
        self.advance(next)?;
        Ok(next)
    }

    /// Explicit override: jump forward past unmet gates.
    ///
    /// Each bypassed dimension is recorded as a waiver and the jump is kept in
    /// [`overrides`](Self::overrides).
    pub fn skip_to(&mut self, target: Stage, reason: &str) -> Result<Stage, WorkflowError> {
        if self.flagged.is_some() {
            return Err(WorkflowError::AwaitingReview);
        }
        if self.result.is_some() {
            return Err(WorkflowError::ResultAlreadyIssued);
        }
        let ov = self
            .sequencer
            .skip_to(target, reason, self.clock.now())?
            .clone();
        for dimension in ov.bypassed.iter().filter_map(|s| dimension_for(*s)) {
            if !self.status.is_satisfied(dimension) {
                self.status.waive(dimension);
            }
        }
        tracing::warn!(
            from = %ov.from,
            to = %ov.to,
            reason = %ov.reason,
            "stage skipped by override"
        );
        self.progress.emit(ProgressEvent::StageEntered(target));
        self.publish();
        Ok(target)
    }

    /// Restore every entity to its initial state. Idempotent.
    pub fn reset(&mut self) {
        self.records.reset();
        self.status.reset();
        self.sequencer.reset();
        self.identity.reset();
        self.biometric.reset();
        self.duplicate = None;
        self.flagged = None;
        self.result = None;
        self.progress.emit(ProgressEvent::SessionReset);
        tracing::info!("session reset");
        self.publish();
    }

    // ── Internals ──────────────────────────────────────────────────────

    fn require_stage(&self, operation: &'static str, required: Stage) -> Result<(), WorkflowError> {
        let current = self.stage();
        if current != required {
            return Err(WorkflowError::StageMismatch {
                operation,
                required,
                current,
            });
        }
        Ok(())
    }

    fn advance(&mut self, to: Stage) -> Result<(), WorkflowError> {
        let from = self.stage();
        let _span = spans::transition_span(from, to).entered();
        self.sequencer.advance(to)?;
        tracing::info!("stage advanced");
        self.progress.emit(ProgressEvent::StageEntered(to));
        if to == Stage::Complete {
            self.issue_result(VerificationOutcome::Success)?;
        }
        self.publish();
        Ok(())
    }

    fn issue_result(
        &mut self,
        outcome: VerificationOutcome,
    ) -> Result<VerificationResult, WorkflowError> {
        if self.result.is_some() {
            return Err(WorkflowError::ResultAlreadyIssued);
        }
        let issued = completion::issue(
            self.records.record(),
            outcome,
            self.clock.as_ref(),
            self.random.as_ref(),
        );
        tracing::info!(
            verification_id = %issued.verification_id,
            ?outcome,
            "verification result issued"
        );
        self.progress.emit(ProgressEvent::ResultIssued {
            verification_id: issued.verification_id.clone(),
            outcome,
        });
        self.result = Some(issued.clone());
        Ok(issued)
    }

    fn publish(&self) {
        self.views.send_replace(self.snapshot());
    }
}
