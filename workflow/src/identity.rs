//! Identity check simulator: one-time code issuance and verification.
//!
//! `Idle → Sending → Sent → Verifying → {Verified | Failed}`
//!
//! A delivered code may be submitted up to `max_otp_attempts` times. After
//! that, or to get a fresh code, a new delivery is needed, which is only
//! allowed once the resend cooldown has elapsed.

use crate::error::WorkflowError;
use crate::progress::{ProgressEvent, ProgressFeed};
use crate::spans;
use std::time::Duration;
use tracing::Instrument;
use vvp_types::{RandomSource, Timestamp, ValidationError, WorkflowParams};

pub const CODE_LEN: usize = 6;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OtpState {
    #[default]
    Idle,
    Sending,
    Sent,
    Verifying,
    Verified,
    Failed,
}

/// Result of one code submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentityOutcome {
    Verified,
    /// The code was not accepted. A zero count means a new code is needed.
    Rejected { attempts_remaining: u32 },
}

/// Sub-state of the identity stage.
#[derive(Clone, Debug, Default)]
pub struct IdentityCheck {
    state: OtpState,
    sent_at: Option<Timestamp>,
    attempts: u32,
}

impl IdentityCheck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> OtpState {
        self.state
    }

    /// Failed submissions against the current code.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn sent_at(&self) -> Option<Timestamp> {
        self.sent_at
    }

    /// Seconds until another code may be requested; zero if allowed now.
    pub fn resend_available_in(&self, now: Timestamp, cooldown_secs: u64) -> u64 {
        match (self.state, self.sent_at) {
            (OtpState::Idle | OtpState::Sending, _) | (_, None) => 0,
            (_, Some(sent)) => sent.remaining(cooldown_secs, now),
        }
    }

    /// Check that a delivery may start and mark it in flight.
    ///
    /// An abandoned `Sending` may be restarted at any time.
    pub(crate) fn begin_send(
        &mut self,
        now: Timestamp,
        params: &WorkflowParams,
    ) -> Result<(), WorkflowError> {
        if self.state == OtpState::Verified {
            return Err(WorkflowError::AlreadyVerified);
        }
        let remaining = self.resend_available_in(now, params.resend_cooldown_secs);
        if remaining > 0 {
            return Err(WorkflowError::CooldownActive {
                remaining_secs: remaining,
            });
        }
        self.state = OtpState::Sending;
        Ok(())
    }

    /// Record a finished delivery. Starts a fresh attempt cycle.
    pub(crate) fn complete_send(&mut self, now: Timestamp) {
        self.state = OtpState::Sent;
        self.sent_at = Some(now);
        self.attempts = 0;
    }

    /// Check that `code` may be submitted and mark the check in flight.
    pub(crate) fn begin_submit(
        &mut self,
        code: &str,
        params: &WorkflowParams,
    ) -> Result<(), WorkflowError> {
        validate_code(code)?;
        match self.state {
            OtpState::Idle | OtpState::Sending => return Err(WorkflowError::CodeNotSent),
            OtpState::Verified => return Err(WorkflowError::AlreadyVerified),
            OtpState::Sent | OtpState::Verifying | OtpState::Failed => {}
        }
        if self.attempts >= params.max_otp_attempts {
            return Err(WorkflowError::AttemptsExhausted {
                max: params.max_otp_attempts,
            });
        }
        self.state = OtpState::Verifying;
        Ok(())
    }

    /// Record the outcome of an in-flight check.
    pub(crate) fn commit(&mut self, accepted: bool, params: &WorkflowParams) -> IdentityOutcome {
        if accepted {
            self.state = OtpState::Verified;
            IdentityOutcome::Verified
        } else {
            self.state = OtpState::Failed;
            self.attempts += 1;
            IdentityOutcome::Rejected {
                attempts_remaining: params.max_otp_attempts.saturating_sub(self.attempts),
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A code is exactly six ASCII digits.
pub fn validate_code(code: &str) -> Result<(), ValidationError> {
    if code.len() != CODE_LEN || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidCode);
    }
    Ok(())
}

/// Whether the simulated backend accepts `code`. The sentinel always passes
/// without consuming a random draw.
pub fn accepts(code: &str, random: &dyn RandomSource, params: &WorkflowParams) -> bool {
    code == params.otp_accept_sentinel || random.chance(params.otp_accept_probability)
}

/// Simulate code delivery latency.
pub async fn simulate_delivery(params: &WorkflowParams, feed: &ProgressFeed) {
    async {
        feed.emit(ProgressEvent::CodeSending);
        tokio::time::sleep(Duration::from_millis(params.otp_delivery_ms)).await;
        tracing::debug!("code delivered");
    }
    .instrument(spans::code_delivery_span())
    .await
}

/// Simulate the verification round trip and draw the outcome.
pub async fn simulate_verification(
    code: &str,
    attempt: u32,
    random: &dyn RandomSource,
    params: &WorkflowParams,
    feed: &ProgressFeed,
) -> bool {
    async {
        feed.emit(ProgressEvent::CodeChecking);
        tokio::time::sleep(Duration::from_millis(params.otp_verify_ms)).await;
        let accepted = accepts(code, random, params);
        tracing::debug!(accepted, "code checked");
        accepted
    }
    .instrument(spans::code_check_span(attempt))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use vvp_nullables::NullRandom;

    fn sent_check(params: &WorkflowParams) -> IdentityCheck {
        let mut check = IdentityCheck::new();
        check.begin_send(Timestamp::new(1_000), params).unwrap();
        check.complete_send(Timestamp::new(1_000));
        check
    }

    #[test]
    fn code_must_be_six_digits() {
        assert!(validate_code("000000").is_ok());
        assert!(validate_code("12345").is_err());
        assert!(validate_code("1234567").is_err());
        assert!(validate_code("12a456").is_err());
        assert!(validate_code("").is_err());
    }

    #[test]
    fn cannot_submit_before_delivery() {
        let params = WorkflowParams::default();
        let mut check = IdentityCheck::new();
        assert!(matches!(
            check.begin_submit("123456", &params),
            Err(WorkflowError::CodeNotSent)
        ));
    }

    #[test]
    fn malformed_code_leaves_state_untouched() {
        let params = WorkflowParams::default();
        let mut check = sent_check(&params);
        assert!(matches!(
            check.begin_submit("12", &params),
            Err(WorkflowError::Validation(ValidationError::InvalidCode))
        ));
        assert_eq!(check.state(), OtpState::Sent);
        assert_eq!(check.attempts(), 0);
    }

    #[test]
    fn resend_blocked_until_cooldown_elapses() {
        let params = WorkflowParams::default();
        let mut check = sent_check(&params);
        assert_eq!(check.resend_available_in(Timestamp::new(1_010), 30), 20);
        assert!(matches!(
            check.begin_send(Timestamp::new(1_010), &params),
            Err(WorkflowError::CooldownActive { remaining_secs: 20 })
        ));
        assert!(check.begin_send(Timestamp::new(1_030), &params).is_ok());
        assert_eq!(check.state(), OtpState::Sending);
    }

    #[test]
    fn attempts_cap_requires_fresh_code() {
        let params = WorkflowParams::default();
        let mut check = sent_check(&params);
        for expected_remaining in (0..params.max_otp_attempts).rev() {
            check.begin_submit("111111", &params).unwrap();
            assert_eq!(
                check.commit(false, &params),
                IdentityOutcome::Rejected {
                    attempts_remaining: expected_remaining
                }
            );
        }
        assert!(matches!(
            check.begin_submit("000000", &params),
            Err(WorkflowError::AttemptsExhausted { max: 3 })
        ));

        check.begin_send(Timestamp::new(1_030), &params).unwrap();
        check.complete_send(Timestamp::new(1_032));
        assert_eq!(check.attempts(), 0);
        assert!(check.begin_submit("000000", &params).is_ok());
    }

    #[test]
    fn verified_blocks_further_sends_and_submits() {
        let params = WorkflowParams::default();
        let mut check = sent_check(&params);
        check.begin_submit("000000", &params).unwrap();
        assert_eq!(check.commit(true, &params), IdentityOutcome::Verified);
        assert!(matches!(
            check.begin_send(Timestamp::new(9_999), &params),
            Err(WorkflowError::AlreadyVerified)
        ));
        assert!(matches!(
            check.begin_submit("000000", &params),
            Err(WorkflowError::AlreadyVerified)
        ));
    }

    #[test]
    fn sentinel_skips_the_random_draw() {
        let params = WorkflowParams::default();
        let rng = NullRandom::unfavourable();
        assert!(accepts("000000", &rng, &params));
        assert_eq!(rng.draws(), 0);
        assert!(!accepts("123456", &rng, &params));
        assert_eq!(rng.draws(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn verification_waits_the_configured_latency() {
        let params = WorkflowParams::default();
        let feed = ProgressFeed::new();
        let mut rx = feed.subscribe();
        let start = tokio::time::Instant::now();
        let accepted =
            simulate_verification("123456", 1, &NullRandom::favourable(), &params, &feed).await;
        assert!(accepted);
        assert!(start.elapsed() >= Duration::from_millis(params.otp_verify_ms));
        assert_eq!(rx.recv().await.unwrap(), ProgressEvent::CodeChecking);
    }
}
