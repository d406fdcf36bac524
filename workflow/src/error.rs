use crate::biometric::BiometricKind;
use thiserror::Error;
use vvp_types::{Dimension, Stage, ValidationError};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("cannot move from stage {from} to {to}")]
    InvalidTransition { from: Stage, to: Stage },

    #[error("cannot skip from stage {from} to {to}")]
    SkipNotAllowed { from: Stage, to: Stage },

    #[error("{operation} requires stage {required}, session is at {current}")]
    StageMismatch {
        operation: &'static str,
        required: Stage,
        current: Stage,
    },

    #[error("stage {0} has not met its completion gate")]
    StageIncomplete(Stage),

    #[error("{dimension} status cannot move from {from} to {to}")]
    InvalidStatus {
        dimension: Dimension,
        from: &'static str,
        to: &'static str,
    },

    #[error("{dimension} cannot pass before {blocked_by} has passed")]
    GateNotSatisfied {
        dimension: Dimension,
        blocked_by: Dimension,
    },

    #[error("a new code can be requested in {remaining_secs}s")]
    CooldownActive { remaining_secs: u64 },

    #[error("no verification code has been sent")]
    CodeNotSent,

    #[error("all {max} attempts used for this code, request a new one")]
    AttemptsExhausted { max: u32 },

    #[error("identity is already verified")]
    AlreadyVerified,

    #[error("{kind} capture must wait for {requires} to succeed")]
    CaptureOutOfOrder {
        kind: BiometricKind,
        requires: BiometricKind,
    },

    #[error("{0} capture already succeeded")]
    AlreadyCaptured(BiometricKind),

    #[error("session is awaiting manual review")]
    AwaitingReview,

    #[error("a verification result has already been issued")]
    ResultAlreadyIssued,

    #[error("config error: {0}")]
    Config(String),
}
