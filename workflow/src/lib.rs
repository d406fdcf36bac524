//! Voter verification workflow.
//!
//! A session walks one voter record through a fixed sequence of stages:
//! 1. **Intake**: applicant details and consent are validated.
//! 2. **Identity**: a one-time code is delivered and checked.
//! 3. **Biometric**: face, then fingerprint, are captured. Both must succeed.
//! 4. **Duplicate**: every regional partition is scanned for an existing
//!    registration, producing a clear or flagged verdict.
//! 5. **Mobility**: the voter may move their registration to another constituency.
//! 6. **Complete**: exactly one verification result is issued.
//!
//! All checks are simulated. Timed phases are `async` and report progress on a
//! broadcast feed; outcome draws go through a pluggable [`RandomSource`] so tests
//! can script them.
//!
//! [`RandomSource`]: vvp_types::RandomSource

pub mod biometric;
pub mod completion;
pub mod config;
pub mod duplicate;
pub mod error;
pub mod identity;
pub mod mobility;
pub mod progress;
pub mod record;
pub mod review;
pub mod sequencer;
pub mod session;
pub mod spans;
pub mod status;

pub use biometric::{BiometricCheck, BiometricKind, CaptureState};
pub use config::SessionConfig;
pub use error::WorkflowError;
pub use identity::{IdentityCheck, IdentityOutcome, OtpState};
pub use mobility::MobilityDecision;
pub use progress::{ProgressEvent, ProgressFeed};
pub use record::{IntakeForm, RecordStore};
pub use review::FlaggedCase;
pub use sequencer::{StageOverride, StageSequencer};
pub use session::{Session, SessionView};
pub use status::StatusTracker;
