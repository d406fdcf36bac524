//! Fundamental types for the voter verification workflow.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! the voter record, stages, status enums, check outcomes, region lookups,
//! workflow parameters, and the clock and randomness seams the simulators draw on.

pub mod error;
pub mod outcome;
pub mod params;
pub mod random;
pub mod record;
pub mod region;
pub mod stage;
pub mod status;
pub mod time;

pub use error::ValidationError;
pub use outcome::{
    DuplicateCheckResult, DuplicateVerdict, VerificationId, VerificationOutcome,
    VerificationResult,
};
pub use params::WorkflowParams;
pub use random::{OsRandom, RandomSource};
pub use record::{ConstituencyBinding, NationalId, PhoneNumber, VoterRecord};
pub use region::{RegionDirectory, StaticRegionDirectory};
pub use stage::Stage;
pub use status::{CheckStatus, Dimension, DuplicateStatus, VerificationStatus};
pub use time::{Clock, SystemClock, Timestamp};
