//! Validation errors raised before any workflow state is touched.

use thiserror::Error;

/// A malformed or missing input.
///
/// Always recoverable: the triggering operation is refused and the session
/// keeps its previous state.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("full name is required")]
    MissingName,

    #[error("date of birth is required")]
    MissingDateOfBirth,

    #[error("national id must be exactly 12 digits, got {0:?}")]
    InvalidNationalId(String),

    #[error("phone number must be exactly 10 digits, got {0:?}")]
    InvalidPhone(String),

    #[error("verification code must be exactly 6 digits")]
    InvalidCode,

    #[error("region is required")]
    MissingRegion,

    #[error("sub-region is required")]
    MissingSubRegion,

    #[error("unknown region {0:?}")]
    UnknownRegion(String),

    #[error("sub-region {sub_region:?} does not belong to region {region:?}")]
    UnknownSubRegion { region: String, sub_region: String },

    #[error("privacy policy and terms must be accepted")]
    ConsentRequired,
}
