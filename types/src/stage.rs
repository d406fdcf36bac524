//! The fixed sequence of wizard stages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named position in the verification sequence.
///
/// Variants are declared in workflow order, so the derived `Ord` is the
/// sequence order: `Intake < Identity < Biometric < Duplicate < Mobility < Complete`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Applicant details and consent are being collected.
    Intake,
    /// One-time code verification of the national identity.
    Identity,
    /// Face then fingerprint capture.
    Biometric,
    /// Cross-region duplicate registration scan.
    Duplicate,
    /// Optional constituency relocation.
    Mobility,
    /// Terminal: the verification result has been issued.
    Complete,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Intake,
        Stage::Identity,
        Stage::Biometric,
        Stage::Duplicate,
        Stage::Mobility,
        Stage::Complete,
    ];

    /// The immediate successor, or `None` for the terminal stage.
    pub fn successor(&self) -> Option<Stage> {
        match self {
            Self::Intake => Some(Self::Identity),
            Self::Identity => Some(Self::Biometric),
            Self::Biometric => Some(Self::Duplicate),
            Self::Duplicate => Some(Self::Mobility),
            Self::Mobility => Some(Self::Complete),
            Self::Complete => None,
        }
    }

    /// Zero-based position in the sequence.
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Intake => "intake",
            Self::Identity => "identity",
            Self::Biometric => "biometric",
            Self::Duplicate => "duplicate",
            Self::Mobility => "mobility",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
