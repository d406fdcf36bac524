//! Verification status tracking with forward-only transitions and ordering gates.

use crate::error::WorkflowError;
use std::collections::BTreeSet;
use vvp_types::{CheckStatus, Dimension, DuplicateStatus, Stage, VerificationStatus};

/// The dimension a stage is responsible for, if any.
pub fn dimension_for(stage: Stage) -> Option<Dimension> {
    match stage {
        Stage::Identity => Some(Dimension::Identity),
        Stage::Biometric => Some(Dimension::Biometric),
        Stage::Duplicate => Some(Dimension::Duplicate),
        Stage::Intake | Stage::Mobility | Stage::Complete => None,
    }
}

/// Owns the [`VerificationStatus`] and refuses illegal moves.
///
/// A dimension counts as *satisfied* when it is Verified (Clear for the
/// duplicate dimension) or has been waived by a skip override. Biometric may
/// only become Verified once identity is satisfied, and duplicate may only
/// become Clear once biometric is satisfied.
#[derive(Clone, Debug, Default)]
pub struct StatusTracker {
    status: VerificationStatus,
    waivers: BTreeSet<Dimension>,
}

impl StatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> VerificationStatus {
        self.status
    }

    pub fn waivers(&self) -> impl Iterator<Item = Dimension> + '_ {
        self.waivers.iter().copied()
    }

    pub fn is_waived(&self, dimension: Dimension) -> bool {
        self.waivers.contains(&dimension)
    }

    pub fn is_satisfied(&self, dimension: Dimension) -> bool {
        if self.is_waived(dimension) {
            return true;
        }
        match dimension {
            Dimension::Identity => self.status.identity.is_verified(),
            Dimension::Biometric => self.status.biometric.is_verified(),
            Dimension::Duplicate => self.status.duplicate.is_clear(),
        }
    }

    pub fn set_identity(&mut self, next: CheckStatus) -> Result<(), WorkflowError> {
        let current = self.status.identity;
        if !current.can_transition_to(next) {
            return Err(WorkflowError::InvalidStatus {
                dimension: Dimension::Identity,
                from: current.as_str(),
                to: next.as_str(),
            });
        }
        self.status.identity = next;
        Ok(())
    }

    pub fn set_biometric(&mut self, next: CheckStatus) -> Result<(), WorkflowError> {
        let current = self.status.biometric;
        if !current.can_transition_to(next) {
            return Err(WorkflowError::InvalidStatus {
                dimension: Dimension::Biometric,
                from: current.as_str(),
                to: next.as_str(),
            });
        }
        if next.is_verified() && !self.is_satisfied(Dimension::Identity) {
            return Err(WorkflowError::GateNotSatisfied {
                dimension: Dimension::Biometric,
                blocked_by: Dimension::Identity,
            });
        }
        self.status.biometric = next;
        Ok(())
    }

    pub fn set_duplicate(&mut self, next: DuplicateStatus) -> Result<(), WorkflowError> {
        let current = self.status.duplicate;
        if !current.can_transition_to(next) {
            return Err(WorkflowError::InvalidStatus {
                dimension: Dimension::Duplicate,
                from: current.as_str(),
                to: next.as_str(),
            });
        }
        if next.is_clear() && !self.is_satisfied(Dimension::Biometric) {
            return Err(WorkflowError::GateNotSatisfied {
                dimension: Dimension::Duplicate,
                blocked_by: Dimension::Biometric,
            });
        }
        self.status.duplicate = next;
        Ok(())
    }

    /// Record that `dimension` was bypassed by an override.
    pub fn waive(&mut self, dimension: Dimension) {
        self.waivers.insert(dimension);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_retry_path() {
        let mut t = StatusTracker::new();
        t.set_identity(CheckStatus::Verifying).unwrap();
        t.set_identity(CheckStatus::Failed).unwrap();
        t.set_identity(CheckStatus::Verifying).unwrap();
        t.set_identity(CheckStatus::Verified).unwrap();
        assert!(t.is_satisfied(Dimension::Identity));
        assert!(t.set_identity(CheckStatus::Verifying).is_err());
    }

    #[test]
    fn biometric_cannot_pass_before_identity() {
        let mut t = StatusTracker::new();
        t.set_biometric(CheckStatus::Verifying).unwrap();
        let err = t.set_biometric(CheckStatus::Verified).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::GateNotSatisfied {
                dimension: Dimension::Biometric,
                blocked_by: Dimension::Identity
            }
        ));
        assert_eq!(t.status().biometric, CheckStatus::Verifying);
    }

    #[test]
    fn waiver_satisfies_the_gate() {
        let mut t = StatusTracker::new();
        t.waive(Dimension::Identity);
        t.set_biometric(CheckStatus::Verifying).unwrap();
        t.set_biometric(CheckStatus::Verified).unwrap();
        assert_eq!(t.status().identity, CheckStatus::Pending);
        assert!(t.is_satisfied(Dimension::Identity));
    }

    #[test]
    fn duplicate_clear_requires_biometric() {
        let mut t = StatusTracker::new();
        t.set_duplicate(DuplicateStatus::Scanning).unwrap();
        assert!(t.set_duplicate(DuplicateStatus::Clear).is_err());
        // Flagged is a verdict, not a pass, so it is not gated.
        t.set_duplicate(DuplicateStatus::Flagged).unwrap();
        assert!(!t.is_satisfied(Dimension::Duplicate));
    }

    #[test]
    fn reset_clears_status_and_waivers() {
        let mut t = StatusTracker::new();
        t.waive(Dimension::Biometric);
        t.set_identity(CheckStatus::Verifying).unwrap();
        t.reset();
        assert!(t.status().is_pending());
        assert_eq!(t.waivers().count(), 0);
    }

    #[test]
    fn stage_dimension_mapping() {
        assert_eq!(dimension_for(Stage::Identity), Some(Dimension::Identity));
        assert_eq!(dimension_for(Stage::Duplicate), Some(Dimension::Duplicate));
        assert_eq!(dimension_for(Stage::Mobility), None);
    }
}
