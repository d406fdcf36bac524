//! Mobility transfer: optionally move the registration to another constituency.

use vvp_types::{ConstituencyBinding, RegionDirectory, ValidationError};

/// The applicant's answer on the mobility stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MobilityDecision {
    /// Keep the current constituency.
    Stay,
    /// Move to the given constituency.
    Relocate(ConstituencyBinding),
}

impl MobilityDecision {
    pub fn relocate(region: impl Into<String>, sub_region: impl Into<String>) -> Self {
        Self::Relocate(ConstituencyBinding::new(region, sub_region))
    }

    pub fn is_relocation(&self) -> bool {
        matches!(self, Self::Relocate(_))
    }

    /// Validate the decision and return the binding to apply, if any.
    pub fn resolve(
        self,
        regions: &dyn RegionDirectory,
    ) -> Result<Option<ConstituencyBinding>, ValidationError> {
        match self {
            Self::Stay => Ok(None),
            Self::Relocate(binding) => {
                regions.validate(&binding)?;
                Ok(Some(binding))
            }
        }
    }
}
