//! Region → sub-region lookup used to validate constituency bindings.

use crate::error::ValidationError;
use crate::record::ConstituencyBinding;
use std::collections::BTreeMap;

/// The set of valid region → sub-region mappings.
///
/// The geographic reference data itself lives outside the workflow; the
/// workflow only asks whether a binding is valid.
pub trait RegionDirectory: Send + Sync {
    fn has_region(&self, region: &str) -> bool;

    fn sub_regions(&self, region: &str) -> Vec<String>;

    /// Check that both parts are present and that `sub_region` belongs to `region`.
    fn validate(&self, binding: &ConstituencyBinding) -> Result<(), ValidationError> {
        if binding.region.trim().is_empty() {
            return Err(ValidationError::MissingRegion);
        }
        if binding.sub_region.trim().is_empty() {
            return Err(ValidationError::MissingSubRegion);
        }
        if !self.has_region(&binding.region) {
            return Err(ValidationError::UnknownRegion(binding.region.clone()));
        }
        if !self
            .sub_regions(&binding.region)
            .iter()
            .any(|s| *s == binding.sub_region)
        {
            return Err(ValidationError::UnknownSubRegion {
                region: binding.region.clone(),
                sub_region: binding.sub_region.clone(),
            });
        }
        Ok(())
    }
}

/// In-memory directory, usually loaded from the `[regions]` table of the
/// session config.
#[derive(Clone, Debug, Default)]
pub struct StaticRegionDirectory {
    regions: BTreeMap<String, Vec<String>>,
}

impl StaticRegionDirectory {
    pub fn new(regions: BTreeMap<String, Vec<String>>) -> Self {
        Self { regions }
    }

    pub fn from_pairs<R, S, I>(pairs: I) -> Self
    where
        R: Into<String>,
        S: Into<String>,
        I: IntoIterator<Item = (R, Vec<S>)>,
    {
        let regions = pairs
            .into_iter()
            .map(|(r, subs)| (r.into(), subs.into_iter().map(Into::into).collect()))
            .collect();
        Self { regions }
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl RegionDirectory for StaticRegionDirectory {
    fn has_region(&self, region: &str) -> bool {
        self.regions.contains_key(region)
    }

    fn sub_regions(&self, region: &str) -> Vec<String> {
        self.regions.get(region).cloned().unwrap_or_default()
    }
}
