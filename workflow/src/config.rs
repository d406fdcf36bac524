//! Session configuration with TOML file support.

use crate::error::WorkflowError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use vvp_types::{StaticRegionDirectory, WorkflowParams};
use vvp_utils::LogFormat;

/// Configuration for a verification session.
///
/// Can be loaded from a TOML file via [`SessionConfig::from_toml_file`] or
/// assembled in code, which is what the tests do.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Timings, probabilities, and fixed policy values.
    #[serde(default)]
    pub params: WorkflowParams,

    /// Valid region → sub-region mappings.
    #[serde(default = "default_regions")]
    pub regions: BTreeMap<String, Vec<String>>,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}

fn default_regions() -> BTreeMap<String, Vec<String>> {
    [
        ("central", vec!["central-1", "central-2", "central-3"]),
        ("coastal", vec!["coastal-1", "coastal-2"]),
        ("highlands", vec!["highlands-1", "highlands-2"]),
    ]
    .into_iter()
    .map(|(r, subs)| (r.to_string(), subs.into_iter().map(String::from).collect()))
    .collect()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl SessionConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, WorkflowError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| WorkflowError::Config(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, WorkflowError> {
        let config: Self = toml::from_str(s).map_err(|e| WorkflowError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, WorkflowError> {
        toml::to_string_pretty(self).map_err(|e| WorkflowError::Config(e.to_string()))
    }

    /// Reject values the simulators cannot work with.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        let p = &self.params;
        for (name, value) in [
            ("otp_accept_probability", p.otp_accept_probability),
            ("clear_probability", p.clear_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(WorkflowError::Config(format!(
                    "{name} must be between 0 and 1, got {value}"
                )));
            }
        }
        if p.otp_accept_sentinel.len() != 6 || !p.otp_accept_sentinel.bytes().all(|b| b.is_ascii_digit()) {
            return Err(WorkflowError::Config(
                "otp_accept_sentinel must be 6 digits".to_string(),
            ));
        }
        if p.scan_records_max <= p.scan_records_min {
            return Err(WorkflowError::Config(
                "scan_records_max must exceed scan_records_min".to_string(),
            ));
        }
        if p.scan_phase_ceiling > 100 || p.clear_confidence > 100 || p.flagged_confidence > 100 {
            return Err(WorkflowError::Config(
                "percentages must not exceed 100".to_string(),
            ));
        }
        if p.capture_increment == 0 || p.analysis_increment == 0 || p.scan_partitions == 0 {
            return Err(WorkflowError::Config(
                "increments and partition count must be non-zero".to_string(),
            ));
        }
        if 100 % p.capture_increment != 0 {
            return Err(WorkflowError::Config(format!(
                "capture_increment must divide 100, got {}",
                p.capture_increment
            )));
        }
        if (100 - p.scan_phase_ceiling) % p.analysis_increment != 0 {
            return Err(WorkflowError::Config(format!(
                "analysis_increment must divide {}, the span from scan_phase_ceiling to 100",
                100 - p.scan_phase_ceiling
            )));
        }
        if p.max_otp_attempts == 0 {
            return Err(WorkflowError::Config(
                "max_otp_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn region_directory(&self) -> StaticRegionDirectory {
        StaticRegionDirectory::new(self.regions.clone())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            params: WorkflowParams::default(),
            regions: default_regions(),
        }
    }
}
