//! The voter record under construction during a session.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A national identity number: exactly 12 ASCII digits.
///
/// Intake forms display the number in groups of four, so whitespace between
/// groups is accepted and stripped on parse.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NationalId(String);

impl NationalId {
    pub const LEN: usize = 12;

    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        if digits.len() != Self::LEN || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidNationalId(raw.to_string()));
        }
        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last four digits, the only part shown to reviewers.
    pub fn last4(&self) -> &str {
        &self.0[Self::LEN - 4..]
    }
}

impl fmt::Display for NationalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", &self.0[..4], &self.0[4..8], &self.0[8..])
    }
}

impl TryFrom<String> for NationalId {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<NationalId> for String {
    fn from(id: NationalId) -> Self {
        id.0
    }
}

/// A mobile phone number: exactly 10 ASCII digits.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub const LEN: usize = 10;

    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.len() != Self::LEN || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidPhone(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}

/// The constituency a voter is registered in.
///
/// Region and sub-region always travel together: a relocation replaces the
/// whole binding in a single assignment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstituencyBinding {
    pub region: String,
    pub sub_region: String,
}

impl ConstituencyBinding {
    pub fn new(region: impl Into<String>, sub_region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            sub_region: sub_region.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.region.is_empty() && self.sub_region.is_empty()
    }
}

impl fmt::Display for ConstituencyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.region, self.sub_region)
    }
}

/// Everything the applicant enters at intake.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterRecord {
    pub full_name: String,
    /// ISO-8601 date as entered (`YYYY-MM-DD`).
    pub date_of_birth: String,
    pub national_id: Option<NationalId>,
    /// Existing voter card number, if the applicant already has one.
    pub voter_id: Option<String>,
    pub binding: ConstituencyBinding,
    pub email: String,
    pub phone: Option<PhoneNumber>,
    pub consent_given: bool,
}

impl VoterRecord {
    /// Whether this record is still in its initial, empty state.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn national_id_strips_group_spacing() {
        let id = NationalId::parse("1234 5678 9012").unwrap();
        assert_eq!(id.as_str(), "123456789012");
        assert_eq!(id.last4(), "9012");
        assert_eq!(id.to_string(), "1234 5678 9012");
    }

    #[test]
    fn national_id_rejects_wrong_length_and_letters() {
        assert!(NationalId::parse("12345678901").is_err());
        assert!(NationalId::parse("1234567890123").is_err());
        assert!(NationalId::parse("12345678901a").is_err());
        assert!(NationalId::parse("").is_err());
    }

    #[test]
    fn phone_requires_ten_digits() {
        assert!(PhoneNumber::parse("9876543210").is_ok());
        assert!(PhoneNumber::parse("987654321").is_err());
        assert!(PhoneNumber::parse("98765432101").is_err());
        assert!(PhoneNumber::parse("98765-4321").is_err());
    }

    #[test]
    fn invalid_id_does_not_deserialize() {
        let result: Result<NationalId, _> = serde_json::from_str("\"12\"");
        assert!(result.is_err());
        let ok: NationalId = serde_json::from_str("\"123456789012\"").unwrap();
        assert_eq!(ok.as_str(), "123456789012");
    }

    #[test]
    fn default_record_is_empty() {
        let mut record = VoterRecord::default();
        assert!(record.is_empty());
        record.consent_given = true;
        assert!(!record.is_empty());
    }
}
