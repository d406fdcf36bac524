//! Voter record store: intake validation and constituency rebinding.

use serde::{Deserialize, Serialize};
use vvp_types::{
    ConstituencyBinding, NationalId, PhoneNumber, RegionDirectory, ValidationError, VoterRecord,
};

/// Raw intake form input, exactly as typed by the applicant.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct IntakeForm {
    pub full_name: String,
    pub date_of_birth: String,
    pub national_id: String,
    #[serde(default)]
    pub voter_id: Option<String>,
    pub region: String,
    pub sub_region: String,
    #[serde(default)]
    pub email: String,
    pub phone: String,
    pub consent_given: bool,
}

impl IntakeForm {
    /// Validate every field, in form order, and build the record.
    ///
    /// The first failing field is reported.
    pub fn validate(&self, regions: &dyn RegionDirectory) -> Result<VoterRecord, ValidationError> {
        let full_name = self.full_name.trim();
        if full_name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        let date_of_birth = self.date_of_birth.trim();
        if date_of_birth.is_empty() {
            return Err(ValidationError::MissingDateOfBirth);
        }
        let national_id = NationalId::parse(&self.national_id)?;
        let binding = ConstituencyBinding::new(self.region.trim(), self.sub_region.trim());
        regions.validate(&binding)?;
        let phone = PhoneNumber::parse(&self.phone)?;
        if !self.consent_given {
            return Err(ValidationError::ConsentRequired);
        }

        let voter_id = self
            .voter_id
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        Ok(VoterRecord {
            full_name: full_name.to_string(),
            date_of_birth: date_of_birth.to_string(),
            national_id: Some(national_id),
            voter_id,
            binding,
            email: self.email.trim().to_string(),
            phone: Some(phone),
            consent_given: true,
        })
    }
}

/// Holds the record under construction.
#[derive(Clone, Debug, Default)]
pub struct RecordStore {
    record: VoterRecord,
    accepted: bool,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self) -> &VoterRecord {
        &self.record
    }

    /// Whether a complete, consented record has been accepted at intake.
    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    /// Validate the form and replace the record. On error nothing changes.
    pub fn accept(
        &mut self,
        form: &IntakeForm,
        regions: &dyn RegionDirectory,
    ) -> Result<&VoterRecord, ValidationError> {
        let record = form.validate(regions)?;
        self.record = record;
        self.accepted = true;
        Ok(&self.record)
    }

    /// Replace the constituency binding in one assignment. The previous
    /// binding is not kept.
    pub fn rebind(&mut self, binding: ConstituencyBinding) -> ConstituencyBinding {
        std::mem::replace(&mut self.record.binding, binding)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
