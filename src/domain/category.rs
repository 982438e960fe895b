//! The closed set of categories the detector may report.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a detected sensitive value.
///
/// Declaration order is the enumerated order used for deduplication
/// and report sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionCategory {
    Names,
    Emails,
    Phones,
    Addresses,
    IdsSsns,
    CreditCards,
    DatesOfBirth,
    MedicalInfo,
    FinancialData,
    OtherPii,
}

impl DetectionCategory {
    pub const ALL: [DetectionCategory; 10] = [
        Self::Names,
        Self::Emails,
        Self::Phones,
        Self::Addresses,
        Self::IdsSsns,
        Self::CreditCards,
        Self::DatesOfBirth,
        Self::MedicalInfo,
        Self::FinancialData,
        Self::OtherPii,
    ];

    /// Schema key for this category.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Names => "names",
            Self::Emails => "emails",
            Self::Phones => "phones",
            Self::Addresses => "addresses",
            Self::IdsSsns => "ids_ssns",
            Self::CreditCards => "credit_cards",
            Self::DatesOfBirth => "dates_of_birth",
            Self::MedicalInfo => "medical_info",
            Self::FinancialData => "financial_data",
            Self::OtherPii => "other_pii",
        }
    }

    /// Human description placed in the detection prompt.
    pub fn description(self) -> &'static str {
        match self {
            Self::Names => "Full names of people",
            Self::Emails => "Email addresses",
            Self::Phones => "Phone numbers",
            Self::Addresses => "Physical addresses",
            Self::IdsSsns => "ID numbers (SSN, passport, license, etc.)",
            Self::CreditCards => "Credit card numbers",
            Self::DatesOfBirth => "Dates of birth",
            Self::MedicalInfo => "Medical information",
            Self::FinancialData => "Financial information (account numbers, etc.)",
            Self::OtherPii => "Any other personally identifiable information",
        }
    }

    /// Maps a response key onto the closed set.
    ///
    /// Accepts the canonical keys plus the short legacy keys (`ids`,
    /// `cards`, `dobs`, `medical`, `financial`). Anything else is `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_ascii_lowercase();
        let category = match key.as_str() {
            "names" => Self::Names,
            "emails" => Self::Emails,
            "phones" => Self::Phones,
            "addresses" => Self::Addresses,
            "ids_ssns" | "ids" => Self::IdsSsns,
            "credit_cards" | "cards" => Self::CreditCards,
            "dates_of_birth" | "dobs" => Self::DatesOfBirth,
            "medical_info" | "medical" => Self::MedicalInfo,
            "financial_data" | "financial" => Self::FinancialData,
            "other_pii" => Self::OtherPii,
            _ => return None,
        };
        Some(category)
    }
}

impl fmt::Display for DetectionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
