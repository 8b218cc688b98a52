//! FHIR-aligned patient wire model.
//!
//! Health.md documents carry no names or identifiers, so the patient resource is deliberately
//! thin: administrative gender and a free-text address. Everything else stays in the source
//! document.

use crate::common::require_id;
use crate::FhirResult;
use serde::Serialize;

// ============================================================================
// Public domain-level types
// ============================================================================

/// FHIR administrative gender.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdministrativeGender {
    Male,
    Female,
    Other,
    Unknown,
}

impl AdministrativeGender {
    /// Map a free-text sex entry (`Female`, `M`, `intersex`, ...) onto the FHIR value set.
    pub fn from_text(text: &str) -> Self {
        match text.trim().to_lowercase().as_str() {
            "male" | "m" => AdministrativeGender::Male,
            "female" | "f" => AdministrativeGender::Female,
            "other" | "intersex" => AdministrativeGender::Other,
            _ => AdministrativeGender::Unknown,
        }
    }

    fn to_wire(self) -> &'static str {
        match self {
            AdministrativeGender::Male => "male",
            AdministrativeGender::Female => "female",
            AdministrativeGender::Other => "other",
            AdministrativeGender::Unknown => "unknown",
        }
    }
}

/// Domain-level carrier for the bundle's patient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientData {
    /// Local resource id, referenced by every other resource in the bundle.
    pub id: String,

    pub gender: Option<AdministrativeGender>,

    /// Free-text location, rendered as the address text.
    pub address: Option<String>,
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub(crate) struct PatientWire {
    #[serde(rename = "resourceType")]
    pub resource_type: &'static str,

    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<&'static str>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<AddressWire>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub(crate) struct AddressWire {
    pub text: String,
}

pub(crate) fn to_wire(data: &PatientData) -> FhirResult<PatientWire> {
    Ok(PatientWire {
        resource_type: "Patient",
        id: require_id("Patient", &data.id)?.to_string(),
        gender: data.gender.map(AdministrativeGender::to_wire),
        address: data
            .address
            .iter()
            .map(|text| AddressWire { text: text.clone() })
            .collect(),
    })
}
