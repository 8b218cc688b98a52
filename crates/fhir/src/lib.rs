//! FHIR wire/boundary support for Health.md records.
//!
//! This crate provides **wire models** and a **bundle renderer** for exporting a parsed
//! Health.md record as FHIR R4 JSON:
//! - Patient, MedicationStatement, Observation, Condition, AllergyIntolerance and Encounter
//! - a `collection` Bundle holding all of them
//!
//! This crate focuses on:
//! - FHIR semantic alignment for the resources above
//! - serialisation of the wire structs
//! - translation from domain carriers to wire structs
//!
//! It has no knowledge of the Health.md format itself. Callers fill the `*Data` carriers and
//! hand them to [`Bundle::render`].

pub mod allergy_intolerance;
pub mod bundle;
mod common;
pub mod condition;
pub mod encounter;
pub mod medication_statement;
pub mod observation;
pub mod patient;

// Re-export facades
pub use bundle::Bundle;

// Re-export public domain-level types
pub use allergy_intolerance::{AllergyCategory, AllergyIntoleranceData};
pub use bundle::BundleData;
pub use common::{ACT_CODE_SYSTEM, ICD10_SYSTEM, OBSERVATION_CATEGORY_SYSTEM};
pub use condition::ConditionData;
pub use encounter::EncounterData;
pub use medication_statement::MedicationStatementData;
pub use observation::{ObservationCategory, ObservationData};
pub use patient::{AdministrativeGender, PatientData};

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
