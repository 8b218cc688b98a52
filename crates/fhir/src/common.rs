//! Wire fragments shared by several resources.

use crate::{FhirError, FhirResult};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Code system for ICD-10 diagnosis codes.
pub const ICD10_SYSTEM: &str = "http://hl7.org/fhir/sid/icd-10";

/// Code system for observation categories.
pub const OBSERVATION_CATEGORY_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/observation-category";

/// Code system for encounter classes.
pub const ACT_CODE_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/v3-ActCode";

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub(crate) struct CodingWire {
    pub system: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl CodingWire {
    pub(crate) fn new(system: &str, code: &str) -> Self {
        Self {
            system: system.to_string(),
            code: code.to_string(),
            display: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub(crate) struct CodeableConceptWire {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<CodingWire>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CodeableConceptWire {
    pub(crate) fn text(text: &str) -> Self {
        Self {
            coding: Vec::new(),
            text: Some(text.to_string()),
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub(crate) struct ReferenceWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl ReferenceWire {
    pub(crate) fn patient(patient_id: &str) -> Self {
        Self {
            reference: Some(format!("Patient/{patient_id}")),
            display: None,
        }
    }

    pub(crate) fn display(display: &str) -> Self {
        Self {
            reference: None,
            display: Some(display.to_string()),
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub(crate) struct AnnotationWire {
    pub text: String,
}

pub(crate) fn annotations(notes: &[String]) -> Vec<AnnotationWire> {
    notes
        .iter()
        .map(|text| AnnotationWire { text: text.clone() })
        .collect()
}

/// FHIR `dateTime` rendering, second precision in UTC.
pub(crate) fn date_time(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Reject a blank resource id.
pub(crate) fn require_id<'a>(resource_type: &str, id: &'a str) -> FhirResult<&'a str> {
    let id = id.trim();
    if id.is_empty() {
        return Err(FhirError::InvalidInput(format!(
            "{resource_type} id cannot be empty"
        )));
    }
    Ok(id)
}
