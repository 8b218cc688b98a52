//! FHIR-aligned Condition wire model.

use crate::common::{
    date_time, require_id, CodeableConceptWire, CodingWire, ReferenceWire, ICD10_SYSTEM,
};
use crate::FhirResult;
use chrono::{DateTime, Utc};
use health_md_types::NonEmptyText;
use serde::Serialize;

/// Domain-level carrier for a diagnosed condition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConditionData {
    pub id: String,
    pub name: NonEmptyText,
    pub icd10: Option<String>,
    pub onset: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub(crate) struct ConditionWire {
    #[serde(rename = "resourceType")]
    pub resource_type: &'static str,
    pub id: String,
    pub code: CodeableConceptWire,
    pub subject: ReferenceWire,
    #[serde(rename = "onsetDateTime", skip_serializing_if = "Option::is_none")]
    pub onset: Option<String>,
}

pub(crate) fn to_wire(data: &ConditionData, patient_id: &str) -> FhirResult<ConditionWire> {
    Ok(ConditionWire {
        resource_type: "Condition",
        id: require_id("Condition", &data.id)?.to_string(),
        code: CodeableConceptWire {
            coding: data
                .icd10
                .iter()
                .map(|code| CodingWire::new(ICD10_SYSTEM, code))
                .collect(),
            text: Some(data.name.as_str().to_string()),
        },
        subject: ReferenceWire::patient(patient_id),
        onset: data.onset.map(date_time),
    })
}
