//! FHIR-aligned Encounter wire model for clinical timeline entries.

use crate::common::{
    date_time, require_id, CodeableConceptWire, CodingWire, ReferenceWire, ACT_CODE_SYSTEM,
};
use crate::FhirResult;
use chrono::{DateTime, Utc};
use health_md_types::NonEmptyText;
use serde::Serialize;

/// Encounter class code for ambulatory visits.
const AMBULATORY: &str = "AMB";

/// Domain-level carrier for a past encounter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncounterData {
    pub id: String,
    pub title: NonEmptyText,
    pub visit_type: Option<String>,
    pub provider_type: Option<String>,
    pub reason: Option<String>,
    pub start: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub(crate) struct EncounterWire {
    #[serde(rename = "resourceType")]
    pub resource_type: &'static str,
    pub id: String,
    pub status: &'static str,
    pub class: CodingWire,
    #[serde(rename = "type")]
    pub encounter_type: Vec<CodeableConceptWire>,
    #[serde(rename = "serviceType", skip_serializing_if = "Option::is_none")]
    pub service_type: Option<CodeableConceptWire>,
    pub subject: ReferenceWire,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<PeriodWire>,
    #[serde(rename = "reasonCode", skip_serializing_if = "Vec::is_empty")]
    pub reason_code: Vec<CodeableConceptWire>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub(crate) struct PeriodWire {
    pub start: String,
}

pub(crate) fn to_wire(data: &EncounterData, patient_id: &str) -> FhirResult<EncounterWire> {
    let mut encounter_type = vec![CodeableConceptWire::text(data.title.as_str())];
    if let Some(visit_type) = &data.visit_type {
        encounter_type.push(CodeableConceptWire::text(visit_type));
    }

    Ok(EncounterWire {
        resource_type: "Encounter",
        id: require_id("Encounter", &data.id)?.to_string(),
        status: "finished",
        class: CodingWire::new(ACT_CODE_SYSTEM, AMBULATORY),
        encounter_type,
        service_type: data.provider_type.as_deref().map(CodeableConceptWire::text),
        subject: ReferenceWire::patient(patient_id),
        period: data.start.map(|start| PeriodWire {
            start: date_time(start),
        }),
        reason_code: data
            .reason
            .as_deref()
            .map(CodeableConceptWire::text)
            .into_iter()
            .collect(),
    })
}
