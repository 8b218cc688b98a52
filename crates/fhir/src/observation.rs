//! FHIR-aligned Observation wire model, covering lab results and vital signs.

use crate::common::{
    annotations, date_time, require_id, AnnotationWire, CodeableConceptWire, CodingWire,
    ReferenceWire, OBSERVATION_CATEGORY_SYSTEM,
};
use crate::FhirResult;
use chrono::{DateTime, Utc};
use health_md_types::NonEmptyText;
use serde::Serialize;

/// Observation category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObservationCategory {
    Laboratory,
    VitalSigns,
}

impl ObservationCategory {
    fn to_wire(self) -> CodingWire {
        let (code, display) = match self {
            ObservationCategory::Laboratory => ("laboratory", "Laboratory"),
            ObservationCategory::VitalSigns => ("vital-signs", "Vital Signs"),
        };
        CodingWire {
            display: Some(display.to_string()),
            ..CodingWire::new(OBSERVATION_CATEGORY_SYSTEM, code)
        }
    }
}

/// Domain-level carrier for a single observation.
///
/// Values are kept as text; Health.md values mix numbers, units and trend markers freely.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObservationData {
    pub id: String,
    pub category: ObservationCategory,
    pub code: NonEmptyText,
    pub value: NonEmptyText,
    pub effective: Option<DateTime<Utc>>,
    pub reference_range: Option<String>,
    pub notes: Vec<String>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub(crate) struct ObservationWire {
    #[serde(rename = "resourceType")]
    pub resource_type: &'static str,
    pub id: String,
    pub status: &'static str,
    pub category: Vec<CodeableConceptWire>,
    pub code: CodeableConceptWire,
    pub subject: ReferenceWire,
    #[serde(rename = "effectiveDateTime", skip_serializing_if = "Option::is_none")]
    pub effective: Option<String>,
    #[serde(rename = "valueString")]
    pub value: String,
    #[serde(rename = "referenceRange", skip_serializing_if = "Vec::is_empty")]
    pub reference_range: Vec<ReferenceRangeWire>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub note: Vec<AnnotationWire>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub(crate) struct ReferenceRangeWire {
    pub text: String,
}

pub(crate) fn to_wire(data: &ObservationData, patient_id: &str) -> FhirResult<ObservationWire> {
    Ok(ObservationWire {
        resource_type: "Observation",
        id: require_id("Observation", &data.id)?.to_string(),
        status: "final",
        category: vec![CodeableConceptWire {
            coding: vec![data.category.to_wire()],
            text: None,
        }],
        code: CodeableConceptWire::text(data.code.as_str()),
        subject: ReferenceWire::patient(patient_id),
        effective: data.effective.map(date_time),
        value: data.value.as_str().to_string(),
        reference_range: data
            .reference_range
            .iter()
            .map(|text| ReferenceRangeWire { text: text.clone() })
            .collect(),
        note: annotations(&data.notes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_lab_observation() {
        let data = ObservationData {
            id: "lab-1".into(),
            category: ObservationCategory::Laboratory,
            code: NonEmptyText::new("Hemoglobin A1c").expect("code"),
            value: NonEmptyText::new("7.2% ↓").expect("value"),
            effective: None,
            reference_range: Some("<5.7%".into()),
            notes: vec!["Units: %".into()],
        };
        let json = serde_json::to_value(to_wire(&data, "patient").expect("wire")).expect("json");

        assert_eq!(json["status"], "final");
        assert_eq!(json["category"][0]["coding"][0]["code"], "laboratory");
        assert_eq!(json["code"]["text"], "Hemoglobin A1c");
        assert_eq!(json["valueString"], "7.2% ↓");
        assert_eq!(json["referenceRange"][0]["text"], "<5.7%");
        assert_eq!(json["note"][0]["text"], "Units: %");
        assert!(json.get("effectiveDateTime").is_none());
    }

    #[test]
    fn vital_signs_category_code() {
        let coding = ObservationCategory::VitalSigns.to_wire();
        assert_eq!(coding.code, "vital-signs");
        assert_eq!(coding.display.as_deref(), Some("Vital Signs"));
    }
}
