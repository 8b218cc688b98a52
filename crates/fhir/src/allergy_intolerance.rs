//! FHIR-aligned AllergyIntolerance wire model.

use crate::common::{require_id, CodeableConceptWire, ReferenceWire};
use crate::FhirResult;
use health_md_types::NonEmptyText;
use serde::Serialize;

/// Allergy category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllergyCategory {
    Medication,
    Environment,
    Food,
}

impl AllergyCategory {
    fn to_wire(self) -> &'static str {
        match self {
            AllergyCategory::Medication => "medication",
            AllergyCategory::Environment => "environment",
            AllergyCategory::Food => "food",
        }
    }
}

/// Domain-level carrier for one allergy or intolerance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllergyIntoleranceData {
    pub id: String,
    pub category: AllergyCategory,
    pub substance: NonEmptyText,
    pub reaction: Option<String>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub(crate) struct AllergyIntoleranceWire {
    #[serde(rename = "resourceType")]
    pub resource_type: &'static str,
    pub id: String,
    pub category: Vec<&'static str>,
    pub code: CodeableConceptWire,
    pub patient: ReferenceWire,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reaction: Vec<ReactionWire>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub(crate) struct ReactionWire {
    pub manifestation: Vec<CodeableConceptWire>,
}

pub(crate) fn to_wire(
    data: &AllergyIntoleranceData,
    patient_id: &str,
) -> FhirResult<AllergyIntoleranceWire> {
    Ok(AllergyIntoleranceWire {
        resource_type: "AllergyIntolerance",
        id: require_id("AllergyIntolerance", &data.id)?.to_string(),
        category: vec![data.category.to_wire()],
        code: CodeableConceptWire::text(data.substance.as_str()),
        patient: ReferenceWire::patient(patient_id),
        reaction: data
            .reaction
            .iter()
            .map(|text| ReactionWire {
                manifestation: vec![CodeableConceptWire::text(text)],
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_reaction_as_manifestation() {
        let data = AllergyIntoleranceData {
            id: "allergy-1".into(),
            category: AllergyCategory::Medication,
            substance: NonEmptyText::new("Penicillin").expect("substance"),
            reaction: Some("Hives".into()),
        };
        let json = serde_json::to_value(to_wire(&data, "patient").expect("wire")).expect("json");

        assert_eq!(json["category"][0], "medication");
        assert_eq!(json["code"]["text"], "Penicillin");
        assert_eq!(json["patient"]["reference"], "Patient/patient");
        assert_eq!(json["reaction"][0]["manifestation"][0]["text"], "Hives");
    }

    #[test]
    fn missing_reaction_is_omitted() {
        let data = AllergyIntoleranceData {
            id: "allergy-2".into(),
            category: AllergyCategory::Food,
            substance: NonEmptyText::new("Lactose").expect("substance"),
            reaction: None,
        };
        let json = serde_json::to_value(to_wire(&data, "patient").expect("wire")).expect("json");
        assert!(json.get("reaction").is_none());
    }
}
