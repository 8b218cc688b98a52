//! FHIR-aligned MedicationStatement wire model.

use crate::common::{
    annotations, date_time, require_id, AnnotationWire, CodeableConceptWire, CodingWire,
    ReferenceWire, ICD10_SYSTEM,
};
use crate::FhirResult;
use chrono::{DateTime, Utc};
use health_md_types::NonEmptyText;
use serde::Serialize;

/// Domain-level carrier for a medication the patient is currently taking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MedicationStatementData {
    pub id: String,
    pub medication: NonEmptyText,
    /// Free-text dosage instruction (dose and frequency).
    pub dosage: Option<String>,
    pub route: Option<String>,
    /// Reason for taking the medication, as written.
    pub reason: Option<String>,
    /// ICD-10 codes associated with the reason.
    pub reason_codes: Vec<String>,
    pub effective: Option<DateTime<Utc>>,
    pub prescriber: Option<String>,
    pub notes: Vec<String>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub(crate) struct MedicationStatementWire {
    #[serde(rename = "resourceType")]
    pub resource_type: &'static str,
    pub id: String,
    pub status: &'static str,
    #[serde(rename = "medicationCodeableConcept")]
    pub medication: CodeableConceptWire,
    pub subject: ReferenceWire,
    #[serde(rename = "effectiveDateTime", skip_serializing_if = "Option::is_none")]
    pub effective: Option<String>,
    #[serde(rename = "informationSource", skip_serializing_if = "Option::is_none")]
    pub information_source: Option<ReferenceWire>,
    #[serde(rename = "reasonCode", skip_serializing_if = "Vec::is_empty")]
    pub reason_code: Vec<CodeableConceptWire>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub note: Vec<AnnotationWire>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dosage: Vec<DosageWire>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub(crate) struct DosageWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<CodeableConceptWire>,
}

pub(crate) fn to_wire(
    data: &MedicationStatementData,
    patient_id: &str,
) -> FhirResult<MedicationStatementWire> {
    let id = require_id("MedicationStatement", &data.id)?;

    let reason_code = if data.reason.is_none() && data.reason_codes.is_empty() {
        Vec::new()
    } else {
        vec![CodeableConceptWire {
            coding: data
                .reason_codes
                .iter()
                .map(|code| CodingWire::new(ICD10_SYSTEM, code))
                .collect(),
            text: data.reason.clone(),
        }]
    };

    let dosage = if data.dosage.is_none() && data.route.is_none() {
        Vec::new()
    } else {
        vec![DosageWire {
            text: data.dosage.clone(),
            route: data.route.as_deref().map(CodeableConceptWire::text),
        }]
    };

    Ok(MedicationStatementWire {
        resource_type: "MedicationStatement",
        id: id.to_string(),
        status: "active",
        medication: CodeableConceptWire::text(data.medication.as_str()),
        subject: ReferenceWire::patient(patient_id),
        effective: data.effective.map(date_time),
        information_source: data.prescriber.as_deref().map(ReferenceWire::display),
        reason_code,
        note: annotations(&data.notes),
        dosage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn metformin() -> MedicationStatementData {
        MedicationStatementData {
            id: "medication-1".into(),
            medication: NonEmptyText::new("Metformin").expect("name"),
            dosage: Some("500mg twice daily".into()),
            route: Some("oral".into()),
            reason: Some("Type 2 diabetes".into()),
            reason_codes: vec!["E11.9".into()],
            effective: Some(Utc.with_ymd_and_hms(2023, 3, 1, 0, 0, 0).unwrap()),
            prescriber: Some("Dr. Lee".into()),
            notes: vec![],
        }
    }

    #[test]
    fn renders_reason_with_icd_coding() {
        let json = serde_json::to_value(to_wire(&metformin(), "patient").expect("wire"))
            .expect("json");

        assert_eq!(json["resourceType"], "MedicationStatement");
        assert_eq!(json["status"], "active");
        assert_eq!(json["subject"]["reference"], "Patient/patient");
        assert_eq!(json["effectiveDateTime"], "2023-03-01T00:00:00Z");
        assert_eq!(json["informationSource"]["display"], "Dr. Lee");
        assert_eq!(json["reasonCode"][0]["text"], "Type 2 diabetes");
        assert_eq!(json["reasonCode"][0]["coding"][0]["code"], "E11.9");
        assert_eq!(json["dosage"][0]["route"]["text"], "oral");
        assert!(json.get("note").is_none());
    }

    #[test]
    fn bare_medication_omits_optional_parts() {
        let data = MedicationStatementData {
            dosage: None,
            route: None,
            reason: None,
            reason_codes: vec![],
            effective: None,
            prescriber: None,
            ..metformin()
        };
        let json = serde_json::to_value(to_wire(&data, "patient").expect("wire")).expect("json");

        assert!(json.get("dosage").is_none());
        assert!(json.get("reasonCode").is_none());
        assert!(json.get("effectiveDateTime").is_none());
    }
}
