//! Export of a parsed record to JSON and FHIR.
//!
//! Both exports are built from the record's public accessors only.

use crate::entities::{
    AllergyGroups, ClinicalEvent, Condition, Demographics, LabResult, Medication, VitalSign,
};
use crate::frontmatter::DocumentMetadata;
use crate::record::HealthRecord;
use crate::{HealthMdError, HealthMdResult};
use fhir::{
    AdministrativeGender, AllergyCategory, AllergyIntoleranceData, Bundle, BundleData,
    ConditionData, EncounterData, MedicationStatementData, ObservationCategory, ObservationData,
    PatientData,
};
use health_md_types::NonEmptyText;
use serde::Serialize;

const PATIENT_ID: &str = "patient";
const BUNDLE_ID: &str = "health-md-export";

#[derive(Serialize)]
struct RecordDump<'a> {
    metadata: &'a DocumentMetadata,
    privacy_level: String,
    reference: String,
    sections: Vec<&'a str>,
    demographics: &'a Demographics,
    medications: &'a [Medication],
    lab_results: &'a [LabResult],
    vital_signs: &'a [VitalSign],
    medical_history: &'a [Condition],
    allergies: &'a AllergyGroups,
    clinical_timeline: Vec<&'a ClinicalEvent>,
}

/// Render the whole record as pretty-printed JSON.
///
/// # Errors
///
/// Returns `HealthMdError::Serialization` if the metadata cannot be represented in JSON, for
/// example a mapping with a sequence as a key.
pub fn to_json(record: &HealthRecord) -> HealthMdResult<String> {
    let dump = RecordDump {
        metadata: record.metadata(),
        privacy_level: record.privacy_level(),
        reference: record.reference().to_rfc3339(),
        sections: record.section_names(),
        demographics: record.demographics(),
        medications: record.current_medications(),
        lab_results: record.lab_results(),
        vital_signs: record.vital_signs(),
        medical_history: record.medical_history(),
        allergies: record.allergies(),
        clinical_timeline: record.clinical_timeline(None),
    };
    serde_json::to_string_pretty(&dump).map_err(HealthMdError::Serialization)
}

fn text(value: &str) -> HealthMdResult<NonEmptyText> {
    NonEmptyText::new(value).map_err(|e| HealthMdError::InvalidInput(e.to_string()))
}

fn labelled(label: &str, value: Option<&str>) -> Option<String> {
    value.map(|v| format!("{label}: {v}"))
}

fn medication_data(index: usize, med: &Medication) -> HealthMdResult<MedicationStatementData> {
    let dosage = match (med.dosage(), med.frequency()) {
        (Some(dosage), Some(frequency)) => Some(format!("{dosage}, {frequency}")),
        (dosage, frequency) => dosage.or(frequency).map(str::to_string),
    };

    Ok(MedicationStatementData {
        id: format!("medication-{index}"),
        medication: text(med.name())?,
        dosage,
        route: med.route().map(str::to_string),
        reason: med.indication().map(str::to_string),
        reason_codes: med.icd_codes().to_vec(),
        effective: med.started(),
        prescriber: med.prescriber().map(str::to_string),
        notes: [
            labelled("Generic name", med.generic_name()),
            med.notes().map(str::to_string),
        ]
        .into_iter()
        .flatten()
        .collect(),
    })
}

fn lab_data(index: usize, lab: &LabResult) -> HealthMdResult<ObservationData> {
    Ok(ObservationData {
        id: format!("lab-{index}"),
        category: ObservationCategory::Laboratory,
        code: text(lab.name())?,
        value: text(lab.value())?,
        effective: lab.date(),
        reference_range: lab.reference_range().map(str::to_string),
        notes: [
            labelled("Units", lab.units()),
            lab.clinical_significance().map(str::to_string),
        ]
        .into_iter()
        .flatten()
        .collect(),
    })
}

fn vital_data(index: usize, vital: &VitalSign) -> HealthMdResult<ObservationData> {
    Ok(ObservationData {
        id: format!("vital-{index}"),
        category: ObservationCategory::VitalSigns,
        code: text(vital.name())?,
        value: text(vital.value())?,
        effective: vital.date(),
        reference_range: None,
        notes: [labelled("Units", vital.units()), vital.notes().map(str::to_string)]
            .into_iter()
            .flatten()
            .collect(),
    })
}

fn allergy_data(allergies: &AllergyGroups) -> HealthMdResult<Vec<AllergyIntoleranceData>> {
    let groups = [
        (AllergyCategory::Medication, allergies.drug()),
        (AllergyCategory::Environment, allergies.environmental()),
        (AllergyCategory::Food, allergies.food()),
    ];

    let mut out = Vec::new();
    for (category, entries) in groups {
        for entry in entries {
            let (substance, reaction) = match entry.split_once(": ") {
                Some((substance, reaction)) => (substance, Some(reaction.to_string())),
                None => (entry.as_str(), None),
            };
            out.push(AllergyIntoleranceData {
                id: format!("allergy-{}", out.len() + 1),
                category,
                substance: text(substance)?,
                reaction,
            });
        }
    }
    Ok(out)
}

fn encounter_data(index: usize, event: &ClinicalEvent) -> HealthMdResult<EncounterData> {
    Ok(EncounterData {
        id: format!("encounter-{index}"),
        title: text(event.title())?,
        visit_type: event.visit_type().map(str::to_string),
        provider_type: event.provider_type().map(str::to_string),
        reason: event.chief_complaint().map(str::to_string),
        start: event.date(),
    })
}

/// Assemble the FHIR bundle carrier for a record.
///
/// Resource ids are numbered per kind in document order. The bundle timestamp is the record's
/// reference instant.
pub fn to_bundle_data(record: &HealthRecord) -> HealthMdResult<BundleData> {
    let demographics = record.demographics();
    let patient = PatientData {
        id: PATIENT_ID.to_string(),
        gender: demographics.get("sex").map(AdministrativeGender::from_text),
        address: demographics.get("location").map(str::to_string),
    };

    let medications = (1..)
        .zip(record.current_medications())
        .map(|(i, med)| medication_data(i, med))
        .collect::<HealthMdResult<Vec<_>>>()?;

    let mut observations = (1..)
        .zip(record.lab_results())
        .map(|(i, lab)| lab_data(i, lab))
        .collect::<HealthMdResult<Vec<_>>>()?;
    for (i, vital) in (1..).zip(record.vital_signs()) {
        observations.push(vital_data(i, vital)?);
    }

    let conditions = (1..)
        .zip(record.medical_history())
        .map(|(i, c)| -> HealthMdResult<ConditionData> {
            Ok(ConditionData {
                id: format!("condition-{i}"),
                name: text(c.name())?,
                icd10: c.icd_code().map(str::to_string),
                onset: c.onset(),
            })
        })
        .collect::<HealthMdResult<Vec<_>>>()?;

    let encounters = (1..)
        .zip(record.clinical_timeline(None))
        .map(|(i, event)| encounter_data(i, event))
        .collect::<HealthMdResult<Vec<_>>>()?;

    Ok(BundleData {
        id: BUNDLE_ID.to_string(),
        timestamp: record.reference(),
        patient,
        medications,
        observations,
        conditions,
        allergies: allergy_data(record.allergies())?,
        encounters,
    })
}

/// Render the record as a FHIR R4 `collection` Bundle in JSON.
///
/// # Errors
///
/// Returns `HealthMdError::Fhir` if the bundle cannot be rendered.
pub fn to_fhir_json(record: &HealthRecord) -> HealthMdResult<String> {
    let data = to_bundle_data(record)?;
    Ok(Bundle::render(&data)?)
}
