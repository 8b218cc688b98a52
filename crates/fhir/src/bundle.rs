//! FHIR collection Bundle assembly and rendering.
//!
//! This module provides the domain-level bundle carrier and the [`Bundle`] facade that turns it
//! into FHIR R4 JSON.
//!
//! Responsibilities:
//! - Gather the patient and every clinical resource into one `collection` bundle
//! - Translate each domain carrier into its wire struct
//! - Reject ids that would produce dangling or ambiguous references
//!
//! Notes:
//! - Resource ids are local to the bundle; every clinical resource references `Patient/<id>`
//! - Entries keep the order in which they were supplied

use crate::allergy_intolerance::{self, AllergyIntoleranceData, AllergyIntoleranceWire};
use crate::common::date_time;
use crate::condition::{self, ConditionData, ConditionWire};
use crate::encounter::{self, EncounterData, EncounterWire};
use crate::medication_statement::{self, MedicationStatementData, MedicationStatementWire};
use crate::observation::{self, ObservationData, ObservationWire};
use crate::patient::{self, PatientData, PatientWire};
use crate::{FhirError, FhirResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

// ============================================================================
// Public domain-level types
// ============================================================================

/// Domain-level carrier for a whole bundle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BundleData {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub patient: PatientData,
    pub medications: Vec<MedicationStatementData>,
    pub observations: Vec<ObservationData>,
    pub conditions: Vec<ConditionData>,
    pub allergies: Vec<AllergyIntoleranceData>,
    pub encounters: Vec<EncounterData>,
}

// ============================================================================
// Public Bundle operations
// ============================================================================

/// Bundle operations.
///
/// This is a zero-sized type used for namespacing bundle-related operations.
pub struct Bundle;

impl Bundle {
    /// Render a bundle as pretty-printed FHIR JSON.
    ///
    /// # Arguments
    ///
    /// * `data` - The bundle's patient and clinical resources.
    ///
    /// # Returns
    ///
    /// Returns the JSON text of a `collection` Bundle.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if:
    /// - the bundle or any resource id is blank,
    /// - two resources share an id,
    /// - serialisation fails.
    pub fn render(data: &BundleData) -> FhirResult<String> {
        let wire = domain_to_wire(data)?;
        Ok(serde_json::to_string_pretty(&wire)?)
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
struct BundleWire {
    #[serde(rename = "resourceType")]
    resource_type: &'static str,
    id: String,
    #[serde(rename = "type")]
    bundle_type: &'static str,
    timestamp: String,
    entry: Vec<EntryWire>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
struct EntryWire {
    resource: ResourceWire,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(untagged)]
enum ResourceWire {
    Patient(PatientWire),
    MedicationStatement(MedicationStatementWire),
    Observation(ObservationWire),
    Condition(ConditionWire),
    AllergyIntolerance(AllergyIntoleranceWire),
    Encounter(EncounterWire),
}

impl ResourceWire {
    fn id(&self) -> &str {
        match self {
            ResourceWire::Patient(r) => &r.id,
            ResourceWire::MedicationStatement(r) => &r.id,
            ResourceWire::Observation(r) => &r.id,
            ResourceWire::Condition(r) => &r.id,
            ResourceWire::AllergyIntolerance(r) => &r.id,
            ResourceWire::Encounter(r) => &r.id,
        }
    }
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn domain_to_wire(data: &BundleData) -> FhirResult<BundleWire> {
    let bundle_id = data.id.trim();
    if bundle_id.is_empty() {
        return Err(FhirError::InvalidInput("Bundle id cannot be empty".into()));
    }

    let patient = patient::to_wire(&data.patient)?;
    let patient_id = patient.id.clone();

    let mut resources = vec![ResourceWire::Patient(patient)];
    for m in &data.medications {
        resources.push(ResourceWire::MedicationStatement(
            medication_statement::to_wire(m, &patient_id)?,
        ));
    }
    for o in &data.observations {
        resources.push(ResourceWire::Observation(observation::to_wire(
            o,
            &patient_id,
        )?));
    }
    for c in &data.conditions {
        resources.push(ResourceWire::Condition(condition::to_wire(c, &patient_id)?));
    }
    for a in &data.allergies {
        resources.push(ResourceWire::AllergyIntolerance(
            allergy_intolerance::to_wire(a, &patient_id)?,
        ));
    }
    for e in &data.encounters {
        resources.push(ResourceWire::Encounter(encounter::to_wire(e, &patient_id)?));
    }

    let mut seen = HashSet::new();
    for resource in &resources {
        if !seen.insert(resource.id()) {
            return Err(FhirError::Translation(format!(
                "duplicate resource id '{}' in bundle",
                resource.id()
            )));
        }
    }

    Ok(BundleWire {
        resource_type: "Bundle",
        id: bundle_id.to_string(),
        bundle_type: "collection",
        timestamp: date_time(data.timestamp),
        entry: resources
            .into_iter()
            .map(|resource| EntryWire { resource })
            .collect(),
    })
}
