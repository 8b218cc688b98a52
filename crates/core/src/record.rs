//! The parsed health record.
//!
//! [`HealthRecord::parse`] runs every extraction step once and keeps the results. The record is
//! immutable afterwards; all accessors are read-only views filtered against the reference
//! instant the record was parsed with.

use crate::constants::{
    ALLERGY_SECTIONS, CLINICAL_TIMELINE_SECTION, DEMOGRAPHICS_SECTION, LAB_RESULTS_SECTION,
    MEDICAL_HISTORY_SECTION, MEDICATIONS_SECTION, VITAL_SIGNS_SECTION,
};
use crate::dates::window_start;
use crate::entities::{
    AllergyGroups, ClinicalEvent, Condition, Demographics, LabResult, Medication, VitalSign,
};
use crate::extract;
use crate::frontmatter::{split_front_matter, DocumentMetadata, MetadataStatus};
use crate::sections::{segment_sections, Sections};
use chrono::{DateTime, Utc};

/// A fully parsed Health.md document.
#[derive(Clone, Debug, PartialEq)]
pub struct HealthRecord {
    reference: DateTime<Utc>,
    metadata: DocumentMetadata,
    metadata_status: MetadataStatus,
    sections: Sections,
    demographics: Demographics,
    medications: Vec<Medication>,
    lab_results: Vec<LabResult>,
    vital_signs: Vec<VitalSign>,
    clinical_timeline: Vec<ClinicalEvent>,
    allergies: AllergyGroups,
    medical_history: Vec<Condition>,
}

impl HealthRecord {
    /// Parse document text into a record.
    ///
    /// # Arguments
    ///
    /// * `content` - Raw document text, metadata block included.
    /// * `reference` - Instant that relative dates and recency windows are measured from.
    ///
    /// # Returns
    ///
    /// The parsed record. Parsing never fails: malformed metadata becomes empty metadata and
    /// entries that do not fit their expected shape are skipped.
    pub fn parse(content: &str, reference: DateTime<Utc>) -> Self {
        let front = split_front_matter(content);
        let sections = segment_sections(front.body);

        let demographics = extract::demographics(sections.get(DEMOGRAPHICS_SECTION));
        let medications = sections
            .get(MEDICATIONS_SECTION)
            .map(|s| extract::medications(s, reference))
            .unwrap_or_default();
        let lab_results = sections
            .get(LAB_RESULTS_SECTION)
            .map(|s| extract::lab_results(s, reference))
            .unwrap_or_default();
        let vital_signs = sections
            .get(VITAL_SIGNS_SECTION)
            .map(|s| extract::vital_signs(s, reference))
            .unwrap_or_default();
        let clinical_timeline = sections
            .get(CLINICAL_TIMELINE_SECTION)
            .map(|s| extract::clinical_timeline(s, reference))
            .unwrap_or_default();
        let allergies = sections
            .first_of(&ALLERGY_SECTIONS)
            .map(extract::allergies)
            .unwrap_or_default();
        let medical_history = sections
            .get(MEDICAL_HISTORY_SECTION)
            .map(|s| extract::conditions(s, reference))
            .unwrap_or_default();

        tracing::debug!(
            "parsed record: {} sections, {} medications, {} labs, {} events",
            sections.len(),
            medications.len(),
            lab_results.len(),
            clinical_timeline.len()
        );

        Self {
            reference,
            metadata: front.metadata,
            metadata_status: front.status,
            sections,
            demographics,
            medications,
            lab_results,
            vital_signs,
            clinical_timeline,
            allergies,
            medical_history,
        }
    }

    pub fn reference(&self) -> DateTime<Utc> {
        self.reference
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    pub fn metadata_status(&self) -> &MetadataStatus {
        &self.metadata_status
    }

    pub fn sections(&self) -> &Sections {
        &self.sections
    }

    pub fn section_names(&self) -> Vec<&str> {
        self.sections.names().collect()
    }

    pub fn demographics(&self) -> &Demographics {
        &self.demographics
    }

    /// All current medications in document order.
    pub fn current_medications(&self) -> &[Medication] {
        &self.medications
    }

    pub fn lab_results(&self) -> &[LabResult] {
        &self.lab_results
    }

    /// Lab results dated within the last `window_days` days of the reference instant.
    ///
    /// Results without a date are never recent. Source order is preserved.
    pub fn recent_labs(&self, window_days: u32) -> Vec<&LabResult> {
        let start = window_start(self.reference, window_days);
        self.lab_results
            .iter()
            .filter(|lab| lab.date().is_some_and(|date| date >= start))
            .collect()
    }

    pub fn vital_signs(&self) -> &[VitalSign] {
        &self.vital_signs
    }

    /// Timeline events, optionally limited to the last `window_days` days.
    ///
    /// With `None` every event is returned, dated or not.
    pub fn clinical_timeline(&self, window_days: Option<u32>) -> Vec<&ClinicalEvent> {
        match window_days {
            None => self.clinical_timeline.iter().collect(),
            Some(days) => {
                let start = window_start(self.reference, days);
                self.clinical_timeline
                    .iter()
                    .filter(|event| event.date().is_some_and(|date| date >= start))
                    .collect()
            }
        }
    }

    /// Condition names from the medical history.
    pub fn conditions(&self) -> Vec<&str> {
        self.medical_history.iter().map(Condition::name).collect()
    }

    pub fn medical_history(&self) -> &[Condition] {
        &self.medical_history
    }

    pub fn allergies(&self) -> &AllergyGroups {
        &self.allergies
    }

    /// The metadata `privacy_level`, or `"unknown"` when not declared.
    pub fn privacy_level(&self) -> String {
        self.metadata.privacy_level()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    const DOCUMENT: &str = "\
---
version: \"1.0\"
privacy_level: identified
patient:
  id: abc-123
---

# Health Record

## Demographics
- **Age:** 52
- **Sex:** Female
- **Occupation:** Teacher

## Current Medications

### Metformin
- **Dosage:** 500mg twice daily
- **Indication:** Type 2 diabetes

### Atorvastatin
- **Dosage:** 20mg nightly

## Lab Results

### Hemoglobin A1c
- **2024-05-10:** 7.2% ↓
- **2023-11-14:** 7.9%

## Vital Signs

### Blood Pressure (2024-05-10)
- **Reading:** 128/82

## Medical History

### Type 2 Diabetes (2019)
- **ICD-10:** E11.9

## Allergies & Intolerances

### Drug Allergies
- **Penicillin:** Hives

## Clinical Timeline

### 2023-02-01: Initial Consult
- **Assessment:** New diagnosis

### 2024-05-10: Follow-up
- **Assessment:** Improving
";

    #[test]
    fn parses_full_document() {
        let record = HealthRecord::parse(DOCUMENT, reference());

        assert_eq!(record.privacy_level(), "identified");
        assert_eq!(record.metadata().version().as_deref(), Some("1.0"));
        assert_eq!(record.metadata_status(), &MetadataStatus::Parsed);
        assert_eq!(
            record.section_names(),
            vec![
                "health_record",
                "demographics",
                "current_medications",
                "lab_results",
                "vital_signs",
                "medical_history",
                "allergies_&_intolerances",
                "clinical_timeline",
            ]
        );
        assert_eq!(record.demographics().get("occupation"), Some("Teacher"));
        assert_eq!(
            record
                .current_medications()
                .iter()
                .map(Medication::name)
                .collect::<Vec<_>>(),
            vec!["Metformin", "Atorvastatin"]
        );
        assert_eq!(record.lab_results().len(), 2);
        assert_eq!(record.vital_signs().len(), 1);
        assert_eq!(record.conditions(), vec!["Type 2 Diabetes"]);
        assert_eq!(record.allergies().drug(), ["Penicillin: Hives".to_string()]);
        assert_eq!(record.clinical_timeline(None).len(), 2);
    }

    #[test]
    fn recent_labs_applies_window_to_reference() {
        let record = HealthRecord::parse(DOCUMENT, reference());
        let recent = record.recent_labs(90);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].value(), "7.2% ↓");
    }

    #[test]
    fn recent_labs_includes_the_window_boundary() {
        let ninety = (reference() - Duration::days(90)).format("%Y-%m-%d");
        let two_hundred = (reference() - Duration::days(200)).format("%Y-%m-%d");
        let doc = format!(
            "## Lab Results\n### Glucose\n- {ninety}: 95 mg/dL\n- {two_hundred}: 101 mg/dL\n"
        );
        let record = HealthRecord::parse(&doc, reference());

        let recent = record.recent_labs(90);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].value(), "95 mg/dL");
    }

    #[test]
    fn timeline_window_filters_by_date() {
        let record = HealthRecord::parse(DOCUMENT, reference());
        let recent = record.clinical_timeline(Some(365));
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].title(), "Follow-up");
    }

    #[test]
    fn undated_events_only_appear_unfiltered() {
        let doc = "## Clinical Timeline\n### Someday: Phone call\n- Notes: left message";
        let record = HealthRecord::parse(doc, reference());

        assert_eq!(record.clinical_timeline(None).len(), 1);
        assert!(record.clinical_timeline(Some(36500)).is_empty());
    }

    #[test]
    fn reparsing_with_fixed_reference_is_equal() {
        let doc = format!("{DOCUMENT}\n### 3 weeks ago: Phone review\n");
        assert_eq!(
            HealthRecord::parse(&doc, reference()),
            HealthRecord::parse(&doc, reference())
        );
    }

    #[test]
    fn document_without_metadata_defaults_privacy_level() {
        let record = HealthRecord::parse("## Demographics\n- Age: 40", reference());
        assert_eq!(record.privacy_level(), "unknown");
        assert_eq!(record.metadata_status(), &MetadataStatus::Absent);
        assert!(record.metadata().is_empty());
    }

    #[test]
    fn malformed_metadata_still_parses_body() {
        let doc = "---\n: : [unclosed\n---\n## Current Medications\n### Aspirin\n";
        let record = HealthRecord::parse(doc, reference());

        assert!(matches!(record.metadata_status(), MetadataStatus::Malformed(_)));
        assert!(record.metadata().is_empty());
        assert_eq!(record.current_medications().len(), 1);
    }

    #[test]
    fn allergies_alias_section_is_used() {
        let doc = "## Allergies\n### Food\n- Peanuts: anaphylaxis";
        let record = HealthRecord::parse(doc, reference());
        assert_eq!(record.allergies().food(), ["Peanuts: anaphylaxis".to_string()]);
    }

    #[test]
    fn empty_document_is_an_empty_record() {
        let record = HealthRecord::parse("", reference());
        assert!(record.section_names().is_empty());
        assert!(record.current_medications().is_empty());
        assert!(record.allergies().is_empty());
    }

    #[test]
    fn record_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HealthRecord>();
    }
}
