//! Typed clinical entities.
//!
//! Entities are immutable values. Each one is assembled through a builder that collects every
//! optional field before [`build`](MedicationBuilder::build) hands out the finished value, so a
//! partially populated entity never escapes the parser. Optional text fields hold
//! [`NonEmptyText`]; a blank value is absent, never an empty string.

use chrono::{DateTime, Utc};
use health_md_types::NonEmptyText;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

fn text(value: &Option<NonEmptyText>) -> Option<&str> {
    value.as_ref().map(NonEmptyText::as_str)
}

// ============================================================================
// Demographics
// ============================================================================

/// Demographic fields in extraction order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Demographics {
    fields: Vec<(&'static str, NonEmptyText)>,
}

impl Demographics {
    pub(crate) fn new(fields: Vec<(&'static str, NonEmptyText)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Demographics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

// ============================================================================
// Medication
// ============================================================================

/// A current medication.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Medication {
    name: NonEmptyText,
    generic_name: Option<NonEmptyText>,
    indication: Option<NonEmptyText>,
    dosage: Option<NonEmptyText>,
    route: Option<NonEmptyText>,
    frequency: Option<NonEmptyText>,
    started: Option<DateTime<Utc>>,
    prescriber: Option<NonEmptyText>,
    notes: Option<NonEmptyText>,
    icd_codes: Vec<String>,
}

impl Medication {
    pub fn builder(name: NonEmptyText) -> MedicationBuilder {
        MedicationBuilder {
            name,
            generic_name: None,
            indication: None,
            dosage: None,
            route: None,
            frequency: None,
            started: None,
            prescriber: None,
            notes: None,
            icd_codes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn generic_name(&self) -> Option<&str> {
        text(&self.generic_name)
    }

    pub fn indication(&self) -> Option<&str> {
        text(&self.indication)
    }

    pub fn dosage(&self) -> Option<&str> {
        text(&self.dosage)
    }

    pub fn route(&self) -> Option<&str> {
        text(&self.route)
    }

    pub fn frequency(&self) -> Option<&str> {
        text(&self.frequency)
    }

    pub fn started(&self) -> Option<DateTime<Utc>> {
        self.started
    }

    pub fn prescriber(&self) -> Option<&str> {
        text(&self.prescriber)
    }

    pub fn notes(&self) -> Option<&str> {
        text(&self.notes)
    }

    /// ICD-10 codes mentioned in the medication block; empty when none are given.
    pub fn icd_codes(&self) -> &[String] {
        &self.icd_codes
    }
}

/// Collects the optional fields of a [`Medication`].
#[derive(Clone, Debug)]
pub struct MedicationBuilder {
    name: NonEmptyText,
    generic_name: Option<NonEmptyText>,
    indication: Option<NonEmptyText>,
    dosage: Option<NonEmptyText>,
    route: Option<NonEmptyText>,
    frequency: Option<NonEmptyText>,
    started: Option<DateTime<Utc>>,
    prescriber: Option<NonEmptyText>,
    notes: Option<NonEmptyText>,
    icd_codes: Vec<String>,
}

impl MedicationBuilder {
    pub fn generic_name(mut self, value: Option<String>) -> Self {
        self.generic_name = NonEmptyText::optional(value);
        self
    }

    pub fn indication(mut self, value: Option<String>) -> Self {
        self.indication = NonEmptyText::optional(value);
        self
    }

    pub fn dosage(mut self, value: Option<String>) -> Self {
        self.dosage = NonEmptyText::optional(value);
        self
    }

    pub fn route(mut self, value: Option<String>) -> Self {
        self.route = NonEmptyText::optional(value);
        self
    }

    pub fn frequency(mut self, value: Option<String>) -> Self {
        self.frequency = NonEmptyText::optional(value);
        self
    }

    pub fn started(mut self, value: Option<DateTime<Utc>>) -> Self {
        self.started = value;
        self
    }

    pub fn prescriber(mut self, value: Option<String>) -> Self {
        self.prescriber = NonEmptyText::optional(value);
        self
    }

    pub fn notes(mut self, value: Option<String>) -> Self {
        self.notes = NonEmptyText::optional(value);
        self
    }

    pub fn icd_codes(mut self, codes: Vec<String>) -> Self {
        self.icd_codes = codes;
        self
    }

    pub fn build(self) -> Medication {
        Medication {
            name: self.name,
            generic_name: self.generic_name,
            indication: self.indication,
            dosage: self.dosage,
            route: self.route,
            frequency: self.frequency,
            started: self.started,
            prescriber: self.prescriber,
            notes: self.notes,
            icd_codes: self.icd_codes,
        }
    }
}

// ============================================================================
// Lab results
// ============================================================================

/// Direction of a lab value relative to the previous result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    fn from_glyph(c: char) -> Option<Self> {
        match c {
            '↑' => Some(Trend::Up),
            '↓' => Some(Trend::Down),
            '→' => Some(Trend::Flat),
            _ => None,
        }
    }

    /// Read the trend marker from a lab value such as `7.2% ↓`.
    ///
    /// Recognizes the glyphs `↑`, `↓` and `→`. A value mixing different glyphs has no
    /// trend rather than whichever glyph happens to come first.
    pub fn from_value(value: &str) -> Option<Self> {
        let mut found = None;
        for trend in value.chars().filter_map(Self::from_glyph) {
            match found {
                None => found = Some(trend),
                Some(existing) if existing == trend => {}
                Some(_) => return None,
            }
        }
        found
    }
}

/// A single dated lab measurement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LabResult {
    name: NonEmptyText,
    date: Option<DateTime<Utc>>,
    value: NonEmptyText,
    reference_range: Option<NonEmptyText>,
    units: Option<NonEmptyText>,
    clinical_significance: Option<NonEmptyText>,
    trend: Option<Trend>,
}

impl LabResult {
    pub fn builder(
        name: NonEmptyText,
        date: Option<DateTime<Utc>>,
        value: NonEmptyText,
    ) -> LabResultBuilder {
        LabResultBuilder {
            name,
            date,
            value,
            reference_range: None,
            units: None,
            clinical_significance: None,
            trend: None,
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.date
    }

    pub fn value(&self) -> &str {
        self.value.as_str()
    }

    pub fn reference_range(&self) -> Option<&str> {
        text(&self.reference_range)
    }

    pub fn units(&self) -> Option<&str> {
        text(&self.units)
    }

    pub fn clinical_significance(&self) -> Option<&str> {
        text(&self.clinical_significance)
    }

    pub fn trend(&self) -> Option<Trend> {
        self.trend
    }
}

/// Collects the optional fields of a [`LabResult`].
#[derive(Clone, Debug)]
pub struct LabResultBuilder {
    name: NonEmptyText,
    date: Option<DateTime<Utc>>,
    value: NonEmptyText,
    reference_range: Option<NonEmptyText>,
    units: Option<NonEmptyText>,
    clinical_significance: Option<NonEmptyText>,
    trend: Option<Trend>,
}

impl LabResultBuilder {
    pub fn reference_range(mut self, value: Option<String>) -> Self {
        self.reference_range = NonEmptyText::optional(value);
        self
    }

    pub fn units(mut self, value: Option<String>) -> Self {
        self.units = NonEmptyText::optional(value);
        self
    }

    pub fn clinical_significance(mut self, value: Option<String>) -> Self {
        self.clinical_significance = NonEmptyText::optional(value);
        self
    }

    pub fn trend(mut self, value: Option<Trend>) -> Self {
        self.trend = value;
        self
    }

    pub fn build(self) -> LabResult {
        LabResult {
            name: self.name,
            date: self.date,
            value: self.value,
            reference_range: self.reference_range,
            units: self.units,
            clinical_significance: self.clinical_significance,
            trend: self.trend,
        }
    }
}

// ============================================================================
// Vital signs
// ============================================================================

/// A vital sign reading.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VitalSign {
    name: NonEmptyText,
    date: Option<DateTime<Utc>>,
    value: NonEmptyText,
    units: Option<NonEmptyText>,
    notes: Option<NonEmptyText>,
}

impl VitalSign {
    pub fn builder(
        name: NonEmptyText,
        date: Option<DateTime<Utc>>,
        value: NonEmptyText,
    ) -> VitalSignBuilder {
        VitalSignBuilder {
            name,
            date,
            value,
            units: None,
            notes: None,
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.date
    }

    pub fn value(&self) -> &str {
        self.value.as_str()
    }

    pub fn units(&self) -> Option<&str> {
        text(&self.units)
    }

    pub fn notes(&self) -> Option<&str> {
        text(&self.notes)
    }
}

/// Collects the optional fields of a [`VitalSign`].
#[derive(Clone, Debug)]
pub struct VitalSignBuilder {
    name: NonEmptyText,
    date: Option<DateTime<Utc>>,
    value: NonEmptyText,
    units: Option<NonEmptyText>,
    notes: Option<NonEmptyText>,
}

impl VitalSignBuilder {
    pub fn units(mut self, value: Option<String>) -> Self {
        self.units = NonEmptyText::optional(value);
        self
    }

    pub fn notes(mut self, value: Option<String>) -> Self {
        self.notes = NonEmptyText::optional(value);
        self
    }

    pub fn build(self) -> VitalSign {
        VitalSign {
            name: self.name,
            date: self.date,
            value: self.value,
            units: self.units,
            notes: self.notes,
        }
    }
}

// ============================================================================
// Clinical timeline
// ============================================================================

/// A dated encounter on the clinical timeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClinicalEvent {
    date: Option<DateTime<Utc>>,
    title: NonEmptyText,
    provider_type: Option<NonEmptyText>,
    visit_type: Option<NonEmptyText>,
    chief_complaint: Option<NonEmptyText>,
    assessment: Option<NonEmptyText>,
    plan: Option<NonEmptyText>,
    notes: Option<NonEmptyText>,
}

impl ClinicalEvent {
    pub fn builder(date: Option<DateTime<Utc>>, title: NonEmptyText) -> ClinicalEventBuilder {
        ClinicalEventBuilder {
            date,
            title,
            provider_type: None,
            visit_type: None,
            chief_complaint: None,
            assessment: None,
            plan: None,
            notes: None,
        }
    }

    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.date
    }

    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    pub fn provider_type(&self) -> Option<&str> {
        text(&self.provider_type)
    }

    pub fn visit_type(&self) -> Option<&str> {
        text(&self.visit_type)
    }

    pub fn chief_complaint(&self) -> Option<&str> {
        text(&self.chief_complaint)
    }

    pub fn assessment(&self) -> Option<&str> {
        text(&self.assessment)
    }

    pub fn plan(&self) -> Option<&str> {
        text(&self.plan)
    }

    pub fn notes(&self) -> Option<&str> {
        text(&self.notes)
    }
}

/// Collects the optional fields of a [`ClinicalEvent`].
#[derive(Clone, Debug)]
pub struct ClinicalEventBuilder {
    date: Option<DateTime<Utc>>,
    title: NonEmptyText,
    provider_type: Option<NonEmptyText>,
    visit_type: Option<NonEmptyText>,
    chief_complaint: Option<NonEmptyText>,
    assessment: Option<NonEmptyText>,
    plan: Option<NonEmptyText>,
    notes: Option<NonEmptyText>,
}

impl ClinicalEventBuilder {
    pub fn provider_type(mut self, value: Option<String>) -> Self {
        self.provider_type = NonEmptyText::optional(value);
        self
    }

    pub fn visit_type(mut self, value: Option<String>) -> Self {
        self.visit_type = NonEmptyText::optional(value);
        self
    }

    pub fn chief_complaint(mut self, value: Option<String>) -> Self {
        self.chief_complaint = NonEmptyText::optional(value);
        self
    }

    pub fn assessment(mut self, value: Option<String>) -> Self {
        self.assessment = NonEmptyText::optional(value);
        self
    }

    pub fn plan(mut self, value: Option<String>) -> Self {
        self.plan = NonEmptyText::optional(value);
        self
    }

    pub fn notes(mut self, value: Option<String>) -> Self {
        self.notes = NonEmptyText::optional(value);
        self
    }

    pub fn build(self) -> ClinicalEvent {
        ClinicalEvent {
            date: self.date,
            title: self.title,
            provider_type: self.provider_type,
            visit_type: self.visit_type,
            chief_complaint: self.chief_complaint,
            assessment: self.assessment,
            plan: self.plan,
            notes: self.notes,
        }
    }
}

// ============================================================================
// Conditions and allergies
// ============================================================================

/// A diagnosed condition from the medical history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Condition {
    name: NonEmptyText,
    onset: Option<DateTime<Utc>>,
    icd_code: Option<NonEmptyText>,
}

impl Condition {
    pub fn new(name: NonEmptyText, onset: Option<DateTime<Utc>>, icd_code: Option<String>) -> Self {
        Self {
            name,
            onset,
            icd_code: NonEmptyText::optional(icd_code),
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn onset(&self) -> Option<DateTime<Utc>> {
        self.onset
    }

    pub fn icd_code(&self) -> Option<&str> {
        text(&self.icd_code)
    }
}

/// Allergy entries grouped by kind, each in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AllergyGroups {
    #[serde(rename = "drug_allergies")]
    drug: Vec<String>,
    #[serde(rename = "environmental_allergies")]
    environmental: Vec<String>,
    #[serde(rename = "food_intolerances")]
    food: Vec<String>,
}

impl AllergyGroups {
    pub fn new(drug: Vec<String>, environmental: Vec<String>, food: Vec<String>) -> Self {
        Self {
            drug,
            environmental,
            food,
        }
    }

    pub fn drug(&self) -> &[String] {
        &self.drug
    }

    pub fn environmental(&self) -> &[String] {
        &self.environmental
    }

    pub fn food(&self) -> &[String] {
        &self.food
    }

    pub fn is_empty(&self) -> bool {
        self.drug.is_empty() && self.environmental.is_empty() && self.food.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> NonEmptyText {
        NonEmptyText::new(s).expect("non-empty test text")
    }

    #[test]
    fn builder_drops_blank_optional_values() {
        let med = Medication::builder(text("Metformin"))
            .dosage(Some("  ".into()))
            .indication(Some("Type 2 diabetes".into()))
            .route(None)
            .build();

        assert_eq!(med.name(), "Metformin");
        assert_eq!(med.dosage(), None);
        assert_eq!(med.indication(), Some("Type 2 diabetes"));
        assert_eq!(med.route(), None);
        assert!(med.icd_codes().is_empty());
    }

    #[test]
    fn trend_reads_single_glyph_kind() {
        assert_eq!(Trend::from_value("7.2% ↓"), Some(Trend::Down));
        assert_eq!(Trend::from_value("↑ 140 mg/dL ↑"), Some(Trend::Up));
        assert_eq!(Trend::from_value("98 → stable"), Some(Trend::Flat));
        assert_eq!(Trend::from_value("5.4"), None);
    }

    #[test]
    fn conflicting_trend_glyphs_yield_no_trend() {
        assert_eq!(Trend::from_value("↑ then ↓"), None);
    }

    #[test]
    fn demographics_keep_insertion_order_when_serialised() {
        let demographics = Demographics::new(vec![("sex", text("Female")), ("age", text("52"))]);
        let json = serde_json::to_string(&demographics).expect("serialise demographics");
        assert_eq!(json, r#"{"sex":"Female","age":"52"}"#);
        assert_eq!(demographics.get("age"), Some("52"));
    }

    #[test]
    fn trend_serialises_lowercase() {
        let json = serde_json::to_string(&Trend::Flat).expect("serialise trend");
        assert_eq!(json, "\"flat\"");
    }

    #[test]
    fn allergy_groups_serialise_with_descriptive_keys() {
        let groups = AllergyGroups::new(vec!["Penicillin: rash".into()], vec![], vec![]);
        let json = serde_json::to_value(&groups).expect("serialise allergies");
        assert_eq!(json["drug_allergies"][0], "Penicillin: rash");
        assert!(json["food_intolerances"].as_array().expect("array").is_empty());
    }
}
