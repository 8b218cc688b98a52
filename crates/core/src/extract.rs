//! Per-entity extraction from section bodies.
//!
//! Each entity kind has a field table compiled once and a function that walks the section's
//! sub-blocks. Blocks that do not fit their expected shape are skipped on their own.

use crate::blocks::{split_sub_blocks, NAMED_HEADING, PARENTHETICAL_HEADING, PREFIXED_HEADING};
use crate::dates::normalize_date;
use crate::entities::{
    AllergyGroups, ClinicalEvent, Condition, Demographics, LabResult, Medication, Trend, VitalSign,
};
use crate::fields::{captured_value, field_line_pattern, FieldTable};
use chrono::{DateTime, Utc};
use health_md_types::NonEmptyText;
use regex::Regex;
use std::sync::LazyLock;

static DEMOGRAPHIC_FIELDS: LazyLock<FieldTable> = LazyLock::new(|| {
    FieldTable::new(&[
        ("age", "Age"),
        ("age_range", "Age Range"),
        ("sex", "Sex"),
        ("gender_identity", "Gender Identity"),
        ("occupation", "Occupation"),
        ("location", "Location"),
    ])
    .expect("valid demographic field table")
});

static MEDICATION_FIELDS: LazyLock<FieldTable> = LazyLock::new(|| {
    FieldTable::new(&[
        ("generic_name", "Generic Name"),
        ("indication", "Indication"),
        ("dosage", "Dosage"),
        ("route", "Route"),
        ("frequency", "Frequency"),
        ("started", "Started"),
        ("prescriber", "Prescriber"),
        ("notes", "Clinical Notes"),
    ])
    .expect("valid medication field table")
});

static LAB_GROUP_FIELDS: LazyLock<FieldTable> = LazyLock::new(|| {
    FieldTable::new(&[
        ("units", "Units"),
        ("clinical_significance", "Clinical Significance"),
    ])
    .expect("valid lab field table")
});

static VITAL_FIELDS: LazyLock<FieldTable> = LazyLock::new(|| {
    FieldTable::new(&[("reading", "Reading"), ("units", "Units"), ("notes", "Notes")])
        .expect("valid vital sign field table")
});

static EVENT_FIELDS: LazyLock<FieldTable> = LazyLock::new(|| {
    FieldTable::new(&[
        ("provider_type", "Provider Type"),
        ("visit_type", "Visit Type"),
        ("chief_complaint", "Chief Complaint"),
        ("assessment", "Assessment"),
        ("plan", "Plan"),
        ("notes", "Notes"),
    ])
    .expect("valid timeline field table")
});

/// `- **2024-03-15:** 7.2% ↓ (Ref: <5.7%)`
static LAB_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    field_line_pattern(r"(?P<date>\d{4}-\d{2}-\d{2})").expect("valid lab entry pattern")
});

static REFERENCE_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(Ref:\s*([^)]+)\)").expect("valid reference range pattern"));

static ICD_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"ICD-10:?[*_]*\s*([A-Z]\d{2}(?:\.\d+)?)").expect("valid ICD-10 pattern")
});

static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*+]\s+(.+)$").expect("valid bullet pattern"));

const EMPHASIS: &[char] = &['*', '_', ' ', '\t'];

fn name_text(raw: &str) -> Option<NonEmptyText> {
    NonEmptyText::new(raw).ok()
}

fn icd_codes(block: &str) -> Vec<String> {
    ICD_CODE
        .captures_iter(block)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

pub(crate) fn demographics(section: Option<&str>) -> Demographics {
    let Some(section) = section else {
        return Demographics::default();
    };

    let mut values = DEMOGRAPHIC_FIELDS.extract(section);
    let fields = DEMOGRAPHIC_FIELDS
        .fields()
        .filter_map(|field| Some((field, NonEmptyText::new(values.take(field)?).ok()?)))
        .collect();
    Demographics::new(fields)
}

pub(crate) fn medications(section: &str, reference: DateTime<Utc>) -> Vec<Medication> {
    split_sub_blocks::<1>(section, &NAMED_HEADING)
        .into_iter()
        .filter_map(|block| {
            let [name] = block.captures;
            let mut values = MEDICATION_FIELDS.extract(block.body);
            let started = values
                .take("started")
                .and_then(|raw| normalize_date(&raw, reference));

            Some(
                Medication::builder(name_text(&name)?)
                    .generic_name(values.take("generic_name"))
                    .indication(values.take("indication"))
                    .dosage(values.take("dosage"))
                    .route(values.take("route"))
                    .frequency(values.take("frequency"))
                    .started(started)
                    .prescriber(values.take("prescriber"))
                    .notes(values.take("notes"))
                    .icd_codes(icd_codes(block.body))
                    .build(),
            )
        })
        .collect()
}

/// Each `### Test` group yields one result per dated line, in line order.
pub(crate) fn lab_results(section: &str, reference: DateTime<Utc>) -> Vec<LabResult> {
    let mut results = Vec::new();

    for block in split_sub_blocks::<1>(section, &NAMED_HEADING) {
        let [name] = block.captures;
        let Some(name) = name_text(&name) else {
            continue;
        };
        let group = LAB_GROUP_FIELDS.extract(block.body);

        for line in block.body.lines() {
            let Some(caps) = LAB_ENTRY.captures(line) else {
                continue;
            };
            let (Some(date), Some(value)) = (caps.name("date"), caps.name("value")) else {
                continue;
            };
            let Some(value) = captured_value(value.as_str()) else {
                tracing::debug!("ignoring lab line without a value: {}", line);
                continue;
            };
            let Ok(value_text) = NonEmptyText::new(&value) else {
                continue;
            };

            let reference_range = REFERENCE_RANGE
                .captures(&value)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string());

            results.push(
                LabResult::builder(
                    name.clone(),
                    normalize_date(date.as_str(), reference),
                    value_text,
                )
                .reference_range(reference_range)
                .units(group.get("units").map(str::to_string))
                .clinical_significance(group.get("clinical_significance").map(str::to_string))
                .trend(Trend::from_value(&value))
                .build(),
            );
        }
    }

    results
}

pub(crate) fn vital_signs(section: &str, reference: DateTime<Utc>) -> Vec<VitalSign> {
    split_sub_blocks::<2>(section, &PARENTHETICAL_HEADING)
        .into_iter()
        .filter_map(|block| {
            let [name, date] = block.captures;
            let mut values = VITAL_FIELDS.extract(block.body);
            let Some(reading) = values.take("reading").and_then(|r| name_text(&r)) else {
                tracing::debug!("skipping vital sign '{}' without a reading", name);
                return None;
            };

            Some(
                VitalSign::builder(name_text(&name)?, normalize_date(&date, reference), reading)
                    .units(values.take("units"))
                    .notes(values.take("notes"))
                    .build(),
            )
        })
        .collect()
}

pub(crate) fn clinical_timeline(section: &str, reference: DateTime<Utc>) -> Vec<ClinicalEvent> {
    split_sub_blocks::<2>(section, &PREFIXED_HEADING)
        .into_iter()
        .filter_map(|block| {
            let [date, title] = block.captures;
            let mut values = EVENT_FIELDS.extract(block.body);

            Some(
                ClinicalEvent::builder(normalize_date(&date, reference), name_text(&title)?)
                    .provider_type(values.take("provider_type"))
                    .visit_type(values.take("visit_type"))
                    .chief_complaint(values.take("chief_complaint"))
                    .assessment(values.take("assessment"))
                    .plan(values.take("plan"))
                    .notes(values.take("notes"))
                    .build(),
            )
        })
        .collect()
}

pub(crate) fn conditions(section: &str, reference: DateTime<Utc>) -> Vec<Condition> {
    split_sub_blocks::<2>(section, &PARENTHETICAL_HEADING)
        .into_iter()
        .filter_map(|block| {
            let [name, onset] = block.captures;
            let icd_code = icd_codes(block.body).into_iter().next();
            Some(Condition::new(
                name_text(&name)?,
                normalize_date(&onset, reference),
                icd_code,
            ))
        })
        .collect()
}

/// Kind of allergy group, decided by keywords in the sub-heading title.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AllergyKind {
    Drug,
    Environmental,
    Food,
}

impl AllergyKind {
    fn from_title(title: &str) -> Option<Self> {
        let title = title.to_lowercase();
        if title.contains("drug") || title.contains("medication") {
            Some(AllergyKind::Drug)
        } else if title.contains("environment") {
            Some(AllergyKind::Environmental)
        } else if title.contains("food") {
            Some(AllergyKind::Food)
        } else {
            None
        }
    }
}

/// Render one bullet as `Name: reaction`, or as plain text when it has no colon.
fn allergy_entry(line: &str) -> Option<String> {
    let raw = BULLET.captures(line)?.get(1)?.as_str();
    match raw.split_once(':') {
        Some((name, reaction)) => {
            let name = name.trim_matches(EMPHASIS);
            let reaction = reaction.trim_matches(EMPHASIS);
            match (name.is_empty(), reaction.is_empty()) {
                (true, _) => None,
                (false, true) => Some(name.to_string()),
                (false, false) => Some(format!("{name}: {reaction}")),
            }
        }
        None => {
            let text = raw.trim_matches(EMPHASIS);
            (!text.is_empty()).then(|| text.to_string())
        }
    }
}

pub(crate) fn allergies(section: &str) -> AllergyGroups {
    let mut drug = Vec::new();
    let mut environmental = Vec::new();
    let mut food = Vec::new();

    for block in split_sub_blocks::<1>(section, &NAMED_HEADING) {
        let [title] = &block.captures;
        let target = match AllergyKind::from_title(title) {
            Some(AllergyKind::Drug) => &mut drug,
            Some(AllergyKind::Environmental) => &mut environmental,
            Some(AllergyKind::Food) => &mut food,
            None => {
                tracing::debug!("ignoring allergy group '{}'", title);
                continue;
            }
        };
        target.extend(block.body.lines().filter_map(allergy_entry));
    }

    AllergyGroups::new(drug, environmental, food)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn demographics_follow_table_order() {
        let section = "- **Sex:** Female\n- **Age:** 52\n- **Location:** Leeds, UK";
        let demographics = demographics(Some(section));

        assert_eq!(
            demographics.iter().collect::<Vec<_>>(),
            vec![("age", "52"), ("sex", "Female"), ("location", "Leeds, UK")]
        );
        assert!(super::demographics(None).is_empty());
    }

    #[test]
    fn medication_collects_fields_dates_and_codes() {
        let section = "\
### Metformin
- **Generic Name:** metformin hydrochloride
- **Indication:** Type 2 diabetes (ICD-10: E11.9)
- **Dosage:** 500mg twice daily
- **Started:** March 2023
- **Clinical Notes:** Tolerating well, ICD-10: Z79.84

### Lisinopril
- **Dosage:** 10mg
";
        let meds = medications(section, reference());

        assert_eq!(meds.len(), 2);
        assert_eq!(meds[0].name(), "Metformin");
        assert_eq!(meds[0].generic_name(), Some("metformin hydrochloride"));
        assert_eq!(meds[0].dosage(), Some("500mg twice daily"));
        assert_eq!(meds[0].started(), Some(ymd(2023, 3, 1)));
        assert_eq!(meds[0].notes(), Some("Tolerating well, ICD-10: Z79.84"));
        assert_eq!(meds[0].icd_codes(), ["E11.9".to_string(), "Z79.84".to_string()]);
        assert_eq!(meds[1].name(), "Lisinopril");
        assert_eq!(meds[1].indication(), None);
        assert!(meds[1].icd_codes().is_empty());
    }

    #[test]
    fn unparseable_started_date_is_absent() {
        let meds = medications("### Aspirin\n- Started: a while back", reference());
        assert_eq!(meds[0].started(), None);
    }

    #[test]
    fn lab_group_yields_one_result_per_dated_line() {
        let section = "\
### Hemoglobin A1c
- **Units:** %
- **2024-05-10:** 7.2% ↓ (Ref: <5.7%)
- **2024-02-01:** 7.8% ↑
- **Clinical Significance:** Improving control
";
        let labs = lab_results(section, reference());

        assert_eq!(labs.len(), 2);
        assert_eq!(labs[0].name(), "Hemoglobin A1c");
        assert_eq!(labs[0].date(), Some(ymd(2024, 5, 10)));
        assert_eq!(labs[0].value(), "7.2% ↓ (Ref: <5.7%)");
        assert_eq!(labs[0].reference_range(), Some("<5.7%"));
        assert_eq!(labs[0].trend(), Some(Trend::Down));
        assert_eq!(labs[0].units(), Some("%"));
        assert_eq!(labs[1].trend(), Some(Trend::Up));
        assert_eq!(labs[1].reference_range(), None);
        assert_eq!(labs[1].clinical_significance(), Some("Improving control"));
    }

    #[test]
    fn lab_lines_need_a_date_label_but_not_a_bullet() {
        let section = "\
### Glucose
2024-05-01: 110 mg/dL
Units: mg/dL
- Fasting: 95
Seen 2024-04-01: 99
";
        let labs = lab_results(section, reference());

        assert_eq!(labs.len(), 1);
        assert_eq!(labs[0].date(), Some(ymd(2024, 5, 1)));
        assert_eq!(labs[0].value(), "110 mg/dL");
        assert_eq!(labs[0].units(), Some("mg/dL"));
    }

    #[test]
    fn invalid_calendar_date_keeps_the_lab_without_a_date() {
        let labs = lab_results("### Glucose\n- 2024-02-30: 110 mg/dL", reference());
        assert_eq!(labs.len(), 1);
        assert_eq!(labs[0].date(), None);
    }

    #[test]
    fn vital_without_reading_is_skipped() {
        let section = "\
### Blood Pressure (2024-05-20)
- **Reading:** 128/82
- **Units:** mmHg

### Weight (2024-05-20)
- **Notes:** scale broken
";
        let vitals = vital_signs(section, reference());

        assert_eq!(vitals.len(), 1);
        assert_eq!(vitals[0].name(), "Blood Pressure");
        assert_eq!(vitals[0].value(), "128/82");
        assert_eq!(vitals[0].units(), Some("mmHg"));
        assert_eq!(vitals[0].date(), Some(ymd(2024, 5, 20)));
    }

    #[test]
    fn timeline_events_keep_document_order() {
        let section = "\
### 2024-01-10: Follow-up
- **Assessment:** Stable

### 2024-05-02: Annual Physical
- **Provider Type:** Primary care
- **Plan:** Repeat labs in 3 months
";
        let events = clinical_timeline(section, reference());

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].title(), "Follow-up");
        assert_eq!(events[0].assessment(), Some("Stable"));
        assert_eq!(events[1].date(), Some(ymd(2024, 5, 2)));
        assert_eq!(events[1].provider_type(), Some("Primary care"));
        assert_eq!(events[1].plan(), Some("Repeat labs in 3 months"));
    }

    #[test]
    fn conditions_take_first_icd_code() {
        let section = "\
### Type 2 Diabetes (2019)
- **ICD-10:** E11.9
- Related: ICD-10: E78.5

### Hypertension (March 2020)
- Controlled with medication
";
        let conditions = conditions(section, reference());

        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions[0].name(), "Type 2 Diabetes");
        assert_eq!(conditions[0].onset(), Some(ymd(2019, 1, 1)));
        assert_eq!(conditions[0].icd_code(), Some("E11.9"));
        assert_eq!(conditions[1].onset(), Some(ymd(2020, 3, 1)));
        assert_eq!(conditions[1].icd_code(), None);
    }

    #[test]
    fn allergies_group_by_heading_keywords() {
        let section = "\
### Drug Allergies
- **Penicillin:** Hives
- **Sulfa drugs:** Rash
### Environmental Allergies
- Pollen: sneezing
### Food Intolerances
- Lactose
### Other
- Latex: contact dermatitis
";
        let allergies = allergies(section);

        assert_eq!(
            allergies.drug(),
            ["Penicillin: Hives".to_string(), "Sulfa drugs: Rash".to_string()]
        );
        assert_eq!(allergies.environmental(), ["Pollen: sneezing".to_string()]);
        assert_eq!(allergies.food(), ["Lactose".to_string()]);
    }

    #[test]
    fn allergy_entry_handles_bare_names_and_non_bullets() {
        assert_eq!(allergy_entry("- **Codeine:**").as_deref(), Some("Codeine"));
        assert_eq!(allergy_entry("free text"), None);
        assert_eq!(allergy_entry("- : nothing"), None);
    }
}
