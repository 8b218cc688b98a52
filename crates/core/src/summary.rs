//! Bounded plain-text digest of a record, for use as language model context.

use crate::constants::{DIGEST_ELLIPSIS, DIGEST_MAX_LABS, DIGEST_MAX_VISITS, DIGEST_WINDOW_DAYS};
use crate::record::HealthRecord;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// `age_range` -> `Age Range`
fn title_case(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn last<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}

/// Cut `text` to at most `max_length` characters, marking the cut with `...`.
fn truncate(text: String, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text;
    }

    let ellipsis_len = DIGEST_ELLIPSIS.chars().count();
    if max_length < ellipsis_len {
        return DIGEST_ELLIPSIS.chars().take(max_length).collect();
    }

    let mut out: String = text.chars().take(max_length - ellipsis_len).collect();
    out.push_str(DIGEST_ELLIPSIS);
    out
}

impl HealthRecord {
    /// Render the context digest, at most `max_length` characters long.
    ///
    /// Parts appear in a fixed order and are omitted when they have no data: patient
    /// demographics, conditions, medications, recent labs, drug allergies and recent visits.
    /// Parts are separated by a blank line.
    pub fn to_llm_context(&self, max_length: usize) -> String {
        let mut parts = Vec::new();

        let demographics: Vec<String> = self
            .demographics()
            .iter()
            .map(|(key, value)| format!("{}: {}", title_case(key), value))
            .collect();
        if !demographics.is_empty() {
            parts.push(format!("PATIENT: {}", demographics.join(", ")));
        }

        let conditions: Vec<String> = self
            .medical_history()
            .iter()
            .map(|c| format!("{} ({})", c.name(), c.icd_code().unwrap_or("unknown onset")))
            .collect();
        if !conditions.is_empty() {
            parts.push(format!("CONDITIONS: {}", conditions.join("; ")));
        }

        let medications: Vec<String> = self
            .current_medications()
            .iter()
            .map(|med| {
                let mut line = med.name().to_string();
                if let Some(dosage) = med.dosage() {
                    line.push(' ');
                    line.push_str(dosage);
                }
                if let Some(indication) = med.indication() {
                    line.push_str(" for ");
                    line.push_str(indication);
                }
                line
            })
            .collect();
        if !medications.is_empty() {
            parts.push(format!("MEDICATIONS: {}", medications.join("; ")));
        }

        let recent_labs = self.recent_labs(DIGEST_WINDOW_DAYS);
        let labs: Vec<String> = last(&recent_labs, DIGEST_MAX_LABS)
            .iter()
            .map(|lab| match lab.date() {
                Some(date) => format!(
                    "{}: {} ({})",
                    lab.name(),
                    lab.value(),
                    date.format(DATE_FORMAT)
                ),
                None => format!("{}: {}", lab.name(), lab.value()),
            })
            .collect();
        if !labs.is_empty() {
            parts.push(format!("RECENT LABS: {}", labs.join("; ")));
        }

        if !self.allergies().drug().is_empty() {
            parts.push(format!("ALLERGIES: {}", self.allergies().drug().join("; ")));
        }

        let recent_events = self.clinical_timeline(Some(DIGEST_WINDOW_DAYS));
        let visits: Vec<String> = last(&recent_events, DIGEST_MAX_VISITS)
            .iter()
            .filter_map(|event| {
                let date = event.date()?.format(DATE_FORMAT);
                let mut line = format!("{}: {}", date, event.title());
                if let Some(assessment) = event.assessment() {
                    line.push_str(" - ");
                    line.push_str(assessment);
                }
                Some(line)
            })
            .collect();
        if !visits.is_empty() {
            parts.push(format!("RECENT VISITS: {}", visits.join("; ")));
        }

        truncate(parts.join("\n\n"), max_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn single_bare_medication_digest() {
        let record = HealthRecord::parse("## Current Medications\n### Metformin\n", reference());
        assert_eq!(record.to_llm_context(4000), "MEDICATIONS: Metformin");
    }

    #[test]
    fn digest_sections_in_fixed_order() {
        let doc = "\
## Clinical Timeline
### 2024-05-20: Follow-up
- **Assessment:** Improving
## Allergies & Intolerances
### Drug Allergies
- **Penicillin:** Hives
## Lab Results
### Hemoglobin A1c
- **2024-05-10:** 7.2%
## Current Medications
### Metformin
- **Dosage:** 500mg
- **Indication:** diabetes
## Medical History
### Type 2 Diabetes (2019)
- ICD-10: E11.9
### Asthma (2001)
## Demographics
- **Age Range:** 50-59
- **Sex:** Female
";
        let record = HealthRecord::parse(doc, reference());

        assert_eq!(
            record.to_llm_context(4000),
            "PATIENT: Age Range: 50-59, Sex: Female\n\n\
             CONDITIONS: Type 2 Diabetes (E11.9); Asthma (unknown onset)\n\n\
             MEDICATIONS: Metformin 500mg for diabetes\n\n\
             RECENT LABS: Hemoglobin A1c: 7.2% (2024-05-10)\n\n\
             ALLERGIES: Penicillin: Hives\n\n\
             RECENT VISITS: 2024-05-20: Follow-up - Improving"
        );
    }

    #[test]
    fn digest_keeps_last_five_recent_labs() {
        let lines: String = (1..=7).map(|d| format!("- 2024-05-0{d}: {d}\n")).collect();
        let doc = format!("## Lab Results\n### Glucose\n{lines}");
        let record = HealthRecord::parse(&doc, reference());

        let digest = record.to_llm_context(4000);
        assert!(digest.starts_with("RECENT LABS: Glucose: 3 (2024-05-03)"));
        assert!(digest.ends_with("Glucose: 7 (2024-05-07)"));
        assert_eq!(digest.matches("Glucose").count(), 5);
    }

    #[test]
    fn digest_keeps_last_three_recent_visits() {
        let events: String = (1..=4)
            .map(|d| format!("### 2024-05-0{d}: Visit {d}\n"))
            .collect();
        let doc = format!("## Clinical Timeline\n{events}");
        let record = HealthRecord::parse(&doc, reference());

        assert_eq!(
            record.to_llm_context(4000),
            "RECENT VISITS: 2024-05-02: Visit 2; 2024-05-03: Visit 3; 2024-05-04: Visit 4"
        );
    }

    #[test]
    fn old_labs_and_visits_are_left_out() {
        let doc = "## Lab Results\n### Glucose\n- 2020-01-01: 99\n## Clinical Timeline\n### 2020-01-01: Old visit";
        let record = HealthRecord::parse(doc, reference());
        assert_eq!(record.to_llm_context(4000), "");
    }

    #[test]
    fn truncates_to_exact_maximum() {
        let record = HealthRecord::parse("## Current Medications\n### Metformin\n", reference());
        let digest = record.to_llm_context(10);

        assert_eq!(digest.chars().count(), 10);
        assert!(digest.ends_with("..."));
        assert_eq!(digest, "MEDICAT...");
    }

    #[test]
    fn tiny_maximum_never_exceeds_limit() {
        let record = HealthRecord::parse("## Current Medications\n### Metformin\n", reference());
        assert_eq!(record.to_llm_context(2), "..");
        assert_eq!(record.to_llm_context(0), "");
        assert_eq!(record.to_llm_context(3), "...");
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        assert_eq!(truncate("ééééé".to_string(), 4), "é...");
        assert_eq!(truncate("ééé".to_string(), 3), "ééé");
    }

    #[test]
    fn title_case_splits_on_underscores() {
        assert_eq!(title_case("gender_identity"), "Gender Identity");
        assert_eq!(title_case("age"), "Age");
    }
}
