//! Heuristic clinical observations derived from a parsed record.
//!
//! These are simple rule-of-thumb flags, not clinical decision support.

use crate::constants::INSIGHT_LAB_WINDOW_DAYS;
use crate::entities::Trend;
use crate::record::HealthRecord;
use serde::Serialize;

/// Observations grouped by category. Empty categories are valid.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Insights {
    pub medication_insights: Vec<String>,
    pub lab_trends: Vec<String>,
    pub care_gaps: Vec<String>,
    pub risk_factors: Vec<String>,
}

impl Insights {
    /// Categories with their display label, in presentation order.
    pub fn categories(&self) -> [(&'static str, &[String]); 4] {
        [
            ("Medication Insights", self.medication_insights.as_slice()),
            ("Lab Trends", self.lab_trends.as_slice()),
            ("Care Gaps", self.care_gaps.as_slice()),
            ("Risk Factors", self.risk_factors.as_slice()),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.categories().iter().all(|(_, items)| items.is_empty())
    }
}

fn mentions_diabetes(text: &str) -> bool {
    text.to_lowercase().contains("diabetes")
}

/// Leading whole number of an age entry, e.g. `52` from `52 years`.
fn age_years(age: &str) -> Option<u32> {
    let digits: String = age.trim().chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Derive insights from a record.
pub fn generate(record: &HealthRecord) -> Insights {
    let mut insights = Insights::default();
    let medications = record.current_medications();

    let diabetes_meds = medications
        .iter()
        .filter(|m| m.indication().is_some_and(mentions_diabetes))
        .count();
    if diabetes_meds > 0 {
        insights.medication_insights.push(format!(
            "Patient is on {diabetes_meds} diabetes medication(s)"
        ));
    }

    let recent_labs = record.recent_labs(INSIGHT_LAB_WINDOW_DAYS);
    let a1c: Vec<_> = recent_labs
        .iter()
        .filter(|lab| lab.name().to_lowercase().contains("a1c"))
        .collect();
    if a1c.len() >= 2 && a1c.iter().any(|lab| lab.trend() == Some(Trend::Down)) {
        insights
            .lab_trends
            .push("HbA1c trending downward - good glycemic control".to_string());
    }

    if !medications.is_empty() && recent_labs.is_empty() {
        insights
            .care_gaps
            .push("Patient on medications but no recent lab monitoring".to_string());
    }

    let in_fifties = record
        .demographics()
        .get("age")
        .and_then(age_years)
        .is_some_and(|age| (50..60).contains(&age));
    let diabetic = record.conditions().into_iter().any(mentions_diabetes);
    if in_fifties || diabetic {
        insights
            .risk_factors
            .push("Increased cardiovascular risk - consider lipid monitoring".to_string());
    }

    insights
}
