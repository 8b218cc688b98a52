//! Terminal rendering of record views.
//!
//! Each function renders one block of output as a string; `main` decides which blocks to print.

use health_md_core::anonymize::AnonymizationReport;
use health_md_core::insights::Insights;
use health_md_core::{HealthRecord, ValidationReport};
use std::fmt::Write;

const RULE_WIDTH: usize = 50;
const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn validation(report: &ValidationReport) -> String {
    let mut out = String::from("Health.md file is valid\n");
    let _ = writeln!(
        out,
        "   Version: {}",
        report.version.as_deref().unwrap_or("unknown")
    );
    let _ = writeln!(out, "   Privacy Level: {}", report.privacy_level);
    let _ = writeln!(out, "   Sections: {}", report.sections_found.join(", "));
    if !report.warnings.is_empty() {
        let _ = writeln!(out, "   Warnings: {}", report.warnings.len());
        for warning in &report.warnings {
            let _ = writeln!(out, "     - {warning}");
        }
    }
    out
}

pub fn summary(record: &HealthRecord, max_length: usize) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    format!(
        "LLM-Optimized Summary:\n{rule}\n{}\n{rule}\n",
        record.to_llm_context(max_length)
    )
}

pub fn medications(record: &HealthRecord) -> String {
    let meds = record.current_medications();
    let mut out = format!("Current Medications ({}):\n", meds.len());
    for med in meds {
        let _ = writeln!(out, "  • {}", med.name());
        if let Some(dosage) = med.dosage() {
            let _ = writeln!(out, "    Dosage: {dosage}");
        }
        if let Some(indication) = med.indication() {
            let _ = writeln!(out, "    For: {indication}");
        }
    }
    out
}

pub fn labs(record: &HealthRecord, window_days: u32) -> String {
    let labs = record.recent_labs(window_days);
    let mut out = format!(
        "Recent Lab Results ({} in last {} days):\n",
        labs.len(),
        window_days
    );
    for lab in labs {
        let _ = writeln!(out, "  • {}: {}", lab.name(), lab.value());
        if let Some(date) = lab.date() {
            let _ = writeln!(out, "    Date: {}", date.format(DATE_FORMAT));
        }
    }
    out
}

pub fn conditions(record: &HealthRecord) -> String {
    let history = record.medical_history();
    let mut out = format!("Medical Conditions ({}):\n", history.len());
    for condition in history {
        let onset = condition
            .onset()
            .map(|d| format!(" (since {})", d.format(DATE_FORMAT)))
            .unwrap_or_default();
        let _ = writeln!(out, "  • {}{}", condition.name(), onset);
        if let Some(code) = condition.icd_code() {
            let _ = writeln!(out, "    ICD-10: {code}");
        }
    }
    out
}

pub fn timeline(record: &HealthRecord, window_days: u32) -> String {
    let events = record.clinical_timeline(Some(window_days));
    let mut out = format!(
        "Clinical Timeline ({} events in last {} days):\n",
        events.len(),
        window_days
    );
    for event in events {
        let date = event
            .date()
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| "Unknown date".to_string());
        let _ = writeln!(out, "  • {}: {}", date, event.title());
        if let Some(assessment) = event.assessment() {
            let _ = writeln!(out, "    Assessment: {assessment}");
        }
    }
    out
}

pub fn insights(insights: &Insights) -> String {
    let mut out = String::from("Clinical Insights:\n");
    for (label, items) in insights.categories() {
        if items.is_empty() {
            continue;
        }
        let _ = writeln!(out, "  {label}:");
        for item in items {
            let _ = writeln!(out, "    • {item}");
        }
    }
    out
}

pub fn anonymization(report: &AnonymizationReport) -> String {
    format!(
        "Anonymization Info:\n  Current Privacy Level: {}\n  Can Anonymize: {}\n  Status: {}\n",
        report.original_privacy_level, report.anonymization_available, report.message
    )
}
