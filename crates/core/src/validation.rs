//! Document validation.
//!
//! Parsing is lenient and never fails. Validation applies the stricter rules: a document must
//! have a readable metadata block (if it has one at all) and at least one section. Softer
//! problems are returned as warnings on an otherwise valid report.

use crate::constants::{DEMOGRAPHICS_SECTION, PRIVACY_LEVEL_KEY};
use crate::frontmatter::{split_front_matter, MetadataStatus};
use crate::sections::segment_sections;
use serde::Serialize;

/// Reasons a document is rejected outright.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("document is empty")]
    Empty,
    #[error("malformed front matter: {0}")]
    MalformedMetadata(String),
    #[error("document has no sections")]
    NoSections,
}

/// Outcome of validating a structurally acceptable document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub version: Option<String>,
    pub privacy_level: String,
    pub warnings: Vec<String>,
    pub sections_found: Vec<String>,
}

/// Validate raw document text.
///
/// # Arguments
///
/// * `content` - Raw document text, metadata block included.
///
/// # Returns
///
/// A [`ValidationReport`] listing the sections found and any warnings.
///
/// # Errors
///
/// Returns a [`ValidationError`] if the document is blank, its metadata block does not parse
/// as a YAML mapping, or it contains no sections.
pub fn validate(content: &str) -> Result<ValidationReport, ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::Empty);
    }

    let front = split_front_matter(content);
    let mut warnings = Vec::new();

    match &front.status {
        MetadataStatus::Malformed(reason) => {
            return Err(ValidationError::MalformedMetadata(reason.clone()));
        }
        MetadataStatus::Absent => warnings.push("no front matter block found".to_string()),
        MetadataStatus::Parsed => {}
    }

    let sections = segment_sections(front.body);
    if sections.is_empty() {
        return Err(ValidationError::NoSections);
    }

    let version = front.metadata.version();
    if front.status == MetadataStatus::Parsed {
        if version.is_none() {
            warnings.push("front matter does not declare a version".to_string());
        }
        if front.metadata.get_text(PRIVACY_LEVEL_KEY).is_none() {
            warnings.push("front matter does not declare a privacy_level".to_string());
        }
    }
    if sections.get(DEMOGRAPHICS_SECTION).is_none() {
        warnings.push("no demographics section".to_string());
    }

    Ok(ValidationReport {
        valid: true,
        version,
        privacy_level: front.metadata.privacy_level(),
        warnings,
        sections_found: sections.names().map(str::to_string).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_document_has_no_warnings() {
        let doc = "---\nversion: \"1.0\"\nprivacy_level: identified\n---\n## Demographics\n- Age: 40\n## Notes\n";
        let report = validate(doc).expect("valid document");

        assert!(report.valid);
        assert_eq!(report.version.as_deref(), Some("1.0"));
        assert_eq!(report.privacy_level, "identified");
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
        assert_eq!(report.sections_found, vec!["demographics", "notes"]);
    }

    #[test]
    fn missing_front_matter_is_a_warning() {
        let report = validate("## Demographics\n- Age: 40").expect("valid document");
        assert_eq!(report.privacy_level, "unknown");
        assert_eq!(report.warnings, vec!["no front matter block found".to_string()]);
    }

    #[test]
    fn missing_metadata_keys_and_demographics_are_warnings() {
        let report = validate("---\nauthor: someone\n---\n## Medications\n").expect("valid");
        assert_eq!(report.warnings.len(), 3);
    }

    #[test]
    fn empty_document_is_rejected() {
        assert_eq!(validate("  \n"), Err(ValidationError::Empty));
    }

    #[test]
    fn malformed_front_matter_is_rejected() {
        let err = validate("---\n- just\n- a list\n---\n## Notes\n").expect_err("malformed");
        assert!(matches!(err, ValidationError::MalformedMetadata(_)));
    }

    #[test]
    fn document_without_sections_is_rejected() {
        assert_eq!(
            validate("---\nversion: 1\n---\njust prose"),
            Err(ValidationError::NoSections)
        );
    }
}
