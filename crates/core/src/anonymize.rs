//! Anonymization status.
//!
//! Anonymization itself is not implemented; this reports whether it would apply.

use crate::constants::ANONYMOUS_PRIVACY_LEVEL;
use crate::record::HealthRecord;
use serde::Serialize;

/// Shown in place of an anonymized record.
pub const ANONYMIZATION_UNAVAILABLE: &str = "Anonymization is not yet available";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnonymizationReport {
    pub original_privacy_level: String,
    pub anonymization_available: bool,
    pub message: &'static str,
}

/// Report whether a record could be anonymized.
///
/// Records already declared `anonymous` have nothing to anonymize.
pub fn anonymization_report(record: &HealthRecord) -> AnonymizationReport {
    let privacy_level = record.privacy_level();
    AnonymizationReport {
        anonymization_available: privacy_level != ANONYMOUS_PRIVACY_LEVEL,
        original_privacy_level: privacy_level,
        message: ANONYMIZATION_UNAVAILABLE,
    }
}
