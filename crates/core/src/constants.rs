//! Constants used throughout the health-md core crate.
//!
//! Section keys, windows and limits live here so the parser, the summarizer and the
//! validation collaborator agree on them.

/// Bare delimiter line that opens and closes the metadata block.
pub const FRONT_MATTER_DELIMITER: &str = "---";

/// Deepest heading level that starts a new top-level section.
pub const SECTION_HEADING_MAX_LEVEL: usize = 2;

/// Heading level that introduces a sub-block within a section.
pub const SUB_HEADING_LEVEL: usize = 3;

/// Section key for patient demographics.
pub const DEMOGRAPHICS_SECTION: &str = "demographics";

/// Section key for the current medication list.
pub const MEDICATIONS_SECTION: &str = "current_medications";

/// Section key for laboratory results.
pub const LAB_RESULTS_SECTION: &str = "lab_results";

/// Section key for vital sign readings.
pub const VITAL_SIGNS_SECTION: &str = "vital_signs";

/// Section key for the clinical timeline.
pub const CLINICAL_TIMELINE_SECTION: &str = "clinical_timeline";

/// Section key for allergies, in the order they are looked up.
pub const ALLERGY_SECTIONS: [&str; 2] = ["allergies_&_intolerances", "allergies"];

/// Section key for past and ongoing conditions.
pub const MEDICAL_HISTORY_SECTION: &str = "medical_history";

/// Metadata key holding the document's privacy level.
pub const PRIVACY_LEVEL_KEY: &str = "privacy_level";

/// Metadata key holding the format version.
pub const VERSION_KEY: &str = "version";

/// Privacy level reported when the metadata does not declare one.
pub const UNKNOWN_PRIVACY_LEVEL: &str = "unknown";

/// Privacy level for which anonymization has nothing left to do.
pub const ANONYMOUS_PRIVACY_LEVEL: &str = "anonymous";

/// Recency window applied by the context digest, in days.
pub const DIGEST_WINDOW_DAYS: u32 = 90;

/// Maximum number of lab results listed in the context digest.
pub const DIGEST_MAX_LABS: usize = 5;

/// Maximum number of visits listed in the context digest.
pub const DIGEST_MAX_VISITS: usize = 3;

/// Suffix appended to a truncated digest.
pub const DIGEST_ELLIPSIS: &str = "...";

/// Default digest length limit, in characters.
pub const DEFAULT_DIGEST_MAX_LENGTH: usize = 4000;

/// Default lab recency window for the CLI, in days.
pub const DEFAULT_LAB_WINDOW_DAYS: u32 = 90;

/// Default timeline recency window for the CLI, in days.
pub const DEFAULT_TIMELINE_WINDOW_DAYS: u32 = 365;

/// Lab lookback used when deriving insights, in days.
pub const INSIGHT_LAB_WINDOW_DAYS: u32 = 180;
