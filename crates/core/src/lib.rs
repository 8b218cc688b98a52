//! # Health.md Core
//!
//! Parsing engine for Health.md clinical documents.
//!
//! This crate turns a semi-structured document (an optional YAML front matter block followed
//! by a heading-delimited markdown body) into an immutable [`HealthRecord`], and renders a
//! bounded plain-text digest of it for language model context:
//! - front matter splitting and section segmentation
//! - labeled field extraction and sub-block splitting for repeated entities
//! - free-text date normalization against an explicit reference instant
//! - validation, insights and JSON/FHIR export built on top of the record
//!
//! **No I/O**: reading files, choosing the reference instant and presenting results belong to
//! the `health-md` binary.

pub mod anonymize;
pub mod blocks;
pub mod config;
pub mod constants;
pub mod dates;
pub mod entities;
pub mod error;
pub mod export;
mod extract;
pub mod fields;
pub mod frontmatter;
pub mod insights;
pub mod record;
pub mod sections;
mod summary;
pub mod validation;

pub use config::CoreConfig;
pub use entities::{
    AllergyGroups, ClinicalEvent, Condition, Demographics, LabResult, Medication, Trend, VitalSign,
};
pub use error::{HealthMdError, HealthMdResult};
pub use frontmatter::{DocumentMetadata, MetadataStatus};
pub use record::HealthRecord;
pub use validation::{validate, ValidationError, ValidationReport};
