//! Metadata block splitting.
//!
//! A document may open with a YAML block fenced by two bare `---` lines. Everything after the
//! second fence is the body. Fewer than two fences means there is no metadata at all; a lone
//! `---` (for example a horizontal rule) is never treated as a degenerate block.

use crate::constants::{
    FRONT_MATTER_DELIMITER, PRIVACY_LEVEL_KEY, UNKNOWN_PRIVACY_LEVEL, VERSION_KEY,
};
use serde::Serialize;

/// Parsed document metadata.
///
/// Wraps the YAML mapping from the front matter. Values may be arbitrarily nested; lookups by
/// string key cover the common case.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DocumentMetadata(serde_yaml::Mapping);

impl DocumentMetadata {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up a top-level value by key.
    pub fn get(&self, key: &str) -> Option<&serde_yaml::Value> {
        self.0.get(key)
    }

    /// Look up a top-level value and render scalars as text.
    ///
    /// Strings are returned as-is; numbers and booleans are formatted. Sequences, mappings and
    /// null yield `None`.
    pub fn get_text(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            serde_yaml::Value::String(s) => Some(s.clone()),
            serde_yaml::Value::Number(n) => Some(n.to_string()),
            serde_yaml::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// The declared privacy level, or `"unknown"`.
    pub fn privacy_level(&self) -> String {
        self.get_text(PRIVACY_LEVEL_KEY)
            .unwrap_or_else(|| UNKNOWN_PRIVACY_LEVEL.to_string())
    }

    /// The declared format version, if any.
    pub fn version(&self) -> Option<String> {
        self.get_text(VERSION_KEY)
    }
}

/// Outcome of reading the metadata block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MetadataStatus {
    /// Fewer than two delimiter lines; the whole input is body.
    Absent,
    /// The block parsed into a mapping (possibly an empty one).
    Parsed,
    /// The block was present but not a valid YAML mapping; metadata fell back to empty.
    Malformed(String),
}

/// A document split into metadata and body.
#[derive(Clone, Debug)]
pub struct FrontMatter<'a> {
    pub metadata: DocumentMetadata,
    pub body: &'a str,
    pub status: MetadataStatus,
}

/// Split raw document text into metadata and body.
///
/// Never fails: malformed metadata is reported through [`MetadataStatus::Malformed`] and the
/// body is still returned.
pub fn split_front_matter(input: &str) -> FrontMatter<'_> {
    let Some((front, body)) = find_fenced_block(input) else {
        return FrontMatter {
            metadata: DocumentMetadata::default(),
            body: input,
            status: MetadataStatus::Absent,
        };
    };

    let (metadata, status) = parse_metadata(front);
    FrontMatter {
        metadata,
        body,
        status,
    }
}

fn parse_metadata(front: &str) -> (DocumentMetadata, MetadataStatus) {
    if front.trim().is_empty() {
        return (DocumentMetadata::default(), MetadataStatus::Parsed);
    }

    match serde_yaml::from_str::<serde_yaml::Value>(front) {
        Ok(serde_yaml::Value::Mapping(mapping)) => {
            (DocumentMetadata(mapping), MetadataStatus::Parsed)
        }
        Ok(serde_yaml::Value::Null) => (DocumentMetadata::default(), MetadataStatus::Parsed),
        Ok(_) => {
            tracing::warn!("front matter is not a YAML mapping; using empty metadata");
            (
                DocumentMetadata::default(),
                MetadataStatus::Malformed("front matter must be a YAML mapping".into()),
            )
        }
        Err(e) => {
            tracing::warn!("failed to parse front matter: {}", e);
            (
                DocumentMetadata::default(),
                MetadataStatus::Malformed(e.to_string()),
            )
        }
    }
}

/// Locate the text between the first two delimiter lines and the text after the second.
///
/// Returns slices into the original input.
fn find_fenced_block(input: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    let mut front_start = None;

    for chunk in input.split_inclusive('\n') {
        let line = chunk.trim_end_matches(['\n', '\r']).trim_end();
        let next = offset + chunk.len();

        if line == FRONT_MATTER_DELIMITER {
            match front_start {
                None => front_start = Some(next),
                Some(start) => return Some((&input[start..offset], &input[next..])),
            }
        }

        offset = next;
    }

    None
}
