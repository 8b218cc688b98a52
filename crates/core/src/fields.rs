//! Labeled field extraction.
//!
//! Field lines look like `- **Dosage:** 10mg daily`: an optional bullet, optional emphasis
//! around the label, an optional colon and the value. A [`FieldTable`] compiles one matcher per label and
//! returns the first matching value for each field in a block.

use regex::Regex;
use std::collections::BTreeMap;

/// Build the matcher for a field line whose label is the regex fragment `label`.
///
/// The value is captured in the `value` group. Emphasis is one or two `*` or `_` characters
/// and may sit on either side of the colon. The label must be followed by a colon or
/// whitespace, so `Plan` does not match `Planned`.
pub(crate) fn field_line_pattern(label: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"(?i)^\s*(?:[-*+]\s+)?(?:[*_]{{1,2}})?(?:{label})(?:[*_]{{1,2}})?(?:\s*:|\s)\s*(?:[*_]{{1,2}})?\s*(?P<value>.+)$"
    ))
}

/// Trimmed value of a field line capture, or `None` if nothing but emphasis remains.
pub(crate) fn captured_value(raw: &str) -> Option<String> {
    let value = raw.trim();
    if value.chars().all(|c| c == '*' || c == '_') {
        return None;
    }
    Some(value.to_string())
}

/// Field values extracted from one block, keyed by field name.
///
/// Only matched fields are present; an absent key means the label was not found.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldValues(BTreeMap<&'static str, String>);

impl FieldValues {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Remove and return a field value.
    pub fn take(&mut self, field: &str) -> Option<String> {
        self.0.remove(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A table of (field name, compiled matcher) pairs.
#[derive(Clone, Debug)]
pub struct FieldTable {
    entries: Vec<FieldMatcher>,
}

#[derive(Clone, Debug)]
struct FieldMatcher {
    name: &'static str,
    label_len: usize,
    pattern: Regex,
}

impl FieldTable {
    /// Compile a table from `(field_name, label)` pairs.
    ///
    /// Labels are matched literally and case-insensitively. When several labels match the
    /// same line (`Age` and `Age Range`), the line belongs to the longest one.
    ///
    /// # Errors
    ///
    /// Returns the underlying `regex::Error` if a matcher fails to compile.
    pub fn new(fields: &[(&'static str, &str)]) -> Result<Self, regex::Error> {
        let entries = fields
            .iter()
            .map(|(name, label)| {
                Ok(FieldMatcher {
                    name: *name,
                    label_len: label.chars().count(),
                    pattern: field_line_pattern(&regex::escape(label))?,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { entries })
    }

    /// Field names in table order.
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }

    /// Extract the first matching value for every field in the table.
    ///
    /// Lines are scanned in order; later lines matching an already-found label are ignored.
    pub fn extract(&self, block: &str) -> FieldValues {
        let mut values = BTreeMap::new();

        for line in block.lines() {
            let Some((entry, caps)) = self
                .entries
                .iter()
                .filter_map(|entry| Some((entry, entry.pattern.captures(line)?)))
                .max_by_key(|(entry, _)| entry.label_len)
            else {
                continue;
            };
            if values.contains_key(entry.name) {
                continue;
            }
            if let Some(value) = caps.name("value").and_then(|m| captured_value(m.as_str())) {
                values.insert(entry.name, value);
            }
        }

        FieldValues(values)
    }
}
