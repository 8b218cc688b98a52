//! Top-level section segmentation.
//!
//! The body is cut at level 1–2 headings. Deeper headings belong to the enclosing section and
//! are kept verbatim so the sub-block splitter can work on them later.

use crate::constants::SECTION_HEADING_MAX_LEVEL;
use regex::Regex;
use std::sync::LazyLock;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("valid heading pattern"));

/// A named span of body text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub body: String,
}

/// Ordered sections of a document, unique by normalized name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sections {
    entries: Vec<Section>,
}

impl Sections {
    /// Insert a section, replacing the body of an existing section with the same name.
    ///
    /// The replaced entry keeps its original position.
    fn insert(&mut self, name: String, body: String) {
        match self.entries.iter_mut().find(|s| s.name == name) {
            Some(existing) => {
                tracing::debug!("section '{}' redefined; later body wins", name);
                existing.body = body;
            }
            None => self.entries.push(Section { name, body }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.body.as_str())
    }

    /// First present section among `names`.
    pub fn first_of(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|name| self.get(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|s| s.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Normalize a heading title into a section key.
///
/// Lower-cases the title and replaces spaces with underscores. Punctuation is preserved, so
/// `Allergies & Intolerances` becomes `allergies_&_intolerances`.
pub fn section_key(title: &str) -> String {
    title.trim_end().to_lowercase().replace(' ', "_")
}

/// If `line` is a markdown heading, return its level and title.
pub(crate) fn heading(line: &str) -> Option<(usize, &str)> {
    let caps = HEADING.captures(line)?;
    let level = caps.get(1)?.as_str().len();
    let title = caps.get(2)?.as_str().trim_end();
    if title.is_empty() {
        return None;
    }
    Some((level, title))
}

/// Split a document body into its top-level sections.
///
/// Content before the first section heading is discarded.
pub fn segment_sections(body: &str) -> Sections {
    let mut sections = Sections::default();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in body.lines() {
        if let Some((level, title)) = heading(line) {
            if level <= SECTION_HEADING_MAX_LEVEL {
                if let Some((name, lines)) = current.take() {
                    sections.insert(name, lines.join("\n"));
                }
                current = Some((section_key(title), Vec::new()));
                continue;
            }
        }

        if let Some((_, lines)) = current.as_mut() {
            lines.push(line);
        }
    }

    if let Some((name, lines)) = current {
        sections.insert(name, lines.join("\n"));
    }

    sections
}
