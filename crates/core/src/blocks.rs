//! Sub-block splitting for repeated entities.
//!
//! Within a section, each `### ` heading opens a sub-block that runs until the next one. The
//! heading title is matched against a caller-supplied pattern:
//!
//! - single-capture (`N = 1`): the one group is the entity name, e.g. `### Metformin`
//! - dual-capture (`N = 2`): two groups carry a title and a date, e.g.
//!   `### Blood Pressure (2024-03-15)` or `### 2024-03-15: Annual Physical`
//!
//! A heading whose title does not yield exactly `N` non-empty groups is skipped on its own; the
//! rest of the section is unaffected.

use crate::constants::SUB_HEADING_LEVEL;
use crate::sections::heading;
use regex::Regex;
use std::sync::LazyLock;

/// `Name`: the whole title is the entity name.
pub static NAMED_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)$").expect("valid named heading pattern"));

/// `Title (qualifier)`: a title followed by a parenthetical, usually a date.
pub static PARENTHETICAL_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)\s*\(([^()]+)\)$").expect("valid parenthetical heading pattern")
});

/// `prefix: Title`: a date (or other prefix) before a colon, then the title.
pub static PREFIXED_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^:]+):\s*(.+)$").expect("valid prefixed heading pattern")
});

/// One repeated entity within a section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubBlock<'a, const N: usize> {
    /// Trimmed capture groups from the heading title, in pattern order.
    pub captures: [String; N],
    /// Lines between this heading and the next sub-heading.
    pub body: &'a str,
}

/// Split a section body into sub-blocks whose headings match `pattern` with `N` groups.
///
/// Content before the first sub-heading is discarded. Zero sub-blocks is a valid result.
pub fn split_sub_blocks<'a, const N: usize>(
    section: &'a str,
    pattern: &Regex,
) -> Vec<SubBlock<'a, N>> {
    let mut blocks = Vec::new();

    for (title, body) in raw_sub_blocks(section) {
        match heading_captures::<N>(title, pattern) {
            Some(captures) => blocks.push(SubBlock { captures, body }),
            None => tracing::debug!(
                "skipping sub-block '{}': heading does not match expected {}-capture form",
                title,
                N
            ),
        }
    }

    blocks
}

fn heading_captures<const N: usize>(title: &str, pattern: &Regex) -> Option<[String; N]> {
    let caps = pattern.captures(title)?;
    if caps.len() != N + 1 {
        return None;
    }

    let groups: Vec<String> = caps
        .iter()
        .skip(1)
        .map(|group| group.map(|m| m.as_str().trim().to_string()))
        .collect::<Option<Vec<_>>>()?;

    if groups.iter().any(String::is_empty) {
        return None;
    }

    groups.try_into().ok()
}

/// Split a section into `(heading title, body)` pairs at sub-heading lines.
fn raw_sub_blocks(section: &str) -> Vec<(&str, &str)> {
    let mut blocks = Vec::new();
    let mut current: Option<(&str, usize)> = None;
    let mut offset = 0;

    for chunk in section.split_inclusive('\n') {
        let line = chunk.trim_end_matches(['\n', '\r']);

        if let Some((SUB_HEADING_LEVEL, title)) = heading(line) {
            if let Some((prev_title, start)) = current.take() {
                blocks.push((prev_title, trim_block(&section[start..offset])));
            }
            current = Some((title, offset + chunk.len()));
        }

        offset += chunk.len();
    }

    if let Some((title, start)) = current {
        blocks.push((title, trim_block(&section[start..])));
    }

    blocks
}

fn trim_block(body: &str) -> &str {
    body.trim_end_matches(['\n', '\r'])
}
