//! Clause segmentation of located section text.
//!
//! Markers and terminators are found as line-start matches. Each clause runs
//! from the end of its marker to the next boundary (marker or terminator), so
//! clauses never overlap and their order follows the text.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::grammar::{ClauseGrammar, ContentCleaning};
use crate::error::Result;
use crate::types::ClauseType;

/// Three or more line breaks, possibly with whitespace between them.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static EXCESS_BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n\s*\n").expect("valid regex"));

/// Lines made only of dots, dashes and whitespace.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PUNCTUATION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[.\-\s]+$").expect("valid regex"));

/// A clause as cut from section text, before titles and pages are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawClause {
    /// Clause number without type suffix ("5.2A.1", "240").
    pub number: String,

    /// Full clause id ("5.2A.1 R", "240").
    pub clause_id: String,

    /// Type from the marker letter, or the grammar default.
    pub clause_type: ClauseType,

    /// Cleaned clause text, never empty.
    pub content: String,

    /// Byte offset of the marker in the section text.
    pub offset: usize,
}

/// A marker occurrence in section text.
struct Marker<'t> {
    start: usize,
    end: usize,
    number: &'t str,
    kind: Option<&'t str>,
}

/// Splits section text into clauses according to a grammar.
#[derive(Debug, Clone, Copy)]
pub struct ClauseSegmenter<'a> {
    grammar: &'a ClauseGrammar,
}

impl<'a> ClauseSegmenter<'a> {
    /// Create a segmenter for a grammar.
    #[must_use]
    pub fn new(grammar: &'a ClauseGrammar) -> Self {
        Self { grammar }
    }

    /// Segment section text into clauses.
    ///
    /// Text before the first marker and after a terminator is discarded. A
    /// repeated clause number within the section is not a boundary: its text
    /// stays with the clause before it. Clauses whose cleaned content is
    /// empty are dropped.
    pub fn segment(&self, section_text: &str, section_id: &str) -> Result<Vec<RawClause>> {
        if self.grammar.is_appendix(section_id) {
            return Ok(self.appendix_clause(section_text, section_id).into_iter().collect());
        }

        let marker_pattern = self.grammar.marker_pattern(section_id)?;
        let terminators = self.grammar.terminator_patterns(section_id)?;

        let mut seen = HashSet::new();
        let markers: Vec<Marker<'_>> = marker_pattern
            .captures_iter(section_text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let number = caps.name("number")?.as_str();
                let kind = caps.name("kind").map(|k| k.as_str());
                seen.insert((number, kind)).then_some(Marker {
                    start: whole.start(),
                    end: whole.end(),
                    number,
                    kind,
                })
            })
            .collect();

        let mut boundaries: Vec<usize> = markers.iter().map(|m| m.start).collect();
        for terminator in &terminators {
            boundaries.extend(terminator.find_iter(section_text).map(|m| m.start()));
        }
        boundaries.sort_unstable();
        boundaries.dedup();

        let mut clauses = Vec::with_capacity(markers.len());
        for marker in &markers {
            let next = boundaries
                .iter()
                .copied()
                .find(|&b| b > marker.start)
                .unwrap_or(section_text.len());
            let body = section_text.get(marker.end..next).unwrap_or_default();
            let content = self.clean(body);
            if content.is_empty() {
                continue;
            }

            let clause_type = match marker.kind {
                Some(letter) => ClauseType::from_marker(letter),
                None => self.grammar.default_type,
            };
            clauses.push(RawClause {
                number: marker.number.to_string(),
                clause_id: self.grammar.clause_id(marker.number, marker.kind),
                clause_type,
                content,
                offset: marker.start,
            });
        }

        Ok(clauses)
    }

    /// A section without internal numbering becomes one clause.
    fn appendix_clause(&self, section_text: &str, section_id: &str) -> Option<RawClause> {
        let content = self.clean(section_text);
        if content.is_empty() {
            return None;
        }
        Some(RawClause {
            number: section_id.to_string(),
            clause_id: format!("{section_id} {}", self.grammar.default_type.as_str()),
            clause_type: self.grammar.default_type,
            content,
            offset: 0,
        })
    }

    fn clean(&self, body: &str) -> String {
        match self.grammar.cleaning {
            ContentCleaning::TrimLines => trim_lines(body),
            ContentCleaning::DropNoise => drop_noise(body),
        }
    }
}

/// Trim each line and the whole text.
fn trim_lines(text: &str) -> String {
    text.trim()
        .split('\n')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Drop blank, very short, numeric and punctuation-only lines.
fn drop_noise(text: &str) -> String {
    let kept = text
        .split('\n')
        .map(str::trim)
        .filter(|line| {
            !line.is_empty()
                && line.chars().count() >= 3
                && !line.chars().all(|c| c.is_ascii_digit())
                && !PUNCTUATION_LINE.is_match(line)
        })
        .collect::<Vec<_>>()
        .join("\n");
    EXCESS_BLANK_LINES.replace_all(&kept, "\n\n").trim().to_string()
}
