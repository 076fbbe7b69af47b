//! Title resolution: main section and subsection names for clauses.
//!
//! Titles are rarely printed next to the clause they govern, so they are
//! recovered from nearby text. Subsection lookup is pluggable through
//! [`SubsectionStrategy`]; the pipeline carries the last title it found
//! forward until a new one supersedes it.

use std::borrow::Cow;
use std::cmp::Reverse;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::PageText;

/// Dot leader and everything after it ("Application ........ 12").
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DOT_LEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\.{3,}.*$").expect("valid regex"));

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Position of a clause inside its section text.
#[derive(Debug, Clone, Copy)]
pub struct SubsectionQuery<'a> {
    /// Located section text.
    pub section_text: &'a str,

    /// Byte offset of the clause marker in `section_text`.
    pub offset: usize,
}

impl<'a> SubsectionQuery<'a> {
    /// Lines before the clause marker, nearest first.
    fn preceding_lines(&self) -> impl Iterator<Item = &'a str> {
        self.section_text
            .get(..self.offset)
            .unwrap_or_default()
            .split('\n')
            .rev()
    }
}

/// Strategy for finding the subsection a clause belongs to.
pub trait SubsectionStrategy: fmt::Debug + Send + Sync {
    /// Subsection title in effect at the clause, if one is found.
    fn subsection_name(&self, query: &SubsectionQuery<'_>) -> Option<String>;
}

/// Scans backward for a short standalone line that looks like a heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingScan {
    /// Number of non-blank lines examined before the clause.
    pub window: usize,

    /// Lines containing any of these are never headings.
    pub excluded: Vec<String>,
}

impl HeadingScan {
    /// Create a heading scan excluding URL and release lines plus the
    /// document code (e.g. "CONC").
    #[must_use]
    pub fn new(window: usize, document_code: impl Into<String>) -> Self {
        Self {
            window,
            excluded: vec!["www.".to_string(), "Release".to_string(), document_code.into()],
        }
    }

    /// The cleaned heading, if `line` looks like one.
    fn heading(&self, line: &str) -> Option<String> {
        let length = line.chars().count();
        if !(4..50).contains(&length) {
            return None;
        }
        if !line.chars().next().is_some_and(char::is_uppercase) {
            return None;
        }
        if self.excluded.iter().any(|e| line.contains(e.as_str())) {
            return None;
        }
        if line.chars().take(10).any(|c| c == '.') || line.starts_with('(') {
            return None;
        }
        if line.matches(' ').count() >= 8 {
            return None;
        }

        let cleaned = line.trim_matches(|c: char| c == '.' || c.is_whitespace());
        (cleaned.chars().count() > 3).then(|| cleaned.to_string())
    }
}

impl SubsectionStrategy for HeadingScan {
    fn subsection_name(&self, query: &SubsectionQuery<'_>) -> Option<String> {
        query
            .preceding_lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .take(self.window)
            .find_map(|line| self.heading(line))
    }
}

/// Maps known heading endings to full subsection titles.
///
/// Headings often wrap across lines, so only the tail of a heading is
/// reliably adjacent to the clause. When several keys match a line, the
/// longest key wins and ties go to declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedMapping {
    /// Number of raw lines examined before the clause (blank lines count).
    pub window: usize,

    /// Compare line endings case-sensitively.
    pub case_sensitive: bool,

    /// (line ending, full title) pairs in declaration order.
    pub entries: Vec<(String, String)>,
}

impl FixedMapping {
    /// Create a mapping from (line ending, full title) pairs.
    #[must_use]
    pub fn new(window: usize, case_sensitive: bool, entries: &[(&str, &str)]) -> Self {
        Self {
            window,
            case_sensitive,
            entries: entries
                .iter()
                .map(|(key, title)| ((*key).to_string(), (*title).to_string()))
                .collect(),
        }
    }

    /// Title mapped from the ending of `line`.
    fn lookup(&self, line: &str) -> Option<&str> {
        let line: Cow<'_, str> = if self.case_sensitive {
            Cow::Borrowed(line)
        } else {
            Cow::Owned(line.to_lowercase())
        };

        self.entries
            .iter()
            .enumerate()
            .filter(|(_, (key, _))| {
                if self.case_sensitive {
                    line.ends_with(key.as_str())
                } else {
                    line.ends_with(&key.to_lowercase())
                }
            })
            .max_by_key(|(index, (key, _))| (key.chars().count(), Reverse(*index)))
            .map(|(_, (_, title))| title.as_str())
    }
}

impl SubsectionStrategy for FixedMapping {
    fn subsection_name(&self, query: &SubsectionQuery<'_>) -> Option<String> {
        if query.offset == 0 {
            return None;
        }
        query
            .preceding_lines()
            .take(self.window)
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .find_map(|line| self.lookup(line))
            .map(str::to_string)
    }
}

/// Main section title for a clause number, looked up in the section pages.
///
/// The key is the first two dot components of the number ("7.1" for
/// "7.1.1"); numbers with fewer components have no main section. The title
/// is the rest of the first line starting with the key, without dot leaders,
/// between 3 and 99 characters and not a URL.
///
/// # Examples
/// ```
/// use regclause_extractor::segmentation::main_section_name;
/// use regclause_extractor::types::PageText;
///
/// let pages = vec![PageText::new(90, "7.1 Application ........ 3\n7.1.1 R This chapter")];
/// assert_eq!(main_section_name("7.1.1", &pages, &[90]).as_deref(), Some("Application"));
/// assert_eq!(main_section_name("240", &pages, &[90]), None);
/// ```
#[must_use]
pub fn main_section_name(
    clause_number: &str,
    pages: &[PageText],
    section_pages: &[u32],
) -> Option<String> {
    let parts: Vec<&str> = clause_number.split('.').collect();
    if parts.len() < 2 {
        return None;
    }
    let prefix = format!("{} ", parts[..2].join("."));

    pages
        .iter()
        .filter(|p| section_pages.contains(&p.page_number))
        .flat_map(|p| p.text.lines())
        .map(str::trim)
        .filter_map(|line| line.strip_prefix(prefix.as_str()))
        .find_map(|rest| {
            let title = DOT_LEADER.replace(rest.trim(), "");
            let title = WHITESPACE_RUN.replace_all(title.trim(), " ");
            let length = title.chars().count();
            ((3..100).contains(&length) && !title.starts_with("www")).then(|| title.into_owned())
        })
}
