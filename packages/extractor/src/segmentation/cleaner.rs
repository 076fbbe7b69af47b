//! Page text cleaning: removes running headers, footers and page numbers.
//!
//! Rules are data. Each document family contributes a list of
//! [`LineFilter`]s. A line is dropped if it is blank or any filter matches
//! it; every surviving line is trimmed.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::PageText;

/// Page number lines: bare digits or "Page N".
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PAGE_NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d+|Page\s+\d+)$").expect("valid regex"));

/// A predicate that drops a line when it matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineFilter {
    /// Line starts with the text.
    Prefix(String),

    /// Line contains the text anywhere.
    Contains(String),

    /// Line contains every one of the texts.
    ContainsAll(Vec<String>),

    /// Line contains the text and is shorter than `max_len` characters.
    ContainsShorterThan { needle: String, max_len: usize },

    /// Line is a bare page number shorter than `max_len` characters.
    ShortPageNumber { max_len: usize },

    /// Line equals the text exactly.
    Exact(String),
}

impl LineFilter {
    /// Line starts with `prefix`.
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::Prefix(prefix.into())
    }

    /// Line contains `needle`.
    pub fn contains(needle: impl Into<String>) -> Self {
        Self::Contains(needle.into())
    }

    /// Line equals `text`.
    pub fn exact(text: impl Into<String>) -> Self {
        Self::Exact(text.into())
    }

    /// Whether the filter drops this (already trimmed) line.
    #[must_use]
    pub fn matches(&self, line: &str) -> bool {
        match self {
            Self::Prefix(prefix) => line.starts_with(prefix.as_str()),
            Self::Contains(needle) => line.contains(needle.as_str()),
            Self::ContainsAll(needles) => needles.iter().all(|n| line.contains(n.as_str())),
            Self::ContainsShorterThan { needle, max_len } => {
                line.chars().count() < *max_len && line.contains(needle.as_str())
            }
            Self::ShortPageNumber { max_len } => {
                line.chars().count() < *max_len && PAGE_NUMBER_PATTERN.is_match(line)
            }
            Self::Exact(text) => line == text,
        }
    }
}

/// Header and footer filters for one document family.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageTextCleaner {
    filters: Vec<LineFilter>,
}

impl PageTextCleaner {
    /// Create a cleaner from a list of filters.
    #[must_use]
    pub fn new(filters: Vec<LineFilter>) -> Self {
        Self { filters }
    }

    /// Add a filter.
    #[must_use]
    pub fn with_filter(mut self, filter: LineFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// The configured filters.
    #[must_use]
    pub fn filters(&self) -> &[LineFilter] {
        &self.filters
    }

    /// Clean one page of text.
    ///
    /// # Examples
    /// ```
    /// use regclause_extractor::segmentation::{LineFilter, PageTextCleaner};
    ///
    /// let cleaner = PageTextCleaner::new(vec![LineFilter::prefix("Release")]);
    /// assert_eq!(cleaner.clean("  a firm must\n\nRelease 42\n"), "a firm must");
    /// ```
    #[must_use]
    pub fn clean(&self, text: &str) -> String {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !self.filters.iter().any(|f| f.matches(line)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Clean a page, keeping its number.
    #[must_use]
    pub fn clean_page(&self, page: &PageText) -> PageText {
        PageText::new(page.page_number, self.clean(&page.text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fg21_cleaner() -> PageTextCleaner {
        PageTextCleaner::new(vec![
            LineFilter::prefix("FG21/1 Financial Conduct Authority"),
            LineFilter::ContainsAll(vec![
                "Financial Conduct Authority".to_string(),
                "Chapter".to_string(),
            ]),
            LineFilter::ShortPageNumber { max_len: 15 },
            LineFilter::exact("Pubref:007407"),
        ])
    }

    #[test]
    fn test_drops_headers_and_page_numbers() {
        let page = "FG21/1 Financial Conduct Authority\nChapter 2 Financial Conduct Authority\n2.1 Firms should understand\n17\nPage 18\nPubref:007407";
        assert_eq!(fg21_cleaner().clean(page), "2.1 Firms should understand");
    }

    #[test]
    fn test_keeps_long_numeric_lines() {
        // Not a page number: too long
        let page = "1234567890123456";
        assert_eq!(fg21_cleaner().clean(page), "1234567890123456");
    }

    #[test]
    fn test_contains_shorter_than() {
        let filter = LineFilter::ContainsShorterThan {
            needle: "European Banking Authority".to_string(),
            max_len: 50,
        };
        assert!(filter.matches("European Banking Authority"));
        assert!(!filter.matches(
            "The European Banking Authority published these guidelines on loan origination"
        ));
    }

    #[test]
    fn test_drops_blank_lines_and_trims() {
        let cleaner = PageTextCleaner::default();
        assert_eq!(cleaner.clean("  first\n\n  second  \n"), "first\nsecond");
    }

    #[test]
    fn test_clean_page_keeps_number() {
        let page = PageText::new(12, "17\n2.3 Firms should");
        let cleaned = fg21_cleaner().clean_page(&page);
        assert_eq!(cleaned, PageText::new(12, "2.3 Firms should"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(fg21_cleaner().clean(""), "");
    }

    #[test]
    fn test_prefix_only_at_line_start() {
        let cleaner = PageTextCleaner::default().with_filter(LineFilter::prefix("Release"));
        assert_eq!(cleaner.clean("Release 12 Jan 2024\nNew Release notes"), "New Release notes");
        assert_eq!(cleaner.filters().len(), 1);
    }
}
