//! Declarative grammar for one document family.
//!
//! A grammar describes how sections start and end and how clause markers are
//! numbered. New document families are added by writing a new grammar, not by
//! branching in the locator or segmenter.

use regex::{Regex, RegexBuilder};

use crate::error::Result;
use crate::types::{ClauseType, PageText};

/// Placeholder replaced by the number following the section id.
pub const NEXT_SECTION_PLACEHOLDER: &str = "{next}";

/// How the first line of a section is recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartRule {
    /// `<id> <title>` at line start.
    Titled,

    /// `<id>` with an optional trailing dot, then `<title>`.
    TitledOptionalDot,

    /// `Chapter <id>` or `<id> <title>`; `Appendix <n>` for appendix ids.
    Chapter,
}

/// How the end of a section is recognized on the pages after its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndRule {
    /// A short numbered heading that is not a sub-part of the section.
    Heading,

    /// The next chapter, or any appendix heading.
    NextChapter,

    /// The next numbered section (`N+1.`).
    NextSection,
}

/// Guard that rejects table-of-contents hits for a section start.
///
/// A start match is accepted only on a page at or after `min_page`, or on a
/// page containing `marker`. The threshold is tied to the pagination of one
/// edition of the document and may misfire on other editions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocGuard {
    /// Section the guard applies to.
    pub section_id: String,

    /// First page where the real section may start.
    pub min_page: u32,

    /// Text that only occurs inside the real section.
    pub marker: String,
}

impl TocGuard {
    /// Create a new guard.
    #[must_use]
    pub fn new(section_id: impl Into<String>, min_page: u32, marker: impl Into<String>) -> Self {
        Self {
            section_id: section_id.into(),
            min_page,
            marker: marker.into(),
        }
    }

    /// Whether a start match on this page may be taken as the real start.
    #[must_use]
    pub fn accepts(&self, page: &PageText) -> bool {
        page.page_number >= self.min_page || page.text.contains(&self.marker)
    }
}

/// Section boundary rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRules {
    /// Start-of-section rule.
    pub start: StartRule,

    /// End-of-section rule.
    pub end: EndRule,

    /// Fixed start patterns (section id, regex) replacing the start rule.
    pub anchors: Vec<(String, String)>,

    /// Table-of-contents guards.
    pub toc_guards: Vec<TocGuard>,

    /// Sections that only end at the next top-level number (e.g. "7" ends at "8").
    pub run_to_next_top_level: Vec<String>,

    /// Prefix of appendix section ids (e.g. "Appendix" in "Appendix1").
    pub appendix_prefix: String,
}

impl SectionRules {
    /// Create rules with no anchors or guards.
    #[must_use]
    pub fn new(start: StartRule, end: EndRule) -> Self {
        Self {
            start,
            end,
            anchors: Vec::new(),
            toc_guards: Vec::new(),
            run_to_next_top_level: Vec::new(),
            appendix_prefix: "Appendix".to_string(),
        }
    }

    /// Add a fixed start pattern for a section.
    #[must_use]
    pub fn with_anchor(mut self, section_id: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.anchors.push((section_id.into(), pattern.into()));
        self
    }

    /// Add a table-of-contents guard.
    #[must_use]
    pub fn with_toc_guard(mut self, guard: TocGuard) -> Self {
        self.toc_guards.push(guard);
        self
    }

    /// Let a section run until the next top-level number.
    #[must_use]
    pub fn with_run_to_next_top_level(mut self, section_id: impl Into<String>) -> Self {
        self.run_to_next_top_level.push(section_id.into());
        self
    }

    /// Guard for a section, if any.
    #[must_use]
    pub fn toc_guard(&self, section_id: &str) -> Option<&TocGuard> {
        self.toc_guards.iter().find(|g| g.section_id == section_id)
    }

    /// Appendix number of a section id ("Appendix2" gives "2").
    #[must_use]
    pub fn appendix_number<'a>(&self, section_id: &'a str) -> Option<&'a str> {
        section_id
            .strip_prefix(self.appendix_prefix.as_str())
            .map(str::trim)
    }

    /// Build the start pattern for a section.
    pub fn start_pattern(&self, section_id: &str, section_title: &str) -> Result<Regex> {
        if let Some((_, anchor)) = self.anchors.iter().find(|(id, _)| id == section_id) {
            return build_pattern(anchor);
        }

        let id = regex::escape(section_id);
        let title = regex::escape(section_title);
        let pattern = match self.start {
            StartRule::Titled => format!(r"^\s*{id}\s+{title}"),
            StartRule::TitledOptionalDot => format!(r"^{id}\.?\s+{title}"),
            StartRule::Chapter => match self.appendix_number(section_id) {
                Some(n) => format!(r"^{}\s+{}\b", regex::escape(&self.appendix_prefix), regex::escape(n)),
                None => format!(r"^(?:Chapter\s+{id}\b|{id}\s+{title})"),
            },
        };
        build_pattern(&pattern)
    }

    /// Build the fixed end pattern for a section.
    ///
    /// Returns `None` for the heading rule, which is evaluated against the
    /// section id instead of a fixed pattern, and for sections with no
    /// numeric successor under the next-section rule.
    pub fn end_pattern(&self, section_id: &str) -> Result<Option<Regex>> {
        let appendix = regex::escape(&self.appendix_prefix);
        let pattern = match self.end {
            EndRule::Heading => return Ok(None),
            EndRule::NextChapter => {
                if self.appendix_number(section_id).is_some() {
                    format!(r"^{appendix}\s+\d+")
                } else if let Some(next) = next_number(section_id) {
                    format!(r"^(?:Chapter\s+{next}\b|{next}\s+|{appendix}\b)")
                } else {
                    format!(r"^{appendix}\b")
                }
            }
            EndRule::NextSection => match next_number(section_id) {
                Some(next) => format!(r"^{next}\.?\s+"),
                None => return Ok(None),
            },
        };
        build_pattern(&pattern).map(Some)
    }
}

/// How clause markers are numbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Numbering {
    /// `<section>(.<n>[A-Z]?)* <R|G>`: a type letter follows the number.
    Typed,

    /// Bare paragraph numbers with a trailing dot (`240.`), within a digit window.
    Paragraph { min_digits: usize, max_digits: usize },

    /// `<chapter>.<n>` with no type letter.
    Dotted,
}

/// Content cleaning applied to each clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentCleaning {
    /// Trim every line and the whole text, keep everything else.
    TrimLines,

    /// Also drop blank, very short, numeric and punctuation-only lines.
    DropNoise,
}

/// Clause numbering grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClauseGrammar {
    /// Marker numbering scheme.
    pub numbering: Numbering,

    /// Type of clauses whose marker carries no type letter.
    pub default_type: ClauseType,

    /// Append the default type letter to the clause id (e.g. "1.1 G").
    pub suffix_default_type: bool,

    /// Line-start patterns that close a clause without opening a new one.
    /// [`NEXT_SECTION_PLACEHOLDER`] is replaced with the next section number.
    pub terminators: Vec<String>,

    /// Content cleaning.
    pub cleaning: ContentCleaning,

    /// Section ids with this prefix are emitted as a single clause.
    pub appendix_prefix: Option<String>,
}

impl ClauseGrammar {
    /// Create a grammar with no terminators.
    #[must_use]
    pub fn new(numbering: Numbering, default_type: ClauseType) -> Self {
        Self {
            numbering,
            default_type,
            suffix_default_type: false,
            terminators: Vec::new(),
            cleaning: ContentCleaning::TrimLines,
            appendix_prefix: None,
        }
    }

    /// Append the default type letter to clause ids.
    #[must_use]
    pub fn with_type_suffix(mut self) -> Self {
        self.suffix_default_type = true;
        self
    }

    /// Add terminator patterns.
    #[must_use]
    pub fn with_terminators(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.terminators.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Set the content cleaning.
    #[must_use]
    pub fn with_cleaning(mut self, cleaning: ContentCleaning) -> Self {
        self.cleaning = cleaning;
        self
    }

    /// Emit sections with this id prefix as one clause.
    #[must_use]
    pub fn with_appendix_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.appendix_prefix = Some(prefix.into());
        self
    }

    /// Whether a section is appendix-style (no internal numbering).
    #[must_use]
    pub fn is_appendix(&self, section_id: &str) -> bool {
        self.appendix_prefix
            .as_deref()
            .is_some_and(|prefix| section_id.starts_with(prefix))
    }

    /// Build the clause marker pattern.
    ///
    /// Captures `number` and, for typed numbering, `kind`.
    pub fn marker_pattern(&self, section_id: &str) -> Result<Regex> {
        let id = regex::escape(section_id);
        let pattern = match self.numbering {
            Numbering::Typed => {
                format!(r"^\s*(?P<number>{id}(?:\.\d+[A-Z]?)*)\s+(?P<kind>[RG])\s+")
            }
            Numbering::Paragraph {
                min_digits,
                max_digits,
            } => format!(r"^(?P<number>\d{{{min_digits},{max_digits}}})\.\s+"),
            Numbering::Dotted => format!(r"^(?P<number>{id}\.\d+)\s+"),
        };
        // Markers are matched case-sensitively: "r"/"g" are not type letters.
        Ok(RegexBuilder::new(&pattern).multi_line(true).build()?)
    }

    /// Build the terminator patterns for a section.
    pub fn terminator_patterns(&self, section_id: &str) -> Result<Vec<Regex>> {
        let next = next_number(section_id);
        let mut patterns = Vec::with_capacity(self.terminators.len());
        for template in &self.terminators {
            let pattern = if template.contains(NEXT_SECTION_PLACEHOLDER) {
                match &next {
                    Some(n) => template.replace(NEXT_SECTION_PLACEHOLDER, n),
                    None => continue,
                }
            } else {
                template.clone()
            };
            patterns.push(RegexBuilder::new(&pattern).multi_line(true).build()?);
        }
        Ok(patterns)
    }

    /// Compose the clause id for a marker.
    #[must_use]
    pub fn clause_id(&self, number: &str, kind: Option<&str>) -> String {
        match kind {
            Some(kind) => format!("{number} {kind}"),
            None if self.suffix_default_type => format!("{number} {}", self.default_type.as_str()),
            None => number.to_string(),
        }
    }
}

/// Build a case-insensitive, multi-line pattern.
fn build_pattern(pattern: &str) -> Result<Regex> {
    Ok(RegexBuilder::new(pattern)
        .case_insensitive(true)
        .multi_line(true)
        .build()?)
}

/// The number following a purely numeric section id ("8" gives "9").
#[must_use]
pub fn next_number(section_id: &str) -> Option<String> {
    section_id.parse::<u32>().ok().map(|n| (n + 1).to_string())
}

/// Top-level component of a dotted section id ("5.2A" gives "5").
#[must_use]
pub fn top_level(section_id: &str) -> &str {
    section_id.split('.').next().unwrap_or(section_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_rules_builder() {
        let rules = SectionRules::new(StartRule::Titled, EndRule::Heading)
            .with_anchor("7", r"^\s*7\.1\s+Application")
            .with_toc_guard(TocGuard::new("8", 50, "240."))
            .with_run_to_next_top_level("7");

        assert_eq!(rules.anchors.len(), 1);
        assert!(rules.toc_guard("8").is_some());
        assert!(rules.toc_guard("7").is_none());
        assert_eq!(rules.run_to_next_top_level, vec!["7"]);
    }

    #[test]
    fn test_start_pattern_titled_is_case_insensitive() {
        let rules = SectionRules::new(StartRule::Titled, EndRule::Heading);
        let re = rules.start_pattern("5.2A", "Creditworthiness assessment").unwrap();
        assert!(re.is_match("intro\n  5.2A CREDITWORTHINESS ASSESSMENT\n"));
        // The dot in the id is literal
        assert!(!re.is_match("5x2A Creditworthiness assessment"));
    }

    #[test]
    fn test_start_pattern_anchor_overrides_rule() {
        let rules = SectionRules::new(StartRule::Titled, EndRule::Heading)
            .with_anchor("7", r"^\s*7\.1\s+Application");
        let re = rules.start_pattern("7", "Arrears, default and recovery").unwrap();
        assert!(re.is_match("7.1 Application"));
        assert!(!re.is_match("7 Arrears, default and recovery"));
    }

    #[test]
    fn test_start_pattern_chapter_and_appendix() {
        let rules = SectionRules::new(StartRule::Chapter, EndRule::NextChapter);
        let re = rules.start_pattern("2", "Understanding the needs").unwrap();
        assert!(re.is_match("Chapter 2"));
        assert!(re.is_match("2 Understanding the needs of vulnerable consumers"));
        assert!(!re.is_match("Chapter 21"));

        let re = rules.start_pattern("Appendix1", "GDPR").unwrap();
        assert!(re.is_match("Appendix 1"));
        assert!(!re.is_match("Appendix 12"));
    }

    #[test]
    fn test_end_pattern_next_chapter() {
        let rules = SectionRules::new(StartRule::Chapter, EndRule::NextChapter);
        let re = rules.end_pattern("2").unwrap().unwrap();
        assert!(re.is_match("Chapter 3"));
        assert!(re.is_match("3 Skills and capability of staff"));
        assert!(re.is_match("Appendix 1"));
        assert!(!re.is_match("2.4 Firms should"));

        let re = rules.end_pattern("Appendix1").unwrap().unwrap();
        assert!(re.is_match("Appendix 2"));
    }

    #[test]
    fn test_end_pattern_next_section() {
        let rules = SectionRules::new(StartRule::TitledOptionalDot, EndRule::NextSection);
        let re = rules.end_pattern("8").unwrap().unwrap();
        assert!(re.is_match("9. Annexes"));
        assert!(re.is_match("9 Annexes"));
        assert!(rules.end_pattern("Annex").unwrap().is_none());
    }

    #[test]
    fn test_marker_patterns() {
        let typed = ClauseGrammar::new(Numbering::Typed, ClauseType::Unknown);
        let re = typed.marker_pattern("5.2A").unwrap();
        let caps = re.captures("5.2A.12 G The firm").unwrap();
        assert_eq!(&caps["number"], "5.2A.12");
        assert_eq!(&caps["kind"], "G");

        let paragraph = ClauseGrammar::new(
            Numbering::Paragraph {
                min_digits: 2,
                max_digits: 3,
            },
            ClauseType::Rule,
        );
        let re = paragraph.marker_pattern("8").unwrap();
        assert!(re.is_match("240. Institutions"));
        assert!(!re.is_match("1. List item"));
        assert!(!re.is_match("1000. Too long"));

        let dotted = ClauseGrammar::new(Numbering::Dotted, ClauseType::Guidance);
        let re = dotted.marker_pattern("1").unwrap();
        assert_eq!(&re.captures("1.14 Firms should").unwrap()["number"], "1.14");
        assert!(!re.is_match("11.2 Other chapter"));
    }

    #[test]
    fn test_terminators_skip_next_placeholder_for_non_numeric_ids() {
        let grammar = ClauseGrammar::new(Numbering::Dotted, ClauseType::Guidance)
            .with_terminators([r"^Annex", r"^{next}\.\s+"]);
        assert_eq!(grammar.terminator_patterns("8").unwrap().len(), 2);
        assert_eq!(grammar.terminator_patterns("Annex").unwrap().len(), 1);
        assert!(grammar.terminator_patterns("8").unwrap()[1].is_match("9. Next"));
    }

    #[test]
    fn test_clause_id() {
        let fg = ClauseGrammar::new(Numbering::Dotted, ClauseType::Guidance).with_type_suffix();
        assert_eq!(fg.clause_id("1.1", None), "1.1 G");

        let eu = ClauseGrammar::new(Numbering::Dotted, ClauseType::Rule);
        assert_eq!(eu.clause_id("240", None), "240");
        assert_eq!(eu.clause_id("7.1.1", Some("R")), "7.1.1 R");
    }

    #[test]
    fn test_helpers() {
        assert_eq!(next_number("8"), Some("9".to_string()));
        assert_eq!(next_number("5.2A"), None);
        assert_eq!(top_level("5.2A"), "5");
        assert_eq!(top_level("7"), "7");
    }

    #[test]
    fn test_toc_guard() {
        let guard = TocGuard::new("8", 50, "240.");
        assert!(!guard.accepts(&PageText::new(5, "8. Monitoring framework ..... 60")));
        assert!(guard.accepts(&PageText::new(5, "8. Monitoring framework\n240. Institutions")));
        assert!(guard.accepts(&PageText::new(61, "8. Monitoring framework")));
    }
}
