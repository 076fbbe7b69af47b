//! Section boundary detection over a page sequence.

use std::sync::LazyLock;

use regex::Regex;

use super::grammar::{next_number, top_level, EndRule, SectionRules};
use crate::error::Result;
use crate::types::{PageText, SectionSpan};

/// A short numbered heading followed by a capitalized multi-word title.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static HEADING_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(\d{1,2}(?:\.\d{1,2}[A-Z]?)?)\s+[A-Z][a-zA-Z\s]{10,}")
        .expect("valid regex")
});

/// Finds the text and pages of a named section.
#[derive(Debug, Clone, Copy)]
pub struct SectionLocator<'a> {
    rules: &'a SectionRules,
}

impl<'a> SectionLocator<'a> {
    /// Create a locator for a set of section rules.
    #[must_use]
    pub fn new(rules: &'a SectionRules) -> Self {
        Self { rules }
    }

    /// Locate a section.
    ///
    /// The start page contributes the text after the start match. Each
    /// following page is either taken whole, or, when it holds the end
    /// boundary, contributes only the text before it and is not recorded as
    /// a section page. Returns `Ok(None)` when no accepted start is found.
    ///
    /// # Examples
    /// ```
    /// use regclause_extractor::segmentation::{EndRule, SectionLocator, SectionRules, StartRule};
    /// use regclause_extractor::types::PageText;
    ///
    /// let rules = SectionRules::new(StartRule::Titled, EndRule::Heading);
    /// let pages = vec![PageText::new(41, "5.2A Creditworthiness assessment\n5.2A.1 R A firm must")];
    /// let span = SectionLocator::new(&rules)
    ///     .locate(&pages, "5.2A", "Creditworthiness assessment")
    ///     .unwrap()
    ///     .unwrap();
    /// assert_eq!(span.pages, vec![41]);
    /// assert_eq!(span.text, "5.2A.1 R A firm must");
    /// ```
    pub fn locate(
        &self,
        pages: &[PageText],
        section_id: &str,
        section_title: &str,
    ) -> Result<Option<SectionSpan>> {
        let start = self.rules.start_pattern(section_id, section_title)?;
        let end = self.rules.end_pattern(section_id)?;
        let guard = self.rules.toc_guard(section_id);

        let mut fragments: Vec<&str> = Vec::new();
        let mut section_pages = Vec::new();
        let mut in_section = false;

        for page in pages.iter().filter(|p| !p.is_empty()) {
            let text = page.text.as_str();

            if !in_section {
                let Some(m) = start.find(text) else {
                    continue;
                };
                if guard.is_some_and(|g| !g.accepts(page)) {
                    continue;
                }
                in_section = true;
                section_pages.push(page.page_number);
                fragments.push(text[m.end()..].trim());
                continue;
            }

            if let Some(boundary) = self.end_boundary(text, section_id, end.as_ref()) {
                fragments.push(text[..boundary].trim());
                break;
            }
            section_pages.push(page.page_number);
            fragments.push(text.trim());
        }

        if !in_section {
            return Ok(None);
        }
        Ok(Some(SectionSpan {
            text: fragments.join("\n"),
            pages: section_pages,
        }))
    }

    /// Byte offset of the end boundary on a page, if the page holds one.
    fn end_boundary(&self, text: &str, section_id: &str, end: Option<&Regex>) -> Option<usize> {
        match self.rules.end {
            EndRule::Heading => HEADING_PATTERN.captures_iter(text).find_map(|caps| {
                let number = caps.get(1)?.as_str();
                let start = caps.get(0)?.start();
                self.heading_ends_section(section_id, number).then_some(start)
            }),
            EndRule::NextChapter | EndRule::NextSection => end?.find(text).map(|m| m.start()),
        }
    }

    /// Whether a heading numbered `candidate` closes `section_id`.
    ///
    /// A different top-level number always closes the section. The same
    /// top-level number closes it unless the heading is a dotted extension of
    /// the section id ("5.3" closes "5.2A", "5.2A.1" does not).
    fn heading_ends_section(&self, section_id: &str, candidate: &str) -> bool {
        let current_top = top_level(section_id);
        let candidate_top = top_level(candidate);

        if self.rules.run_to_next_top_level.iter().any(|id| id == section_id) {
            return next_number(current_top).is_some_and(|next| next == candidate_top);
        }
        if candidate_top != current_top {
            return true;
        }
        !candidate.starts_with(&format!("{section_id}."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::grammar::{StartRule, TocGuard};
    use pretty_assertions::assert_eq;

    fn rulebook_rules() -> SectionRules {
        SectionRules::new(StartRule::Titled, EndRule::Heading)
            .with_anchor("7", r"^\s*7\.1\s+Application")
            .with_run_to_next_top_level("7")
    }

    #[test]
    fn test_section_not_found() {
        let rules = rulebook_rules();
        let pages = vec![PageText::new(40, "Nothing relevant here")];
        let span = SectionLocator::new(&rules)
            .locate(&pages, "5.2A", "Creditworthiness assessment")
            .unwrap();
        assert!(span.is_none());
    }

    #[test]
    fn test_span_runs_to_sibling_heading() {
        let rules = rulebook_rules();
        let pages = vec![
            PageText::new(41, "Intro\n5.2A Creditworthiness assessment\n5.2A.1 R A firm must"),
            PageText::new(42, "5.2A.2 G The assessment should"),
            PageText::new(43, ""),
            PageText::new(44, "tail of 5.2A.3 R\n5.3 Conduct of business standards\n5.3.1 R"),
        ];
        let span = SectionLocator::new(&rules)
            .locate(&pages, "5.2A", "Creditworthiness assessment")
            .unwrap()
            .unwrap();

        assert_eq!(span.pages, vec![41, 42]);
        assert_eq!(
            span.text,
            "5.2A.1 R A firm must\n5.2A.2 G The assessment should\ntail of 5.2A.3 R"
        );
    }

    #[test]
    fn test_dotted_extension_does_not_end_section() {
        let rules = rulebook_rules();
        let pages = vec![
            PageText::new(10, "2 General principles\n2.1.1 G text"),
            PageText::new(11, "2.2 Additional guidance notes\n2.2.1 G more"),
            PageText::new(12, "3 Financial promotions and communications"),
        ];
        let span = SectionLocator::new(&rules)
            .locate(&pages, "2", "General principles")
            .unwrap()
            .unwrap();
        assert_eq!(span.pages, vec![10, 11]);
        assert!(span.text.contains("2.2.1 G more"));
    }

    #[test]
    fn test_different_top_level_ends_section() {
        let rules = rulebook_rules();
        let pages = vec![
            PageText::new(10, "2.10 Mental capacity guidance\n2.10.1 G text"),
            PageText::new(11, "3 Financial promotions and communications"),
        ];
        let span = SectionLocator::new(&rules)
            .locate(&pages, "2.10", "Mental capacity guidance")
            .unwrap()
            .unwrap();
        assert_eq!(span.pages, vec![10]);
        // The boundary page contributes its (empty) prefix
        assert_eq!(span.text, "2.10.1 G text\n");
    }

    #[test]
    fn test_section_seven_runs_to_next_top_level() {
        let rules = rulebook_rules();
        let pages = vec![
            PageText::new(90, "7.1 Application\n7.1.1 R This chapter applies"),
            PageText::new(91, "7.2 Treating customers in arrears\n7.2.1 R text"),
            PageText::new(92, "8 Debt advice and related services\n8.1.1 R"),
        ];
        let span = SectionLocator::new(&rules)
            .locate(&pages, "7", "Arrears, default and recovery")
            .unwrap()
            .unwrap();
        assert_eq!(span.pages, vec![90, 91]);
        assert!(span.text.contains("7.2.1 R text"));
        assert!(!span.text.contains("8.1.1"));
    }

    #[test]
    fn test_toc_guard_skips_contents_page() {
        let rules = SectionRules::new(StartRule::TitledOptionalDot, EndRule::NextSection)
            .with_toc_guard(TocGuard::new("8", 50, "240."));
        let pages = vec![
            PageText::new(3, "Contents\n8. Monitoring framework\n9. Annex"),
            PageText::new(60, "8. Monitoring framework\n240. Institutions should"),
            PageText::new(61, "241. The monitoring framework"),
            PageText::new(70, "9. Annexes"),
        ];
        let span = SectionLocator::new(&rules)
            .locate(&pages, "8", "Monitoring framework")
            .unwrap()
            .unwrap();

        assert_eq!(span.pages, vec![60, 61]);
        assert_eq!(span.text, "240. Institutions should\n241. The monitoring framework\n");
    }

    #[test]
    fn test_chapter_rules_stop_at_appendix() {
        let rules = SectionRules::new(StartRule::Chapter, EndRule::NextChapter);
        let pages = vec![
            PageText::new(5, "Chapter 5\n5.1 Firms should"),
            PageText::new(6, "5.2 Firms should also"),
            PageText::new(7, "Appendix 1\nGDPR"),
        ];
        let span = SectionLocator::new(&rules)
            .locate(&pages, "5", "Monitoring and evaluation")
            .unwrap()
            .unwrap();
        assert_eq!(span.pages, vec![5, 6]);

        let appendix = SectionLocator::new(&rules)
            .locate(&pages, "Appendix1", "GDPR and DPA 2018 considerations")
            .unwrap()
            .unwrap();
        assert_eq!(appendix.pages, vec![7]);
        assert_eq!(appendix.text, "GDPR");
    }

    #[test]
    fn test_closing_heading_after_subheading_on_same_page() {
        let rules = rulebook_rules();
        let pages = vec![
            PageText::new(90, "7.1 Application\n7.1.1 R This chapter applies to a firm."),
            PageText::new(
                91,
                "7.19 Cooling off period heading\n7.19.1 R Last rule of seven.\n\
                 8 Debt advice and related services\n8.1.1 R Chapter eight rule text.",
            ),
        ];
        let span = SectionLocator::new(&rules)
            .locate(&pages, "7", "Arrears, default and recovery")
            .unwrap()
            .unwrap();

        assert_eq!(span.pages, vec![90]);
        assert!(span.text.ends_with("7.19.1 R Last rule of seven."));
        assert!(!span.text.contains("Chapter eight"));
        assert!(!span.text.contains("8.1.1 R"));
    }

    #[test]
    fn test_locate_is_idempotent() {
        let rules = rulebook_rules();
        let pages = vec![
            PageText::new(41, "5.2A Creditworthiness assessment\n5.2A.1 R A firm must"),
            PageText::new(42, "5.2A.2 G The assessment"),
        ];
        let locator = SectionLocator::new(&rules);
        let first = locator.locate(&pages, "5.2A", "Creditworthiness assessment").unwrap();
        let second = locator.locate(&pages, "5.2A", "Creditworthiness assessment").unwrap();
        assert_eq!(first, second);
    }
}
