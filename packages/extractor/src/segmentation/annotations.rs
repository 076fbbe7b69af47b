//! Worked examples and case studies embedded in guidance clauses.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static EXAMPLES_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Examples of how firms can put this into practice:?\s*").expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static CASE_STUDY_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Case study:\s*").expect("valid regex"));

/// Start of any examples block, with or without the full heading.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static EXAMPLES_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Examples of how").expect("valid regex"));

/// Examples and case studies found in one clause.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClauseAnnotations {
    /// Text of each examples block.
    pub examples: Vec<String>,

    /// Text of each case study.
    pub case_studies: Vec<String>,
}

impl ClauseAnnotations {
    /// Extract annotations from clause content.
    ///
    /// An examples block runs to the next case study or the end of the
    /// clause. A case study runs to the next case study, the next examples
    /// block, or the end of the clause.
    #[must_use]
    pub fn extract(content: &str) -> Self {
        let examples = blocks(content, &EXAMPLES_MARKER, |from| {
            next_start(&CASE_STUDY_MARKER, content, from)
        });
        let case_studies = blocks(content, &CASE_STUDY_MARKER, |from| {
            let case_study = next_start(&CASE_STUDY_MARKER, content, from);
            let examples = next_start(&EXAMPLES_HEADING, content, from);
            match (case_study, examples) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            }
        });
        Self {
            examples,
            case_studies,
        }
    }

    /// Whether nothing was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty() && self.case_studies.is_empty()
    }
}

/// Blocks opened by `marker`, each ending where `stop` says (or at the end).
fn blocks(content: &str, marker: &Regex, stop: impl Fn(usize) -> Option<usize>) -> Vec<String> {
    let mut found = Vec::new();
    let mut position = 0;
    while let Some(m) = marker.find_at(content, position) {
        let end = stop(m.end()).unwrap_or(content.len());
        found.push(content[m.end()..end].trim().to_string());
        position = end.max(m.end());
        if position >= content.len() {
            break;
        }
    }
    found
}

fn next_start(pattern: &Regex, content: &str, from: usize) -> Option<usize> {
    pattern.find_at(content, from).map(|m| m.start())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_annotations() {
        let found = ClauseAnnotations::extract("Firms should understand their customers.");
        assert!(found.is_empty());
    }

    #[test]
    fn test_examples_and_case_studies() {
        let content = "Firms should act.\nExamples of how firms can put this into practice:\n- Train staff\nCase study: A firm redesigned its letters.\ncase study: Poor practice at another firm.";
        let found = ClauseAnnotations::extract(content);

        assert_eq!(found.examples, vec!["- Train staff"]);
        assert_eq!(
            found.case_studies,
            vec![
                "A firm redesigned its letters.",
                "Poor practice at another firm."
            ]
        );
    }

    #[test]
    fn test_case_study_stops_at_examples() {
        let content = "Case study: first\nExamples of how firms can put this into practice: second";
        let found = ClauseAnnotations::extract(content);
        assert_eq!(found.case_studies, vec!["first"]);
        assert_eq!(found.examples, vec!["second"]);
    }
}
