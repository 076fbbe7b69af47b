//! Page attribution for clauses.

use crate::types::{PageText, UNKNOWN_PAGE};

/// Page on which a clause appears.
///
/// Returns the first page in `section_pages` order whose text contains
/// `needle` (the clause number). Falls back to the first section page, and
/// to [`UNKNOWN_PAGE`] when the section has no pages. The result is always
/// one of `section_pages` or the sentinel.
///
/// # Examples
/// ```
/// use regclause_extractor::segmentation::page_for;
/// use regclause_extractor::types::PageText;
///
/// let pages = vec![PageText::new(41, "5.2A.1 R"), PageText::new(42, "5.2A.2 G")];
/// assert_eq!(page_for("5.2A.2", &[41, 42], &pages), 42);
/// assert_eq!(page_for("5.2A.9", &[41, 42], &pages), 41);
/// assert_eq!(page_for("5.2A.1", &[], &pages), -1);
/// ```
#[must_use]
pub fn page_for(needle: &str, section_pages: &[u32], pages: &[PageText]) -> i32 {
    let found = section_pages.iter().copied().find(|&number| {
        pages
            .iter()
            .find(|p| p.page_number == number)
            .is_some_and(|p| p.text.contains(needle))
    });

    found
        .or_else(|| section_pages.first().copied())
        .and_then(|number| i32::try_from(number).ok())
        .unwrap_or(UNKNOWN_PAGE)
}
