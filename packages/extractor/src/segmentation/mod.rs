//! Section and clause segmentation for regulation documents.
//!
//! Cleaned page text flows through a [`SectionLocator`] (find the section),
//! a [`ClauseSegmenter`] (cut it into clauses) and the title and page
//! resolvers. Document families differ only in the [`SectionRules`],
//! [`ClauseGrammar`], cleaning filters and subsection strategy they supply.

mod annotations;
mod cleaner;
mod grammar;
mod locator;
mod pages;
mod segmenter;
mod titles;

pub use annotations::ClauseAnnotations;
pub use cleaner::{LineFilter, PageTextCleaner};
pub use grammar::{
    next_number, top_level, ClauseGrammar, ContentCleaning, EndRule, Numbering, SectionRules,
    StartRule, TocGuard, NEXT_SECTION_PLACEHOLDER,
};
pub use locator::SectionLocator;
pub use pages::page_for;
pub use segmenter::{ClauseSegmenter, RawClause};
pub use titles::{main_section_name, FixedMapping, HeadingScan, SubsectionQuery, SubsectionStrategy};
