//! Jurisdiction profiles: everything that distinguishes one document family.
//!
//! A profile is plain data plus one subsection strategy. The shared pipeline
//! in [`super::pipeline`] interprets it; adding a document family means
//! writing a new profile, not a new parser.

use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::config::ParserConfig;
use crate::segmentation::{ClauseGrammar, PageTextCleaner, SectionRules, SubsectionStrategy};
use crate::types::{PageText, RegulationCountry, SectionTarget};

/// Where page extraction starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartPage {
    /// Use `pdf_start_page` from the parser configuration.
    Configured,

    /// Always start at this page, whatever the configuration says.
    Fixed(u32),
}

impl StartPage {
    /// The effective first page for a configuration.
    #[must_use]
    pub fn resolve(&self, config: &ParserConfig) -> u32 {
        match self {
            Self::Configured => config.pdf_start_page,
            Self::Fixed(page) => *page,
        }
    }
}

/// How the main section name of a clause is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainSectionRule {
    /// Look up the "N.N Title" heading line in the section pages.
    HeadingLookup,

    /// Use the title of the section being extracted.
    SectionTitle,
}

/// Content-sniffing rules for `validate()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRules {
    /// Minimum number of pages in the whole document.
    pub min_pages: usize,

    /// Number of leading pages searched for markers.
    pub sniff_pages: usize,

    /// Phrases matched exactly.
    pub markers: Vec<String>,

    /// Phrases matched against lowercased page text (give them in lowercase).
    pub lowercase_markers: Vec<String>,
}

impl ValidationRules {
    /// Create rules with exact-match markers only.
    #[must_use]
    pub fn new(min_pages: usize, sniff_pages: usize, markers: &[&str]) -> Self {
        Self {
            min_pages,
            sniff_pages,
            markers: markers.iter().map(|m| (*m).to_string()).collect(),
            lowercase_markers: Vec::new(),
        }
    }

    /// Add markers matched case-insensitively.
    #[must_use]
    pub fn with_lowercase_markers(mut self, markers: &[&str]) -> Self {
        self.lowercase_markers
            .extend(markers.iter().map(|m| m.to_lowercase()));
        self
    }

    /// Whether any marker occurs on any of the pages.
    #[must_use]
    pub fn any_marker(&self, pages: &[PageText]) -> bool {
        pages.iter().filter(|p| !p.is_empty()).any(|page| {
            self.markers.iter().any(|m| page.text.contains(m.as_str())) || {
                let lower = page.text.to_lowercase();
                self.lowercase_markers
                    .iter()
                    .any(|m| lower.contains(m.as_str()))
            }
        })
    }
}

/// Complete description of one document family.
#[derive(Debug)]
pub struct JurisdictionProfile {
    /// Parser name reported by `parser_info()`.
    pub parser_name: String,

    /// Document type stamped on parsed documents (e.g. "UK_FCA_CONC").
    pub document_type: String,

    /// Country of origin.
    pub country: RegulationCountry,

    /// Document version, if the family carries one.
    pub version: Option<String>,

    /// Parser version recorded in metadata.
    pub parser_version: String,

    /// Default location of the source PDF.
    pub default_file_path: PathBuf,

    /// Sections extracted when the configuration does not name any.
    pub default_sections: Vec<SectionTarget>,

    /// First page to extract.
    pub start_page: StartPage,

    /// Content sniffing for `validate()`.
    pub validation: ValidationRules,

    /// Header and footer cleaning; `None` passes raw page text through.
    pub cleaner: Option<PageTextCleaner>,

    /// Section boundary rules.
    pub sections: SectionRules,

    /// Clause numbering grammar.
    pub grammar: ClauseGrammar,

    /// Main section naming.
    pub main_section: MainSectionRule,

    /// Subsection naming.
    pub subsection: Box<dyn SubsectionStrategy>,

    /// Record worked examples and case studies per clause.
    pub annotate_clauses: bool,

    /// Fixed entries added to `metadata.additional_info`.
    pub additional_info: Map<String, Value>,
}

impl JurisdictionProfile {
    /// Sections to extract under a configuration.
    #[must_use]
    pub fn sections_for<'a>(&'a self, config: &'a ParserConfig) -> &'a [SectionTarget] {
        config
            .sections_to_extract
            .as_deref()
            .filter(|sections| !sections.is_empty())
            .unwrap_or(self.default_sections.as_slice())
    }
}
