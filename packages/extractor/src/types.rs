//! Core data types for the extractor.
//!
//! These types describe the pages read from a regulation PDF, the sections
//! located in them, and the clauses that make up the final document.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Page number used when a clause cannot be attributed to any page.
pub const UNKNOWN_PAGE: i32 = -1;

/// Text of a single PDF page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    /// 1-based physical page number.
    pub page_number: u32,

    /// Extracted (and possibly cleaned) text, may be empty.
    pub text: String,
}

impl PageText {
    /// Create a new page.
    #[must_use]
    pub fn new(page_number: u32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: text.into(),
        }
    }

    /// Whether the page carries no text at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Text and pages belonging to one located section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSpan {
    /// Concatenated in-section text, one fragment per page joined by newlines.
    pub text: String,

    /// Pages the section spans, in discovery order.
    pub pages: Vec<u32>,
}

/// A section to extract: identifier plus its printed title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionTarget {
    /// Section identifier (e.g., "5.2A", "7", "Appendix1").
    pub id: String,

    /// Section title as printed in the document.
    pub title: String,
}

impl SectionTarget {
    /// Create a new section target.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Classification of a clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClauseType {
    /// Binding rule, marked "R".
    #[serde(rename = "R")]
    Rule,

    /// Explanatory guidance, marked "G".
    #[serde(rename = "G")]
    Guidance,

    /// No recognizable type marker.
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl ClauseType {
    /// Get the serialized marker.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rule => "R",
            Self::Guidance => "G",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Derive the type from the suffix convention of a clause id.
    ///
    /// # Examples
    /// ```
    /// use regclause_extractor::types::ClauseType;
    ///
    /// assert_eq!(ClauseType::from_clause_id("7.1.1 R"), ClauseType::Rule);
    /// assert_eq!(ClauseType::from_clause_id("5.2A.2 G"), ClauseType::Guidance);
    /// assert_eq!(ClauseType::from_clause_id("240"), ClauseType::Unknown);
    /// ```
    #[must_use]
    pub fn from_clause_id(clause_id: &str) -> Self {
        if clause_id.ends_with(" R") {
            Self::Rule
        } else if clause_id.ends_with(" G") {
            Self::Guidance
        } else {
            Self::Unknown
        }
    }

    /// Parse a single type letter as it appears in a clause marker.
    #[must_use]
    pub fn from_marker(letter: &str) -> Self {
        match letter {
            "R" => Self::Rule,
            "G" => Self::Guidance,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ClauseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single extracted clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    /// Section the clause was extracted from (e.g., "5.2A", "7").
    pub section: String,

    /// Full clause identifier (e.g., "5.2A.1 R", "240").
    pub clause_id: String,

    /// Main section title (e.g., "Application" for 7.1.x clauses).
    pub main_section_name: Option<String>,

    /// Subsection title in effect at the clause.
    pub subsection_name: Option<String>,

    /// Cleaned clause text.
    pub content: String,

    /// Source page number, or [`UNKNOWN_PAGE`].
    pub page_number: i32,

    /// Rule, guidance or unknown.
    pub clause_type: ClauseType,
}

impl Clause {
    /// Create a clause whose type follows from the clause id suffix.
    #[must_use]
    pub fn new(
        section: impl Into<String>,
        clause_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let clause_id = clause_id.into();
        let clause_type = ClauseType::from_clause_id(&clause_id);
        Self {
            section: section.into(),
            clause_id,
            main_section_name: None,
            subsection_name: None,
            content: content.into(),
            page_number: UNKNOWN_PAGE,
            clause_type,
        }
    }

    /// Override the derived clause type.
    ///
    /// `Unknown` keeps the type derived from the clause id.
    #[must_use]
    pub fn with_type(mut self, clause_type: ClauseType) -> Self {
        if clause_type != ClauseType::Unknown {
            self.clause_type = clause_type;
        }
        self
    }

    /// Set the main section name; empty names are stored as `None`.
    #[must_use]
    pub fn with_main_section_name(mut self, name: impl Into<String>) -> Self {
        self.main_section_name = non_empty(name.into());
        self
    }

    /// Set the subsection name; empty names are stored as `None`.
    #[must_use]
    pub fn with_subsection_name(mut self, name: impl Into<String>) -> Self {
        self.subsection_name = non_empty(name.into());
        self
    }

    /// Set the source page number.
    #[must_use]
    pub fn with_page_number(mut self, page_number: i32) -> Self {
        self.page_number = page_number;
        self
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Jurisdictions with built-in parsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Jurisdiction {
    /// United Kingdom (FCA).
    Uk,

    /// European Union (EBA).
    Eu,
}

impl Jurisdiction {
    /// Get the registry key.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uk => "uk",
            Self::Eu => "eu",
        }
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Jurisdiction> for String {
    fn from(jurisdiction: Jurisdiction) -> Self {
        jurisdiction.as_str().to_string()
    }
}

impl FromStr for Jurisdiction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "uk" => Ok(Self::Uk),
            "eu" => Ok(Self::Eu),
            other => Err(format!("unknown jurisdiction: {other}")),
        }
    }
}

/// Country of origin of a regulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegulationCountry {
    #[serde(rename = "EU")]
    Eu,

    #[serde(rename = "UK")]
    Uk,

    #[serde(rename = "US")]
    Us,
}

impl RegulationCountry {
    /// Get the short code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eu => "EU",
            Self::Uk => "UK",
            Self::Us => "US",
        }
    }

    /// Get the full name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Eu => "European Union",
            Self::Uk => "United Kingdom",
            Self::Us => "United States",
        }
    }
}

/// Metadata for a parsed regulation document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Path to the source file.
    pub source_file: String,

    /// Number of pages read from the document (at least 1).
    pub total_pages: usize,

    /// Sections that were configured for extraction.
    pub sections_extracted: Vec<String>,

    /// Version of the parser used.
    pub parser_version: Option<String>,

    /// When the document was parsed.
    pub extraction_date: DateTime<Local>,

    /// Country of origin.
    pub country: RegulationCountry,

    /// Jurisdiction-specific diagnostic fields.
    pub additional_info: serde_json::Map<String, serde_json::Value>,
}

/// A fully parsed regulation document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedDocument {
    /// Type of document (e.g., "UK_FCA_CONC").
    pub document_type: String,

    /// Document version.
    pub version: Option<String>,

    /// Country of origin.
    pub country: RegulationCountry,

    /// Extracted clauses in document order.
    pub clauses: Vec<Clause>,

    /// Document metadata.
    pub metadata: DocumentMetadata,
}

impl ParsedDocument {
    /// Total number of clauses.
    #[must_use]
    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }

    /// All clauses of one section.
    pub fn clauses_in_section<'a>(&'a self, section: &'a str) -> impl Iterator<Item = &'a Clause> {
        self.clauses.iter().filter(move |c| c.section == section)
    }

    /// Distinct sections that produced at least one clause.
    #[must_use]
    pub fn sections(&self) -> BTreeSet<&str> {
        self.clauses.iter().map(|c| c.section.as_str()).collect()
    }
}
