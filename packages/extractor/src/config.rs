//! Configuration constants and validation functions for the extractor.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ExtractorError, Result};
use crate::types::SectionTarget;

/// Version stamped into parsed documents.
pub const PARSER_VERSION: &str = "1.0.0";

/// Default first page to read, skipping title pages and tables of contents.
pub const DEFAULT_START_PAGE: u32 = 40;

/// Default horizontal tolerance handed to the page text provider.
pub const DEFAULT_X_TOLERANCE: u32 = 2;

/// Default vertical tolerance handed to the page text provider.
pub const DEFAULT_Y_TOLERANCE: u32 = 3;

/// Number of parse operations kept in the service history.
pub const HISTORY_LIMIT: usize = 1000;

/// Default directory for generated output files.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Section argument pattern: `ID=Title`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SECTION_ARG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([0-9A-Za-z][0-9A-Za-z.]*)\s*=\s*(\S.*?)\s*$").expect("valid regex")
});

/// Serialization format for parsed documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl OutputFormat {
    /// File extension for this format.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

/// Configuration for regulation parsers.
///
/// All fields are plain values; nothing is read from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Path to the regulation document, overriding the parser's default.
    pub document_file_path: Option<PathBuf>,

    /// First page to read (1-based).
    pub pdf_start_page: u32,

    /// Horizontal tolerance for PDF text extraction.
    pub pdf_x_tolerance: u32,

    /// Vertical tolerance for PDF text extraction.
    pub pdf_y_tolerance: u32,

    /// Output format for parsed data.
    pub output_format: OutputFormat,

    /// Whether to include metadata in output.
    pub include_metadata: bool,

    /// Sections to extract, overriding the parser's defaults. Order is kept
    /// and ids must be unique.
    pub sections_to_extract: Option<Vec<SectionTarget>>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            document_file_path: None,
            pdf_start_page: DEFAULT_START_PAGE,
            pdf_x_tolerance: DEFAULT_X_TOLERANCE,
            pdf_y_tolerance: DEFAULT_Y_TOLERANCE,
            output_format: OutputFormat::Json,
            include_metadata: true,
            sections_to_extract: None,
        }
    }
}

impl ParserConfig {
    /// Set the document path override.
    #[must_use]
    pub fn with_document_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.document_file_path = Some(path.into());
        self
    }

    /// Set the first page to read.
    #[must_use]
    pub fn with_start_page(mut self, page: u32) -> Self {
        self.pdf_start_page = page;
        self
    }

    /// Set the extraction tolerances.
    #[must_use]
    pub fn with_tolerances(mut self, x_tolerance: u32, y_tolerance: u32) -> Self {
        self.pdf_x_tolerance = x_tolerance;
        self.pdf_y_tolerance = y_tolerance;
        self
    }

    /// Set the sections to extract.
    #[must_use]
    pub fn with_sections(mut self, sections: impl IntoIterator<Item = SectionTarget>) -> Self {
        self.sections_to_extract = Some(sections.into_iter().collect());
        self
    }

    /// Set the output format.
    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Examples
    /// ```
    /// use regclause_extractor::config::ParserConfig;
    ///
    /// assert!(ParserConfig::default().validate().is_ok());
    /// assert!(ParserConfig::default().with_start_page(0).validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        if self.pdf_start_page == 0 {
            return Err(ExtractorError::InvalidConfig(
                "pdf_start_page must be at least 1".to_string(),
            ));
        }
        if let Some(sections) = &self.sections_to_extract {
            if let Some(empty) = sections.iter().find(|s| s.id.trim().is_empty()) {
                return Err(ExtractorError::InvalidConfig(format!(
                    "section id must not be empty (title: '{}')",
                    empty.title
                )));
            }
            let mut seen = HashSet::new();
            if let Some(duplicate) = sections.iter().find(|s| !seen.insert(s.id.trim())) {
                return Err(ExtractorError::InvalidConfig(format!(
                    "section '{}' is listed more than once",
                    duplicate.id.trim()
                )));
            }
        }
        Ok(())
    }
}

/// Parse a section argument of the form `ID=Title`.
///
/// # Examples
/// ```
/// use regclause_extractor::config::parse_section_target;
///
/// let target = parse_section_target("5.2A=Creditworthiness assessment").unwrap();
/// assert_eq!(target.id, "5.2A");
/// assert_eq!(target.title, "Creditworthiness assessment");
/// assert!(parse_section_target("no title").is_err());
/// ```
pub fn parse_section_target(arg: &str) -> Result<SectionTarget> {
    let caps = SECTION_ARG_PATTERN.captures(arg).ok_or_else(|| {
        ExtractorError::InvalidConfig(format!(
            "invalid section '{arg}'. Expected ID=Title (e.g., 5.2A=Creditworthiness assessment)"
        ))
    })?;
    Ok(SectionTarget::new(&caps[1], &caps[2]))
}
