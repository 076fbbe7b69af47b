//! Error types for the extractor.
//!
//! A section that cannot be located is not an error: the locator returns
//! `None` and parsing continues with the remaining sections. Everything here
//! is fatal to the single parse attempt that raised it.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the extractor library.
#[derive(Debug, Error)]
pub enum ExtractorError {
    /// The document failed validation (missing, wrong extension, too short, or
    /// none of the expected marker phrases found).
    #[error("Invalid {document_type} document: {}", .path.display())]
    InvalidDocument {
        path: PathBuf,
        document_type: String,
    },

    /// The regulation file does not exist.
    #[error("Regulation file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The PDF has no pages at or after the configured start page.
    #[error("No pages at or after page {start_page} in {}", .path.display())]
    NoPages { path: PathBuf, start_page: u32 },

    /// No parsers registered for the jurisdiction.
    #[error(
        "No parsers available for jurisdiction: {jurisdiction}. Available jurisdictions: {available}"
    )]
    UnknownJurisdiction {
        jurisdiction: String,
        available: String,
    },

    /// The jurisdiction exists but has no parser for the document type.
    #[error(
        "No parser available for document type '{document_type}' in jurisdiction '{jurisdiction}'. Available types for {jurisdiction}: {available}"
    )]
    UnknownDocumentType {
        jurisdiction: String,
        document_type: String,
        available: String,
    },

    /// Auto-detection found no parser that accepts the file.
    #[error("No suitable parser found for file: {}. Available parsers: {available}", .path.display())]
    NoParserForFile { path: PathBuf, available: String },

    /// Every document type of a jurisdiction failed to parse.
    #[error("All parsers for jurisdiction '{jurisdiction}' failed: {}", .failures.join("; "))]
    PartialBatchFailure {
        jurisdiction: String,
        failures: Vec<String>,
    },

    /// A batch run produced no output at all.
    #[error("No files were generated in {}. Check that the regulation PDFs exist", .0.display())]
    NothingGenerated(PathBuf),

    /// A parse failed once a parser had been selected.
    #[error("Failed to parse document for {jurisdiction}:{document_type}: {source}")]
    ParseFailed {
        jurisdiction: String,
        document_type: String,
        #[source]
        source: Box<ExtractorError>,
    },

    /// The PDF could not be loaded.
    #[error("Failed to read PDF {}: {source}", .path.display())]
    Pdf {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    /// A section or clause pattern did not compile.
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Invalid parser configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error.
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

/// Result type alias for extractor operations.
pub type Result<T> = std::result::Result<T, ExtractorError>;
