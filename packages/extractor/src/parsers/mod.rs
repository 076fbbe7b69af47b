//! Regulation parsers and the registry that selects them.
//!
//! Every built-in parser is a [`ProfileParser`] over a [`JurisdictionProfile`].
//! Callers that need a different pipeline can implement [`RegulationParser`]
//! directly and register it with a [`ParserRegistry`].

mod eu;
mod pipeline;
mod profile;
mod registry;
mod uk;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::ParserConfig;
use crate::error::Result;
use crate::types::ParsedDocument;

pub use eu::eba_gl_2020_06_profile;
pub use pipeline::{ProfileParser, CLAUSE_ANNOTATIONS_KEY};
pub use profile::{JurisdictionProfile, MainSectionRule, StartPage, ValidationRules};
pub use registry::{Detection, ParserFactory, ParserRegistry, RegisteredParser};
pub use uk::{conc_profile, fg21_profile};

/// Summary of a parser for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserInfo {
    /// Parser name.
    pub parser: String,

    /// Document types the parser produces.
    pub supported_types: Vec<String>,

    /// Parser version.
    pub version: String,
}

/// Capability set of a regulation parser.
pub trait RegulationParser: Send + Sync {
    /// Parser name.
    fn name(&self) -> &str;

    /// Parser version.
    fn version(&self) -> &str;

    /// Configuration the parser was created with.
    fn config(&self) -> &ParserConfig;

    /// Default location of the source document.
    fn default_file_path(&self) -> PathBuf;

    /// Document types this parser produces.
    fn supported_document_types(&self) -> Vec<String>;

    /// Whether the file looks like a document this parser understands.
    ///
    /// Never fails: unreadable or missing files are simply not valid.
    fn validate(&self, path: &Path) -> bool;

    /// Parse a document.
    fn parse(&self, path: &Path) -> Result<ParsedDocument>;

    /// Document path from the configuration, or the default.
    fn file_path(&self) -> PathBuf {
        self.config()
            .document_file_path
            .clone()
            .unwrap_or_else(|| self.default_file_path())
    }

    /// Summary for listings.
    fn parser_info(&self) -> ParserInfo {
        ParserInfo {
            parser: self.name().to_string(),
            supported_types: self.supported_document_types(),
            version: self.version().to_string(),
        }
    }
}
