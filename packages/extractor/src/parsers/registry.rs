//! Registry mapping (jurisdiction, document type) pairs to parser factories.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use super::pipeline::ProfileParser;
use super::{eu, uk, ParserInfo, RegulationParser};
use crate::config::ParserConfig;
use crate::error::{ExtractorError, Result};
use crate::pdf::{LopdfProvider, PageTextProvider};
use crate::types::Jurisdiction;

/// Builds a parser for a configuration.
pub type ParserFactory = Box<dyn Fn(ParserConfig) -> Box<dyn RegulationParser> + Send + Sync>;

/// Result of auto-detecting the parser for a file.
pub struct Detection {
    /// Parser that accepted the file.
    pub parser: Box<dyn RegulationParser>,

    /// Jurisdiction it is registered under.
    pub jurisdiction: String,

    /// Document type it is registered under.
    pub document_type: String,
}

impl fmt::Debug for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Detection")
            .field("parser", &self.parser.name())
            .field("jurisdiction", &self.jurisdiction)
            .field("document_type", &self.document_type)
            .finish()
    }
}

/// One registry entry with its parser summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredParser {
    pub jurisdiction: String,
    pub document_type: String,
    pub info: ParserInfo,
}

/// Registry of parser factories.
///
/// Jurisdictions are stored lowercase and looked up case-insensitively.
/// Registration order is kept for listings and for detection.
#[derive(Default)]
pub struct ParserRegistry {
    jurisdictions: Vec<(String, Vec<(String, ParserFactory)>)>,
}

impl ParserRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in parsers reading PDFs with lopdf.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::with_default_parsers(Arc::new(LopdfProvider))
    }

    /// Create a registry with the built-in parsers and a custom page text
    /// provider.
    #[must_use]
    pub fn with_default_parsers(provider: Arc<dyn PageTextProvider>) -> Self {
        let mut registry = Self::new();

        let conc_provider = Arc::clone(&provider);
        registry.register(Jurisdiction::Uk, "FCA_CONC", move |config| {
            Box::new(ProfileParser::with_provider(
                uk::conc_profile(),
                config,
                Arc::clone(&conc_provider),
            ))
        });

        let fg21_provider = Arc::clone(&provider);
        registry.register(Jurisdiction::Uk, "FCA_FG21", move |config| {
            Box::new(ProfileParser::with_provider(
                uk::fg21_profile(),
                config,
                Arc::clone(&fg21_provider),
            ))
        });

        registry.register(Jurisdiction::Eu, "EBA_GL_2020_06", move |config| {
            Box::new(ProfileParser::with_provider(
                eu::eba_gl_2020_06_profile(),
                config,
                Arc::clone(&provider),
            ))
        });

        registry
    }

    /// Register a parser factory, replacing any existing one for the pair.
    pub fn register<F>(
        &mut self,
        jurisdiction: impl Into<String>,
        document_type: impl Into<String>,
        factory: F,
    ) where
        F: Fn(ParserConfig) -> Box<dyn RegulationParser> + Send + Sync + 'static,
    {
        let jurisdiction = jurisdiction.into().to_lowercase();
        let document_type = document_type.into();
        let factory: ParserFactory = Box::new(factory);

        let index = match self.jurisdictions.iter().position(|(j, _)| *j == jurisdiction) {
            Some(index) => index,
            None => {
                self.jurisdictions.push((jurisdiction, Vec::new()));
                self.jurisdictions.len() - 1
            }
        };
        let types = &mut self.jurisdictions[index].1;
        match types.iter_mut().find(|(t, _)| *t == document_type) {
            Some(entry) => entry.1 = factory,
            None => types.push((document_type, factory)),
        }
    }

    fn types(&self, jurisdiction: &str) -> Option<&[(String, ParserFactory)]> {
        let jurisdiction = jurisdiction.to_lowercase();
        self.jurisdictions
            .iter()
            .find(|(j, _)| *j == jurisdiction)
            .map(|(_, types)| types.as_slice())
    }

    /// Create a parser.
    pub fn create(
        &self,
        jurisdiction: &str,
        document_type: &str,
        config: ParserConfig,
    ) -> Result<Box<dyn RegulationParser>> {
        let types = self
            .types(jurisdiction)
            .ok_or_else(|| ExtractorError::UnknownJurisdiction {
                jurisdiction: jurisdiction.to_lowercase(),
                available: self.jurisdictions().join(", "),
            })?;

        let (_, factory) = types
            .iter()
            .find(|(t, _)| t == document_type)
            .ok_or_else(|| ExtractorError::UnknownDocumentType {
                jurisdiction: jurisdiction.to_lowercase(),
                document_type: document_type.to_string(),
                available: self.types_for(jurisdiction).join(", "),
            })?;

        Ok(factory(config))
    }

    /// Registered jurisdictions in registration order.
    #[must_use]
    pub fn jurisdictions(&self) -> Vec<&str> {
        self.jurisdictions.iter().map(|(j, _)| j.as_str()).collect()
    }

    /// Document types of a jurisdiction; empty if it is unknown.
    #[must_use]
    pub fn types_for(&self, jurisdiction: &str) -> Vec<&str> {
        self.types(jurisdiction)
            .map(|types| types.iter().map(|(t, _)| t.as_str()).collect())
            .unwrap_or_default()
    }

    /// Every jurisdiction with its document types.
    #[must_use]
    pub fn combinations(&self) -> Vec<(&str, Vec<&str>)> {
        self.jurisdictions
            .iter()
            .map(|(j, types)| (j.as_str(), types.iter().map(|(t, _)| t.as_str()).collect()))
            .collect()
    }

    /// Find the first registered parser whose `validate()` accepts the file.
    ///
    /// With a jurisdiction hint only that jurisdiction is searched.
    pub fn detect(
        &self,
        path: &Path,
        jurisdiction: Option<&str>,
        config: &ParserConfig,
    ) -> Result<Detection> {
        let hint = jurisdiction.map(str::to_lowercase);

        for (j, types) in &self.jurisdictions {
            if hint.as_ref().is_some_and(|h| h != j) {
                continue;
            }
            for (document_type, factory) in types {
                let parser = factory(config.clone());
                if parser.validate(path) {
                    tracing::info!(jurisdiction = %j, document_type = %document_type, "Detected parser");
                    return Ok(Detection {
                        parser,
                        jurisdiction: j.clone(),
                        document_type: document_type.clone(),
                    });
                }
                tracing::debug!(jurisdiction = %j, document_type = %document_type, "Parser rejected file");
            }
        }

        let available = self
            .jurisdictions
            .iter()
            .flat_map(|(j, types)| types.iter().map(move |(t, _)| format!("{j}:{t}")))
            .collect::<Vec<_>>()
            .join(", ");
        Err(ExtractorError::NoParserForFile {
            path: path.to_path_buf(),
            available,
        })
    }

    /// Summaries of every registered parser, built with the default
    /// configuration.
    #[must_use]
    pub fn parser_info(&self) -> Vec<RegisteredParser> {
        self.jurisdictions
            .iter()
            .flat_map(|(j, types)| {
                types.iter().map(move |(t, factory)| RegisteredParser {
                    jurisdiction: j.clone(),
                    document_type: t.clone(),
                    info: factory(ParserConfig::default()).parser_info(),
                })
            })
            .collect()
    }
}
