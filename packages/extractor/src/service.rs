//! Parser service: parser selection, batch parsing and a bounded parse history.

use std::collections::VecDeque;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::config::{ParserConfig, HISTORY_LIMIT};
use crate::error::{ExtractorError, Result};
use crate::parsers::{ParserRegistry, RegisteredParser};
use crate::types::ParsedDocument;

/// One entry of the parse history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseRecord {
    /// Document path, or "unknown" if no parser was created.
    pub file_path: String,
    pub jurisdiction: String,
    pub document_type: Option<String>,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    pub duration_seconds: f64,

    /// Set on success only.
    pub clauses_extracted: Option<usize>,
    pub success: bool,

    /// Set on failure only.
    pub error: Option<String>,
}

/// Outcome of [`ParserService::validate_document`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub jurisdiction: Option<String>,
    pub document_type: Option<String>,
}

impl ValidationOutcome {
    fn invalid() -> Self {
        Self {
            valid: false,
            jurisdiction: None,
            document_type: None,
        }
    }
}

/// High-level entry point over a [`ParserRegistry`].
///
/// Parsing needs `&mut self` because every attempt is recorded in the
/// history.
pub struct ParserService {
    registry: ParserRegistry,
    config: ParserConfig,
    history: VecDeque<ParseRecord>,
}

impl ParserService {
    /// Create a service over a registry.
    #[must_use]
    pub fn new(registry: ParserRegistry, config: ParserConfig) -> Self {
        Self {
            registry,
            config,
            history: VecDeque::new(),
        }
    }

    /// Create a service over the built-in parsers.
    #[must_use]
    pub fn with_defaults(config: ParserConfig) -> Self {
        Self::new(ParserRegistry::with_defaults(), config)
    }

    /// The registry in use.
    #[must_use]
    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    /// Mutable access to the registry, for runtime registration.
    pub fn registry_mut(&mut self) -> &mut ParserRegistry {
        &mut self.registry
    }

    /// The configuration handed to every parser.
    #[must_use]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse the document of a jurisdiction.
    ///
    /// Without a document type the first type registered for the
    /// jurisdiction is used. Registry lookups fail with their own errors;
    /// failures of the parse itself are wrapped in
    /// [`ExtractorError::ParseFailed`].
    pub fn parse_document(
        &mut self,
        jurisdiction: &str,
        document_type: Option<&str>,
    ) -> Result<ParsedDocument> {
        let start_time = Local::now();
        let first_type = self
            .registry
            .types_for(jurisdiction)
            .first()
            .map(|t| (*t).to_string());
        let document_type = match document_type {
            Some(t) => t.to_string(),
            None => match first_type {
                Some(t) => {
                    tracing::info!(jurisdiction, document_type = %t, "Auto-selected document type");
                    t
                }
                None => {
                    let err = ExtractorError::UnknownJurisdiction {
                        jurisdiction: jurisdiction.to_lowercase(),
                        available: self.registry.jurisdictions().join(", "),
                    };
                    self.record_failure("unknown", jurisdiction, None, start_time, &err);
                    return Err(err);
                }
            },
        };

        let parser = match self
            .registry
            .create(jurisdiction, &document_type, self.config.clone())
        {
            Ok(parser) => parser,
            Err(err) => {
                self.record_failure("unknown", jurisdiction, Some(&document_type), start_time, &err);
                return Err(err);
            }
        };

        let file_path = parser.file_path();
        tracing::info!(jurisdiction, document_type = %document_type, path = %file_path.display(), "Starting parse");

        match parser.parse(&file_path) {
            Ok(document) => {
                let end_time = Local::now();
                let duration_seconds = seconds_between(start_time, end_time);
                tracing::info!(
                    path = %file_path.display(),
                    clauses = document.clause_count(),
                    duration_seconds,
                    "Parsed document"
                );
                self.record(ParseRecord {
                    file_path: file_path.display().to_string(),
                    jurisdiction: jurisdiction.to_string(),
                    document_type: Some(document_type),
                    start_time,
                    end_time,
                    duration_seconds,
                    clauses_extracted: Some(document.clause_count()),
                    success: true,
                    error: None,
                });
                Ok(document)
            }
            Err(source) => {
                let err = ExtractorError::ParseFailed {
                    jurisdiction: jurisdiction.to_string(),
                    document_type: document_type.clone(),
                    source: Box::new(source),
                };
                tracing::error!(error = %err, "Parse failed");
                self.record_failure(
                    &file_path.display().to_string(),
                    jurisdiction,
                    Some(&document_type),
                    start_time,
                    &err,
                );
                Err(err)
            }
        }
    }

    /// Parse every document type of a jurisdiction.
    ///
    /// Returns the documents that parsed, keyed by document type, as long as
    /// at least one did. Fails with [`ExtractorError::PartialBatchFailure`]
    /// listing every cause when none did.
    pub fn parse_all(&mut self, jurisdiction: &str) -> Result<Vec<(String, ParsedDocument)>> {
        let types: Vec<String> = self
            .registry
            .types_for(jurisdiction)
            .into_iter()
            .map(str::to_string)
            .collect();
        if types.is_empty() {
            return Err(ExtractorError::UnknownJurisdiction {
                jurisdiction: jurisdiction.to_lowercase(),
                available: self.registry.jurisdictions().join(", "),
            });
        }

        let mut documents = Vec::with_capacity(types.len());
        let mut failures = Vec::new();
        for document_type in types {
            match self.parse_document(jurisdiction, Some(&document_type)) {
                Ok(document) => documents.push((document_type, document)),
                Err(err) => {
                    let cause = match err {
                        ExtractorError::ParseFailed { source, .. } => source.to_string(),
                        other => other.to_string(),
                    };
                    failures.push(format!("{jurisdiction}:{document_type}: {cause}"));
                }
            }
        }

        if documents.is_empty() {
            return Err(ExtractorError::PartialBatchFailure {
                jurisdiction: jurisdiction.to_string(),
                failures,
            });
        }
        if !failures.is_empty() {
            tracing::warn!(jurisdiction, failed = failures.len(), "Some documents failed to parse");
        }
        Ok(documents)
    }

    /// Check whether a file can be parsed.
    ///
    /// With both a jurisdiction and a document type only that parser is
    /// asked; otherwise the registry detects one, optionally restricted to
    /// the jurisdiction. Never fails.
    #[must_use]
    pub fn validate_document(
        &self,
        path: &Path,
        jurisdiction: Option<&str>,
        document_type: Option<&str>,
    ) -> ValidationOutcome {
        if let (Some(j), Some(t)) = (jurisdiction, document_type) {
            let Ok(parser) = self.registry.create(j, t, self.config.clone()) else {
                return ValidationOutcome::invalid();
            };
            if !parser.validate(path) {
                return ValidationOutcome::invalid();
            }
            return ValidationOutcome {
                valid: true,
                jurisdiction: Some(j.to_string()),
                document_type: Some(t.to_string()),
            };
        }

        match self.registry.detect(path, jurisdiction, &self.config) {
            Ok(detection) => ValidationOutcome {
                valid: true,
                jurisdiction: Some(detection.jurisdiction),
                document_type: Some(detection.document_type),
            },
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "No parser accepts file");
                ValidationOutcome::invalid()
            }
        }
    }

    /// Document types per jurisdiction.
    #[must_use]
    pub fn supported_formats(&self) -> Vec<(&str, Vec<&str>)> {
        self.registry.combinations()
    }

    /// Summaries of every registered parser.
    #[must_use]
    pub fn parser_info(&self) -> Vec<RegisteredParser> {
        self.registry.parser_info()
    }

    /// Parse history, oldest first. With a limit only the most recent
    /// records are returned; a limit of zero returns everything.
    #[must_use]
    pub fn history(&self, limit: Option<usize>) -> Vec<&ParseRecord> {
        let skip = match limit.filter(|&n| n > 0) {
            Some(n) => self.history.len().saturating_sub(n),
            None => 0,
        };
        self.history.iter().skip(skip).collect()
    }

    /// Forget all recorded parses.
    pub fn clear_history(&mut self) {
        self.history.clear();
        tracing::info!("Parse history cleared");
    }

    fn record_failure(
        &mut self,
        file_path: &str,
        jurisdiction: &str,
        document_type: Option<&str>,
        start_time: DateTime<Local>,
        err: &ExtractorError,
    ) {
        let end_time = Local::now();
        self.record(ParseRecord {
            file_path: file_path.to_string(),
            jurisdiction: jurisdiction.to_string(),
            document_type: document_type.map(str::to_string),
            start_time,
            end_time,
            duration_seconds: seconds_between(start_time, end_time),
            clauses_extracted: None,
            success: false,
            error: Some(err.to_string()),
        });
    }

    fn record(&mut self, record: ParseRecord) {
        self.history.push_back(record);
        while self.history.len() > HISTORY_LIMIT {
            self.history.pop_front();
        }
    }
}

fn seconds_between(start: DateTime<Local>, end: DateTime<Local>) -> f64 {
    (end - start).num_microseconds().unwrap_or_default() as f64 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use serde_json::Map;

    use crate::parsers::RegulationParser;
    use crate::types::{Clause, DocumentMetadata, RegulationCountry};

    /// Parser that succeeds when its default path is "ok.pdf".
    struct StubParser {
        config: ParserConfig,
        document_type: &'static str,
        path: &'static str,
    }

    impl RegulationParser for StubParser {
        fn name(&self) -> &str {
            "StubParser"
        }

        fn version(&self) -> &str {
            "1.0.0"
        }

        fn config(&self) -> &ParserConfig {
            &self.config
        }

        fn default_file_path(&self) -> PathBuf {
            PathBuf::from(self.path)
        }

        fn supported_document_types(&self) -> Vec<String> {
            vec![self.document_type.to_string()]
        }

        fn validate(&self, path: &Path) -> bool {
            path == Path::new("ok.pdf")
        }

        fn parse(&self, path: &Path) -> Result<ParsedDocument> {
            if !self.validate(path) {
                return Err(ExtractorError::FileNotFound(path.to_path_buf()));
            }
            Ok(ParsedDocument {
                document_type: self.document_type.to_string(),
                version: None,
                country: RegulationCountry::Uk,
                clauses: vec![Clause::new("1", "1.1 G", "Firms should")],
                metadata: DocumentMetadata {
                    source_file: path.display().to_string(),
                    total_pages: 1,
                    sections_extracted: vec!["1".to_string()],
                    parser_version: None,
                    extraction_date: Local::now(),
                    country: RegulationCountry::Uk,
                    additional_info: Map::new(),
                },
            })
        }
    }

    fn service() -> ParserService {
        let mut registry = ParserRegistry::new();
        registry.register("uk", "GOOD", |config| {
            Box::new(StubParser {
                config,
                document_type: "UK_GOOD",
                path: "ok.pdf",
            })
        });
        registry.register("uk", "MISSING", |config| {
            Box::new(StubParser {
                config,
                document_type: "UK_MISSING",
                path: "missing.pdf",
            })
        });
        registry.register("eu", "MISSING", |config| {
            Box::new(StubParser {
                config,
                document_type: "EU_MISSING",
                path: "missing.pdf",
            })
        });
        ParserService::new(registry, ParserConfig::default())
    }

    #[test]
    fn test_parse_document_auto_selects_first_type() {
        let mut service = service();
        let document = service.parse_document("UK", None).unwrap();
        assert_eq!(document.document_type, "UK_GOOD");

        let history = service.history(None);
        assert_eq!(history.len(), 1);
        assert!(history[0].success);
        assert_eq!(history[0].clauses_extracted, Some(1));
        assert_eq!(history[0].file_path, "ok.pdf");
    }

    #[test]
    fn test_parse_failure_is_wrapped_and_recorded() {
        let mut service = service();
        let err = service.parse_document("uk", Some("MISSING")).unwrap_err();
        assert!(matches!(err, ExtractorError::ParseFailed { .. }));

        let history = service.history(None);
        assert!(!history[0].success);
        assert_eq!(history[0].file_path, "missing.pdf");
        assert!(history[0].error.as_deref().unwrap().contains("missing.pdf"));
    }

    #[test]
    fn test_registry_errors_pass_through() {
        let mut service = service();
        let err = service.parse_document("us", None).unwrap_err();
        assert!(matches!(err, ExtractorError::UnknownJurisdiction { .. }));
        let err = service.parse_document("uk", Some("NOPE")).unwrap_err();
        assert!(matches!(err, ExtractorError::UnknownDocumentType { .. }));
        assert_eq!(service.history(None).len(), 2);
        assert_eq!(service.history(None)[0].file_path, "unknown");
    }

    #[test]
    fn test_parse_all_keeps_successes() {
        let mut service = service();
        let documents = service.parse_all("uk").unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].0, "GOOD");
    }

    #[test]
    fn test_parse_all_fails_when_nothing_parses() {
        let mut service = service();
        let err = service.parse_all("eu").unwrap_err();
        assert_eq!(
            err.to_string(),
            "All parsers for jurisdiction 'eu' failed: eu:MISSING: Regulation file not found: missing.pdf"
        );
    }

    #[test]
    fn test_validate_document() {
        let service = service();
        let outcome = service.validate_document(Path::new("ok.pdf"), None, None);
        assert!(outcome.valid);
        assert_eq!(outcome.jurisdiction.as_deref(), Some("uk"));
        assert_eq!(outcome.document_type.as_deref(), Some("GOOD"));

        let outcome = service.validate_document(Path::new("ok.pdf"), Some("eu"), Some("MISSING"));
        assert!(outcome.valid);

        assert!(!service.validate_document(Path::new("other.pdf"), None, None).valid);
        assert!(!service.validate_document(Path::new("ok.pdf"), Some("us"), Some("X")).valid);
    }

    #[test]
    fn test_history_limit_and_clear() {
        let mut service = service();
        for _ in 0..3 {
            service.parse_document("uk", Some("GOOD")).unwrap();
        }
        assert_eq!(service.history(Some(2)).len(), 2);
        assert_eq!(service.history(Some(0)).len(), 3);

        service.clear_history();
        assert!(service.history(None).is_empty());
    }

    #[test]
    fn test_history_is_bounded() {
        let mut service = service();
        for _ in 0..HISTORY_LIMIT + 5 {
            let _ = service.parse_document("us", None);
        }
        assert_eq!(service.history(None).len(), HISTORY_LIMIT);
    }

    #[test]
    fn test_supported_formats() {
        let service = service();
        assert_eq!(
            service.supported_formats(),
            vec![("uk", vec!["GOOD", "MISSING"]), ("eu", vec!["MISSING"])]
        );
    }
}
