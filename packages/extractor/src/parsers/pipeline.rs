//! The shared parse pipeline, driven by a [`JurisdictionProfile`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use serde_json::{Map, Value};

use super::profile::{JurisdictionProfile, MainSectionRule};
use super::RegulationParser;
use crate::config::ParserConfig;
use crate::error::{ExtractorError, Result};
use crate::pdf::{ExtractOptions, LopdfProvider, PageTextProvider};
use crate::segmentation::{
    main_section_name, page_for, ClauseAnnotations, ClauseSegmenter, SectionLocator,
    SubsectionQuery,
};
use crate::types::{Clause, DocumentMetadata, PageText, ParsedDocument, SectionTarget};

/// Key under which per-clause annotations are stored in `additional_info`.
pub const CLAUSE_ANNOTATIONS_KEY: &str = "clause_annotations";

/// A regulation parser defined entirely by its profile.
pub struct ProfileParser {
    profile: JurisdictionProfile,
    config: ParserConfig,
    provider: Arc<dyn PageTextProvider>,
}

impl ProfileParser {
    /// Create a parser reading PDFs with lopdf.
    #[must_use]
    pub fn new(profile: JurisdictionProfile, config: ParserConfig) -> Self {
        Self::with_provider(profile, config, Arc::new(LopdfProvider))
    }

    /// Create a parser with a custom page text provider.
    #[must_use]
    pub fn with_provider(
        profile: JurisdictionProfile,
        config: ParserConfig,
        provider: Arc<dyn PageTextProvider>,
    ) -> Self {
        Self {
            profile,
            config,
            provider,
        }
    }

    fn start_page(&self) -> u32 {
        self.profile.start_page.resolve(&self.config)
    }

    /// Extract and clean the pages to segment.
    fn load_pages(&self, path: &Path) -> Result<Vec<PageText>> {
        let start_page = self.start_page();
        let options = ExtractOptions::from_config(&self.config).with_start_page(start_page);
        let pages = self.provider.extract_pages(path, &options)?;
        if pages.is_empty() {
            return Err(ExtractorError::NoPages {
                path: path.to_path_buf(),
                start_page,
            });
        }

        Ok(match &self.profile.cleaner {
            Some(cleaner) => pages.iter().map(|p| cleaner.clean_page(p)).collect(),
            None => pages,
        })
    }

    /// Clauses of one section, or none if the section is not found.
    fn extract_section(
        &self,
        pages: &[PageText],
        target: &SectionTarget,
        annotations: &mut Map<String, Value>,
    ) -> Result<Vec<Clause>> {
        let Some(span) =
            SectionLocator::new(&self.profile.sections).locate(pages, &target.id, &target.title)?
        else {
            tracing::debug!(section = %target.id, "Section not found");
            return Ok(Vec::new());
        };
        tracing::debug!(section = %target.id, pages = ?span.pages, "Located section");

        let raw_clauses = ClauseSegmenter::new(&self.profile.grammar).segment(&span.text, &target.id)?;

        let mut current_subsection: Option<String> = None;
        let mut clauses = Vec::with_capacity(raw_clauses.len());
        for raw in raw_clauses {
            let query = SubsectionQuery {
                section_text: &span.text,
                offset: raw.offset,
            };
            if let Some(found) = self.profile.subsection.subsection_name(&query) {
                current_subsection = Some(found);
            }

            let main_section = match self.profile.main_section {
                MainSectionRule::HeadingLookup => main_section_name(&raw.number, pages, &span.pages),
                MainSectionRule::SectionTitle => Some(target.title.clone()),
            };

            if self.profile.annotate_clauses {
                let found = ClauseAnnotations::extract(&raw.content);
                if !found.is_empty() {
                    annotations.insert(raw.clause_id.clone(), serde_json::to_value(found)?);
                }
            }

            let page_number = page_for(&raw.number, &span.pages, pages);
            clauses.push(
                Clause::new(target.id.as_str(), raw.clause_id, raw.content)
                    .with_type(raw.clause_type)
                    .with_main_section_name(main_section.unwrap_or_default())
                    .with_subsection_name(current_subsection.clone().unwrap_or_default())
                    .with_page_number(page_number),
            );
        }

        Ok(clauses)
    }

    fn metadata(
        &self,
        path: &Path,
        total_pages: usize,
        sections: &[SectionTarget],
        annotations: Map<String, Value>,
    ) -> DocumentMetadata {
        let mut additional_info = Map::new();
        additional_info.insert("start_page".to_string(), self.start_page().into());
        additional_info.insert("x_tolerance".to_string(), self.config.pdf_x_tolerance.into());
        additional_info.insert("y_tolerance".to_string(), self.config.pdf_y_tolerance.into());
        for (key, value) in &self.profile.additional_info {
            additional_info.insert(key.clone(), value.clone());
        }
        if self.profile.annotate_clauses {
            additional_info.insert(CLAUSE_ANNOTATIONS_KEY.to_string(), Value::Object(annotations));
        }

        DocumentMetadata {
            source_file: path.display().to_string(),
            total_pages,
            sections_extracted: sections.iter().map(|s| s.id.clone()).collect(),
            parser_version: Some(self.profile.parser_version.clone()),
            extraction_date: Local::now(),
            country: self.profile.country,
            additional_info,
        }
    }
}

impl RegulationParser for ProfileParser {
    fn name(&self) -> &str {
        &self.profile.parser_name
    }

    fn version(&self) -> &str {
        &self.profile.parser_version
    }

    fn config(&self) -> &ParserConfig {
        &self.config
    }

    fn default_file_path(&self) -> PathBuf {
        self.profile.default_file_path.clone()
    }

    fn supported_document_types(&self) -> Vec<String> {
        vec![self.profile.document_type.clone()]
    }

    fn validate(&self, path: &Path) -> bool {
        if !path.is_file() {
            return false;
        }
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if !is_pdf {
            return false;
        }

        let rules = &self.profile.validation;
        match self.provider.page_count(path) {
            Ok(count) if count >= rules.min_pages => {}
            Ok(count) => {
                tracing::debug!(path = %path.display(), count, "Too few pages");
                return false;
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Cannot read document");
                return false;
            }
        }

        match self.provider.leading_pages(path, rules.sniff_pages) {
            Ok(pages) => rules.any_marker(&pages),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Cannot read document");
                false
            }
        }
    }

    fn parse(&self, path: &Path) -> Result<ParsedDocument> {
        self.config.validate()?;
        if !path.exists() {
            return Err(ExtractorError::FileNotFound(path.to_path_buf()));
        }
        if !self.validate(path) {
            return Err(ExtractorError::InvalidDocument {
                path: path.to_path_buf(),
                document_type: self.profile.document_type.clone(),
            });
        }

        let pages = self.load_pages(path)?;
        let sections = self.profile.sections_for(&self.config);

        let mut clauses = Vec::new();
        let mut annotations = Map::new();
        for target in sections {
            clauses.extend(self.extract_section(&pages, target, &mut annotations)?);
        }

        let metadata = self.metadata(path, pages.len(), sections, annotations);
        Ok(ParsedDocument {
            document_type: self.profile.document_type.clone(),
            version: self.profile.version.clone(),
            country: self.profile.country,
            clauses,
            metadata,
        })
    }
}
