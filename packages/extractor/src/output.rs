//! Writes parsed documents to JSON or YAML files.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::{OutputFormat, ParserConfig};
use crate::error::Result;
use crate::types::ParsedDocument;

/// Writes parsed documents into one output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentWriter {
    output_dir: PathBuf,
    format: OutputFormat,
    include_metadata: bool,
}

impl DocumentWriter {
    /// Create a writer with metadata included.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            output_dir: output_dir.into(),
            format,
            include_metadata: true,
        }
    }

    /// Create a writer using the format and metadata settings of a config.
    #[must_use]
    pub fn from_config(output_dir: impl Into<PathBuf>, config: &ParserConfig) -> Self {
        Self::new(output_dir, config.output_format).with_metadata(config.include_metadata)
    }

    /// Include or omit the `metadata` block.
    #[must_use]
    pub fn with_metadata(mut self, include_metadata: bool) -> Self {
        self.include_metadata = include_metadata;
        self
    }

    /// Target directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// File name for a document: `<jurisdiction>_<document type>_parsed.<ext>`.
    ///
    /// # Examples
    /// ```
    /// use regclause_extractor::config::OutputFormat;
    /// use regclause_extractor::output::DocumentWriter;
    ///
    /// let writer = DocumentWriter::new("output", OutputFormat::Yaml);
    /// assert_eq!(writer.file_name("uk", "FCA_CONC"), "uk_FCA_CONC_parsed.yaml");
    /// ```
    #[must_use]
    pub fn file_name(&self, jurisdiction: &str, document_type: &str) -> String {
        format!(
            "{}_{document_type}_parsed.{}",
            jurisdiction.to_lowercase(),
            self.format.extension()
        )
    }

    /// Serialize a document.
    pub fn render(&self, document: &ParsedDocument) -> Result<String> {
        let mut value = serde_json::to_value(document)?;
        if !self.include_metadata {
            if let Value::Object(map) = &mut value {
                map.remove("metadata");
            }
        }

        let mut content = match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&value)?,
            OutputFormat::Yaml => serde_yaml_ng::to_string(&value)?,
        };
        if !content.ends_with('\n') {
            content.push('\n');
        }
        Ok(content)
    }

    /// Write a document and return the path of the new file.
    ///
    /// The directory is created if needed. Content goes to a temporary file
    /// first and is renamed into place once synced.
    pub fn write(
        &self,
        document: &ParsedDocument,
        jurisdiction: &str,
        document_type: &str,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let file_name = self.file_name(jurisdiction, document_type);
        let output_file = self.output_dir.join(&file_name);
        let temp_file = self.output_dir.join(format!(".{file_name}.tmp"));

        let content = self.render(document)?;
        {
            let mut file = File::create(&temp_file)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }

        // On Windows, rename fails if the destination already exists
        #[cfg(target_os = "windows")]
        if output_file.exists() {
            fs::remove_file(&output_file)?;
        }

        fs::rename(&temp_file, &output_file)?;
        tracing::debug!(path = %output_file.display(), "Wrote document");

        Ok(output_file)
    }
}
