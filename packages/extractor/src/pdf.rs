//! Page text provider: turns a PDF file into per-page plain text.
//!
//! The segmentation engine never looks at PDF structure; it only consumes the
//! `PageText` sequence produced here.

use std::path::Path;

use lopdf::Document;
use unicode_normalization::UnicodeNormalization;

use crate::config::ParserConfig;
use crate::error::{ExtractorError, Result};
use crate::types::PageText;

/// Options for page text extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Horizontal tolerance for joining glyphs into words.
    pub x_tolerance: u32,

    /// Vertical tolerance for joining glyphs into lines.
    pub y_tolerance: u32,

    /// First page to return (1-based); earlier pages are skipped.
    pub start_page: u32,
}

impl ExtractOptions {
    /// Build options from a parser configuration.
    #[must_use]
    pub fn from_config(config: &ParserConfig) -> Self {
        Self {
            x_tolerance: config.pdf_x_tolerance,
            y_tolerance: config.pdf_y_tolerance,
            start_page: config.pdf_start_page,
        }
    }

    /// Override the first page.
    #[must_use]
    pub fn with_start_page(mut self, start_page: u32) -> Self {
        self.start_page = start_page;
        self
    }
}

/// Source of per-page text for a document.
///
/// Implementations open the file for the duration of one call only.
pub trait PageTextProvider: Send + Sync {
    /// Total number of pages in the document.
    fn page_count(&self, path: &Path) -> Result<usize>;

    /// Raw text of the first `limit` pages, used for content sniffing.
    fn leading_pages(&self, path: &Path, limit: usize) -> Result<Vec<PageText>>;

    /// Text of every page from `options.start_page` on, in page order.
    fn extract_pages(&self, path: &Path, options: &ExtractOptions) -> Result<Vec<PageText>>;
}

/// Page text provider backed by `lopdf`.
///
/// lopdf emits text in content-stream order, so the tolerances in
/// [`ExtractOptions`] are not applied here. They are still recorded in the
/// document metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfProvider;

impl LopdfProvider {
    fn load(path: &Path) -> Result<Document> {
        if !path.is_file() {
            return Err(ExtractorError::FileNotFound(path.to_path_buf()));
        }
        Document::load(path).map_err(|source| ExtractorError::Pdf {
            path: path.to_path_buf(),
            source,
        })
    }

    fn page_text(doc: &Document, page_number: u32) -> String {
        match doc.extract_text(&[page_number]) {
            Ok(text) => normalize_page_text(&text),
            Err(e) => {
                tracing::debug!(page = page_number, error = %e, "No extractable text on page");
                String::new()
            }
        }
    }
}

impl PageTextProvider for LopdfProvider {
    fn page_count(&self, path: &Path) -> Result<usize> {
        let doc = Self::load(path)?;
        Ok(doc.get_pages().len())
    }

    fn leading_pages(&self, path: &Path, limit: usize) -> Result<Vec<PageText>> {
        let doc = Self::load(path)?;
        Ok(doc
            .get_pages()
            .keys()
            .take(limit)
            .map(|&n| PageText::new(n, Self::page_text(&doc, n)))
            .collect())
    }

    fn extract_pages(&self, path: &Path, options: &ExtractOptions) -> Result<Vec<PageText>> {
        let doc = Self::load(path)?;
        Ok(doc
            .get_pages()
            .keys()
            .filter(|&&n| n >= options.start_page)
            .map(|&n| PageText::new(n, Self::page_text(&doc, n)))
            .collect())
    }
}

/// Normalize extracted text: drop superscript footnote markers, fold
/// compatibility characters (ligatures such as "ﬁ", non-breaking spaces) and
/// unify line endings.
#[must_use]
pub fn normalize_page_text(text: &str) -> String {
    text.chars()
        .filter(|&c| !is_footnote_marker(c))
        .nfkc()
        .collect::<String>()
        .replace("\r\n", "\n")
        .replace('\r', "\n")
}

fn is_footnote_marker(c: char) -> bool {
    matches!(c, '\u{b9}' | '\u{b2}' | '\u{b3}' | '\u{2070}'..='\u{207f}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// Write a PDF with `page_count` pages, each showing one line of text.
    fn write_pdf(path: &Path, page_count: u32) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for n in 1..=page_count {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(format!("Page {n}"))]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => i64::from(page_count),
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn test_page_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("three.pdf");
        write_pdf(&path, 3);

        assert_eq!(LopdfProvider.page_count(&path).unwrap(), 3);
    }

    #[test]
    fn test_extract_pages_respects_start_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("five.pdf");
        write_pdf(&path, 5);

        let options = ExtractOptions {
            x_tolerance: 2,
            y_tolerance: 3,
            start_page: 3,
        };
        let pages = LopdfProvider.extract_pages(&path, &options).unwrap();
        let numbers: Vec<u32> = pages.iter().map(|p| p.page_number).collect();
        assert_eq!(numbers, vec![3, 4, 5]);

        let leading = LopdfProvider.leading_pages(&path, 2).unwrap();
        assert_eq!(leading.len(), 2);
        assert_eq!(leading[0].page_number, 1);
    }

    #[test]
    fn test_missing_file() {
        let err = LopdfProvider
            .page_count(Path::new("/nonexistent/file.pdf"))
            .unwrap_err();
        assert!(matches!(err, ExtractorError::FileNotFound(_)));
    }

    #[test]
    fn test_not_a_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, "plain text, not a PDF").unwrap();

        let err = LopdfProvider.page_count(&path).unwrap_err();
        assert!(matches!(err, ExtractorError::Pdf { .. }));
    }

    #[test]
    fn test_normalize_page_text() {
        assert_eq!(normalize_page_text("ﬁrm\r\nrules"), "firm\nrules");
        assert_eq!(normalize_page_text("a\u{a0}b"), "a b");
        // Typographic apostrophes survive
        assert_eq!(normalize_page_text("firms’ treatment"), "firms’ treatment");
    }

    #[test]
    fn test_normalize_drops_footnote_markers() {
        assert_eq!(
            normalize_page_text("monitoring framework²\n¹² Footnote text"),
            "monitoring framework\n Footnote text"
        );
        // Ordinary digits are untouched
        assert_eq!(normalize_page_text("240. Institutions"), "240. Institutions");
    }
}
