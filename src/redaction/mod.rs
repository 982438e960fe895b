//! Exact-text redaction and preview generation.
//!
//! The [`Redactor`] finds every verbatim occurrence of each sensitive item,
//! then renders two independent copies of the input: a redacted copy where
//! the text is removed, and a preview where it is highlighted. The input
//! file is only ever read.

mod ffi;
pub mod highlight;
pub mod report;
pub mod search;
pub mod secure;
pub mod strategy;

pub use highlight::HighlightStrategy;
pub use report::{AnalysisReport, MaskedItem, RedactionReport};
pub use search::{find_marks, MIN_SEARCH_CHARS};
pub use secure::SecureRedactionStrategy;
pub use strategy::RedactionStrategy;

use mupdf::pdf::PdfPage;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use crate::document::{self, PageLayout, Rect, TextExtractor};
use crate::domain::SensitiveItem;
use crate::error::{RedactorError, RedactorResult};

/// One verbatim occurrence of an item on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct RedactionMark {
    /// Zero-based page index.
    pub page: usize,
    pub bounding_box: Rect,
    /// One rectangle per line the match spans.
    pub fragments: Vec<Rect>,
    pub item: SensitiveItem,
}

/// Redaction service coordinating the secure and preview strategies.
pub struct Redactor {
    secure: Box<dyn RedactionStrategy>,
    preview: Box<dyn RedactionStrategy>,
    password: Option<String>,
}

impl Redactor {
    pub fn new() -> Self {
        Self {
            secure: Box::new(SecureRedactionStrategy::new()),
            preview: Box::new(HighlightStrategy::new()),
            password: None,
        }
    }

    pub fn with_password(mut self, password: Option<String>) -> Self {
        self.password = password;
        self
    }

    pub fn with_preview_strategy(mut self, strategy: Box<dyn RedactionStrategy>) -> Self {
        self.preview = strategy;
        self
    }

    /// Reads the glyph layer of every page of `input`.
    pub fn layouts(&self, input: &Path) -> RedactorResult<Vec<PageLayout>> {
        TextExtractor::new(input)
            .with_password(self.password.clone())
            .layouts()
    }

    /// Locates all marks without writing anything.
    pub fn plan(
        &self,
        input: &Path,
        items: &[SensitiveItem],
    ) -> RedactorResult<(usize, Vec<RedactionMark>)> {
        let layouts = self.layouts(input)?;
        let marks = find_marks(&layouts, items);
        Ok((layouts.len(), marks))
    }

    /// Writes the redacted copy and the preview copy, returning the report.
    ///
    /// Neither output may be the input path.
    pub fn redact(
        &self,
        input: &Path,
        redacted_out: &Path,
        preview_out: &Path,
        items: &[SensitiveItem],
    ) -> RedactorResult<RedactionReport> {
        for output in [redacted_out, preview_out] {
            if output == input {
                return Err(RedactorError::InvalidInput {
                    parameter: "output".to_string(),
                    reason: "Output path would overwrite the input document".to_string(),
                });
            }
        }

        let (page_count, marks) = self.plan(input, items)?;
        debug!(items = items.len(), marks = marks.len(), "located marks");

        for (strategy, output) in [
            (self.secure.as_ref(), redacted_out),
            (self.preview.as_ref(), preview_out),
        ] {
            let applied = self.write_copy(strategy, input, output, &marks)?;
            info!(
                strategy = strategy.name(),
                secure = strategy.is_secure(),
                marks = applied,
                "wrote {}",
                output.display()
            );
        }

        Ok(RedactionReport::build(page_count, items, &marks))
    }

    fn write_copy(
        &self,
        strategy: &dyn RedactionStrategy,
        input: &Path,
        output: &Path,
        marks: &[RedactionMark],
    ) -> RedactorResult<usize> {
        // No marks - just copy the file
        if marks.is_empty() {
            std::fs::copy(input, output).map_err(|e| RedactorError::Io {
                path: output.to_path_buf(),
                source: e,
            })?;
            return Ok(0);
        }

        let mut by_page: BTreeMap<usize, Vec<&RedactionMark>> = BTreeMap::new();
        for mark in marks {
            by_page.entry(mark.page).or_default().push(mark);
        }

        let pdf_doc = document::open_pdf(input, self.password.as_deref())?;
        let mut applied = 0;
        for (page_idx, page_marks) in &by_page {
            let page_number = page_idx + 1;
            let page = pdf_doc
                .load_page(*page_idx as i32)
                .map_err(|e| RedactorError::on_page("Failed to load page", page_number, e))?;

            // Convert to PDF page for annotation support
            let mut pdf_page = PdfPage::try_from(page.clone())
                .map_err(|e| RedactorError::on_page("Not a PDF page", page_number, e))?;

            applied += strategy.apply(&mut pdf_page, page_number, page_marks)?;
        }

        let output_str = output.to_str().ok_or_else(|| RedactorError::InvalidInput {
            parameter: "output".to_string(),
            reason: "Path contains invalid UTF-8".to_string(),
        })?;
        pdf_doc
            .save(output_str)
            .map_err(|e| RedactorError::PdfProcessing {
                message: format!("Failed to save {} copy", strategy.name()),
                page: None,
                source: Some(Box::new(e)),
            })?;

        Ok(applied)
    }
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redactor_refuses_to_overwrite_input() {
        let input = Path::new("/tmp/in.pdf");
        let err = Redactor::new()
            .redact(input, input, Path::new("/tmp/preview.pdf"), &[])
            .unwrap_err();
        assert!(matches!(err, RedactorError::InvalidInput { .. }));
    }

    #[test]
    fn test_missing_input_is_document_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = Redactor::new()
            .redact(
                &dir.path().join("missing.pdf"),
                &dir.path().join("a.pdf"),
                &dir.path().join("b.pdf"),
                &[],
            )
            .unwrap_err();
        assert!(matches!(err, RedactorError::Document { .. }));
    }
}
