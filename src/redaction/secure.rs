//! Secure redaction strategy using MuPDF.
//!
//! This strategy physically removes text from PDF documents using MuPDF's
//! redaction API, ensuring that redacted content cannot be recovered.

use mupdf::pdf::{PdfAnnotationType, PdfPage};

use super::ffi;
use super::strategy::RedactionStrategy;
use super::RedactionMark;
use crate::error::{RedactorError, RedactorResult};

/// Secure redaction strategy that physically removes text using MuPDF.
///
/// For every mark this strategy:
/// 1. Creates a redaction annotation over each line fragment
/// 2. Applies the page's redactions (`pdf_redact_page`), which deletes the
///    covered glyphs and paints opaque black boxes
///
/// **Security**: Redacted text is completely removed and cannot be extracted.
#[derive(Debug, Clone, Default)]
pub struct SecureRedactionStrategy;

impl SecureRedactionStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl RedactionStrategy for SecureRedactionStrategy {
    fn apply(
        &self,
        page: &mut PdfPage,
        page_number: usize,
        marks: &[&RedactionMark],
    ) -> RedactorResult<usize> {
        if marks.is_empty() {
            return Ok(0);
        }

        for mark in marks {
            for area in mark.areas() {
                let annot = page
                    .create_annotation(PdfAnnotationType::Redact)
                    .map_err(|e| {
                        RedactorError::on_page(
                            "Failed to create redaction annotation",
                            page_number,
                            e,
                        )
                    })?;

                unsafe {
                    ffi::set_annotation_rect(&annot, (*area).into());
                }
            }
        }

        page.redact().map_err(|e| {
            RedactorError::on_page(
                format!("Failed to apply redactions on page {}", page_number),
                page_number,
                e,
            )
        })?;

        Ok(marks.len())
    }

    fn name(&self) -> &str {
        "SecureRedaction"
    }

    fn is_secure(&self) -> bool {
        true
    }
}
