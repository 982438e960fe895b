//! Redaction strategy trait.
//!
//! A strategy decides how marks are drawn on one copy of the document.
//! The secure strategy removes content; the highlight strategy leaves it
//! readable for review.

use mupdf::pdf::PdfPage;

use super::RedactionMark;
use crate::error::RedactorResult;

/// Draws marks onto a page of a derived copy.
pub trait RedactionStrategy: Send + Sync {
    /// Applies `marks` (all on this page) and returns how many were drawn.
    ///
    /// `page_number` is one-based and used for error context only.
    fn apply(
        &self,
        page: &mut PdfPage,
        page_number: usize,
        marks: &[&RedactionMark],
    ) -> RedactorResult<usize>;

    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Whether marked text is removed from the content stream.
    fn is_secure(&self) -> bool;
}
