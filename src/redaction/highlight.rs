//! Preview strategy: translucent highlights, text left intact.

use mupdf::pdf::{PdfAnnotationType, PdfPage};

use super::ffi;
use super::strategy::RedactionStrategy;
use super::RedactionMark;
use crate::error::{RedactorError, RedactorResult};

/// Yellow.
const DEFAULT_COLOR: [f32; 3] = [1.0, 1.0, 0.0];
const DEFAULT_OPACITY: f32 = 0.45;

/// Adds a highlight annotation over every mark for audit review.
#[derive(Debug, Clone)]
pub struct HighlightStrategy {
    color: [f32; 3],
    opacity: f32,
}

impl HighlightStrategy {
    pub fn new() -> Self {
        Self {
            color: DEFAULT_COLOR,
            opacity: DEFAULT_OPACITY,
        }
    }

    /// RGB components in `0.0..=1.0`.
    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = color.map(|c| c.clamp(0.0, 1.0));
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }
}

impl Default for HighlightStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl RedactionStrategy for HighlightStrategy {
    fn apply(
        &self,
        page: &mut PdfPage,
        page_number: usize,
        marks: &[&RedactionMark],
    ) -> RedactorResult<usize> {
        for mark in marks {
            let annot = page
                .create_annotation(PdfAnnotationType::Highlight)
                .map_err(|e| {
                    RedactorError::on_page("Failed to create highlight annotation", page_number, e)
                })?;

            unsafe {
                for area in mark.areas() {
                    ffi::add_annotation_quad(&annot, (*area).into());
                }
                ffi::set_annotation_color(&annot, self.color);
                ffi::set_annotation_opacity(&annot, self.opacity);
                ffi::update_annotation(&annot);
            }
        }
        Ok(marks.len())
    }

    fn name(&self) -> &str {
        "Highlight"
    }

    fn is_secure(&self) -> bool {
        false
    }
}
