//! Document access: opening PDFs and reading their text layer.
//!
//! All text comes from MuPDF's structured text, so the text the detector
//! sees and the text the redactor searches are produced the same way.

pub mod layout;

pub use layout::{Glyph, PageLayout, Rect};

use mupdf::pdf::PdfDocument;
use mupdf::{Document, Page, TextPageOptions};
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::domain::PageText;
use crate::error::{RedactorError, RedactorResult};

/// Opens a PDF for modification, unlocking it when encrypted.
pub fn open_pdf(path: &Path, password: Option<&str>) -> RedactorResult<PdfDocument> {
    let path_str = utf8_path(path)?;
    ensure_exists(path)?;

    let mut doc = PdfDocument::open(path_str).map_err(|e| RedactorError::Document {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    unlock(&mut doc, path, password)?;
    Ok(doc)
}

fn open_document(path: &Path, password: Option<&str>) -> RedactorResult<Document> {
    let path_str = utf8_path(path)?;
    ensure_exists(path)?;

    let mut doc = Document::open(path_str).map_err(|e| RedactorError::Document {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    unlock(&mut doc, path, password)?;
    Ok(doc)
}

fn unlock(doc: &mut Document, path: &Path, password: Option<&str>) -> RedactorResult<()> {
    let needs_password = doc.needs_password().map_err(|e| RedactorError::Document {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if !needs_password {
        return Ok(());
    }

    let Some(password) = password else {
        return Err(RedactorError::Document {
            path: path.to_path_buf(),
            reason: "document is encrypted and no password was supplied".to_string(),
        });
    };
    let unlocked = doc
        .authenticate(password)
        .map_err(|e| RedactorError::Document {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    if unlocked {
        Ok(())
    } else {
        Err(RedactorError::Document {
            path: path.to_path_buf(),
            reason: "password rejected".to_string(),
        })
    }
}

fn utf8_path(path: &Path) -> RedactorResult<&str> {
    path.to_str().ok_or_else(|| RedactorError::InvalidInput {
        parameter: "path".to_string(),
        reason: "Path contains invalid UTF-8".to_string(),
    })
}

fn ensure_exists(path: &Path) -> RedactorResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(RedactorError::Document {
            path: path.to_path_buf(),
            reason: "file does not exist".to_string(),
        })
    }
}

/// Number of pages in an open document.
pub fn page_count(doc: &Document) -> RedactorResult<usize> {
    let count = doc
        .page_count()
        .map_err(|e| RedactorError::mupdf("Failed to get page count", e))?;
    Ok(count.max(0) as usize)
}

/// Reads the glyph layer of a loaded page.
pub fn page_layout(page: &Page, page_index: usize) -> RedactorResult<PageLayout> {
    // Without PRESERVE_IMAGES the structured text holds text blocks only.
    let text_page = page
        .to_text_page(TextPageOptions::empty())
        .map_err(|e| RedactorError::on_page("Failed to read text layer", page_index + 1, e))?;

    let mut lines = Vec::new();
    for block in text_page.blocks() {
        for line in block.lines() {
            let glyphs: Vec<Glyph> = line
                .chars()
                .filter_map(|c| {
                    c.char().map(|ch| Glyph {
                        ch,
                        bounds: Rect::from(c.quad()),
                    })
                })
                .collect();
            if !glyphs.is_empty() {
                lines.push(glyphs);
            }
        }
    }
    Ok(PageLayout::from_lines(page_index, lines))
}

/// Reads per-page text from a PDF.
///
/// Iteration is lazy: each call to [`TextExtractor::pages`] opens the
/// document, yields pages on demand and closes it when dropped.
#[derive(Debug, Clone)]
pub struct TextExtractor {
    path: PathBuf,
    password: Option<String>,
}

impl TextExtractor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            password: None,
        }
    }

    pub fn with_password(mut self, password: Option<String>) -> Self {
        self.password = password;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Iterates over every page.
    pub fn pages(&self) -> RedactorResult<Pages> {
        let doc = open_document(&self.path, self.password.as_deref())?;
        let count = page_count(&doc)?;
        Ok(Pages {
            doc,
            path: self.path.clone(),
            next: 0,
            end: count,
        })
    }

    /// Iterates over a zero-based page range, clamped to the document.
    pub fn pages_in(&self, range: Range<usize>) -> RedactorResult<Pages> {
        let mut pages = self.pages()?;
        pages.end = range.end.min(pages.end);
        pages.next = range.start.min(pages.end);
        Ok(pages)
    }

    /// Glyph layers of every page, in page order.
    pub fn layouts(&self) -> RedactorResult<Vec<PageLayout>> {
        let pages = self.pages()?;
        (0..pages.end).map(|i| pages.layout(i)).collect()
    }

    /// Collects every page; fails on the first unreadable one.
    pub fn extract_all(&self) -> RedactorResult<Vec<PageText>> {
        let pages: Vec<PageText> = self.pages()?.collect::<RedactorResult<_>>()?;
        debug!(
            pages = pages.len(),
            chars = pages.iter().map(|p| p.content.len()).sum::<usize>(),
            "extracted text"
        );
        Ok(pages)
    }
}

/// Lazy page iterator returned by [`TextExtractor`].
pub struct Pages {
    doc: Document,
    path: PathBuf,
    next: usize,
    end: usize,
}

impl Pages {
    fn layout(&self, page_index: usize) -> RedactorResult<PageLayout> {
        let page = self
            .doc
            .load_page(page_index as i32)
            .map_err(|e| RedactorError::TextExtraction {
                path: self.path.clone(),
                reason: format!("page {}: {}", page_index + 1, e),
            })?;
        page_layout(&page, page_index)
    }

    fn read(&self, page_index: usize) -> RedactorResult<PageText> {
        let layout = self.layout(page_index)?;
        Ok(PageText::new(page_index, layout.text()))
    }
}

impl Iterator for Pages {
    type Item = RedactorResult<PageText>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let page_index = self.next;
        self.next += 1;
        Some(self.read(page_index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}
