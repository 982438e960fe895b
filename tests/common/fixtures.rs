//! Test fixtures and PDF builders.

use anyhow::{Context, Result};
use mupdf::pdf::{Encryption, PdfDocument as MupdfDocument, PdfWriteOptions};
use printpdf::*;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

const LINE_HEIGHT_MM: f32 = 8.0;
const TOP_MM: f32 = 270.0;

/// Builder for multi-page test PDFs with one text line per `use_text`.
///
/// # Example
///
/// ```no_run
/// # use anyhow::Result;
/// # fn main() -> Result<()> {
/// let pdf = TestPdfBuilder::new()
///     .with_line("Contact John Doe at john@email.com")
///     .new_page()
///     .with_line("Signed, John Doe")
///     .build(std::path::Path::new("/tmp/test.pdf"))?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TestPdfBuilder {
    title: String,
    pages: Vec<Vec<String>>,
}

impl TestPdfBuilder {
    pub fn new() -> Self {
        Self {
            title: "Test Document".to_string(),
            pages: vec![Vec::new()],
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    /// Adds a line of text to the current page.
    pub fn with_line(mut self, line: &str) -> Self {
        if let Some(page) = self.pages.last_mut() {
            page.push(line.to_string());
        }
        self
    }

    /// Starts a new page.
    pub fn new_page(mut self) -> Self {
        self.pages.push(Vec::new());
        self
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Builds the PDF and writes it to the specified path.
    pub fn build(self, output_path: &Path) -> Result<PathBuf> {
        let (doc, page1, layer1) =
            PdfDocument::new(&self.title, Mm(210.0), Mm(297.0), "Layer 1");
        let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;

        for (page_idx, lines) in self.pages.iter().enumerate() {
            let (page, layer) = if page_idx == 0 {
                (page1, layer1)
            } else {
                doc.add_page(Mm(210.0), Mm(297.0), "Layer 1")
            };
            let current_layer = doc.get_page(page).get_layer(layer);
            for (line_idx, line) in lines.iter().enumerate() {
                let y = TOP_MM - LINE_HEIGHT_MM * line_idx as f32;
                current_layer.use_text(line.as_str(), 12.0, Mm(20.0), Mm(y), &font);
            }
        }

        doc.save(&mut BufWriter::new(fs::File::create(output_path)?))?;
        Ok(output_path.to_path_buf())
    }
}

impl Default for TestPdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The one-line contact sheet used across the end-to-end tests.
pub const CONTACT_LINE: &str = "Contact John Doe at john@email.com or 555-123-4567.";

pub fn create_contact_sheet(path: &Path) -> Result<PathBuf> {
    TestPdfBuilder::new()
        .with_title("Contact Sheet")
        .with_line(CONTACT_LINE)
        .build(path)
}

/// Writes an AES-128 encrypted copy of `source` that opens with `password`.
pub fn encrypt_copy(source: &Path, target: &Path, password: &str) -> Result<PathBuf> {
    let doc = MupdfDocument::open(source.to_str().context("UTF-8 path")?)?;
    let mut options = PdfWriteOptions::default();
    options
        .set_encryption(Encryption::Aes128)
        .set_user_password(password)
        .set_owner_password(password);
    doc.save_with_options(target.to_str().context("UTF-8 path")?, options)?;
    Ok(target.to_path_buf())
}
