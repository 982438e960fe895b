//! Custom assertions for PDF redaction testing.
//!
//! Text is read back through the crate's own extractor, which uses the
//! same MuPDF text layer a viewer's copy-paste would.

use mupdf::pdf::{PdfAnnotationType, PdfDocument, PdfPage};
use redactai::TextExtractor;
use std::path::Path;

/// Full text layer of a PDF, pages joined with newlines.
pub fn extract_text_or_panic(pdf_path: &Path) -> String {
    let pages = TextExtractor::new(pdf_path)
        .extract_all()
        .unwrap_or_else(|e| panic!("Failed to extract text from '{}': {}", pdf_path.display(), e));
    pages
        .into_iter()
        .map(|p| p.content)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Asserts that a pattern has been successfully redacted from a PDF.
///
/// # Panics
/// Panics if the pattern is still found in the PDF text.
pub fn assert_redacted(pdf_path: &Path, pattern: &str) {
    let text = extract_text_or_panic(pdf_path);
    assert!(
        !text.contains(pattern),
        "Pattern '{}' should be redacted but was found in output PDF at '{}'.\nExtracted text length: {} chars",
        pattern,
        pdf_path.display(),
        text.len()
    );
}

/// Asserts that a pattern has been preserved (not redacted) in a PDF.
///
/// # Panics
/// Panics if the pattern is not found in the PDF.
pub fn assert_preserved(pdf_path: &Path, pattern: &str) {
    let text = extract_text_or_panic(pdf_path);
    assert!(
        text.contains(pattern),
        "Pattern '{}' should be preserved but was not found in PDF at '{}'",
        pattern,
        pdf_path.display()
    );
}

/// Asserts that multiple patterns are all redacted.
pub fn assert_all_redacted(pdf_path: &Path, patterns: &[&str]) {
    let text = extract_text_or_panic(pdf_path);
    let found: Vec<&str> = patterns
        .iter()
        .copied()
        .filter(|p| text.contains(p))
        .collect();
    assert!(
        found.is_empty(),
        "Patterns {:?} should be redacted but were found in '{}'",
        found,
        pdf_path.display()
    );
}

/// Asserts that a PDF exists and parses.
pub fn assert_valid_pdf(pdf_path: &Path) {
    assert!(
        pdf_path.exists(),
        "PDF should exist at '{}'",
        pdf_path.display()
    );
    assert!(
        ::lopdf::Document::load(pdf_path).is_ok(),
        "PDF should be loadable at '{}'",
        pdf_path.display()
    );
}

/// Names of the entries in `dir`, sorted.
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read directory")
        .map(|e| e.expect("bad entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Number of annotations of `kind` on a zero-based page.
pub fn annotation_count(pdf_path: &Path, page_index: i32, kind: PdfAnnotationType) -> usize {
    let doc = PdfDocument::open(pdf_path.to_str().expect("UTF-8 path"))
        .unwrap_or_else(|e| panic!("Failed to open '{}': {}", pdf_path.display(), e));
    let page = doc
        .load_page(page_index)
        .unwrap_or_else(|e| panic!("Failed to load page {}: {}", page_index, e));
    let pdf_page = PdfPage::try_from(page).expect("PDF page");
    pdf_page
        .annotations()
        .filter(|annot| annot.r#type().map(|t| t == kind).unwrap_or(false))
        .count()
}
