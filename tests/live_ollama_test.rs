//! End-to-end runs against a real Ollama instance.
//!
//! Ignored by default. Run with a model pulled locally:
//!
//! ```text
//! OLLAMA_BASE_URL=http://localhost:11434 REDACTAI_MODEL=gemma3:1b \
//!     cargo test --test live_ollama_test -- --ignored
//! ```

mod common;

use anyhow::Result;
use common::*;
use redactai::{ClientRegistry, DocumentSource, Pipeline, PipelineConfig};
use std::sync::Arc;
use tempfile::TempDir;

fn live_pipeline(output_dir: &std::path::Path) -> Pipeline {
    let mut config = PipelineConfig::default().with_output_dir(output_dir);
    if let Ok(base_url) = std::env::var("OLLAMA_BASE_URL") {
        config = config.with_base_url(base_url);
    }
    if let Ok(model) = std::env::var("REDACTAI_MODEL") {
        config = config.with_default_model(model);
    }
    Pipeline::new(Arc::new(ClientRegistry::new(config.clone())), config)
}

#[test]
#[ignore] // Requires a running Ollama with the model pulled
fn test_live_status() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let status = live_pipeline(temp_dir.path()).check_status(None, None)?;
    assert!(status.reachable);
    assert!(status.model_available);
    Ok(())
}

#[test]
#[ignore] // Requires a running Ollama with the model pulled
fn test_live_redacts_contact_sheet() -> Result<()> {
    let _lock = mupdf_lock();
    let temp_dir = TempDir::new()?;
    let input = create_contact_sheet(&temp_dir.path().join("contact.pdf"))?;

    let outcome = live_pipeline(temp_dir.path()).redact(&DocumentSource::path(&input), None, false)?;

    let redacted = outcome
        .redacted_document
        .as_path()
        .expect("on-disk artifact")
        .to_path_buf();
    assert_valid_pdf(&redacted);
    // Small models vary; the email is the one value every model reports.
    assert_redacted(&redacted, "john@email.com");
    assert!(outcome.report.total_marks >= 1);
    Ok(())
}
