//! Sensitive data detection and redaction for PDF documents.
//!
//! A locally hosted language model reads each document and reports the
//! personal information it finds. Every reported value is then redacted
//! wherever it occurs verbatim, using MuPDF's redaction API so the text is
//! removed from the content stream rather than painted over. A second,
//! highlighted copy is produced for review.
//!
//! # Features
//!
//! - **Structured detection**: Ten fixed categories, enforced through the
//!   model runtime's JSON schema output and a four-step parse recovery chain
//! - **Safe reporting**: Reports and logs only ever carry masked values
//! - **Secure redaction**: Physically removes text from PDFs
//! - **Audit preview**: Highlighted copy with the text left intact
//! - **Custom overrides**: Exclude detected values or force literal ones
//!
//! # Architecture
//!
//! - [`document`]: Per-page text and glyph geometry via MuPDF
//! - [`detection`]: Model client, parse recovery, client registry
//! - [`domain`]: Categories, masking and deduplication
//! - [`redaction`]: Exact-match search, strategies and reports
//! - [`pipeline`]: Stage sequencing, overrides and artifacts
//! - [`error`]: Error taxonomy
//!
//! # Quick Start
//!
//! ```no_run
//! use redactai::{ClientRegistry, DocumentSource, Pipeline, PipelineConfig};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::default();
//! let registry = Arc::new(ClientRegistry::new(config.clone()));
//! let pipeline = Pipeline::new(registry, config);
//!
//! let outcome = pipeline.redact(&DocumentSource::path("contract.pdf"), None, false)?;
//! println!("{} marks", outcome.report.total_marks);
//! # Ok(())
//! # }
//! ```
//!
//! ## Masking
//!
//! ```
//! use redactai::domain::mask;
//!
//! assert_eq!(mask("John Doe"), "Jo***oe");
//! assert_eq!(mask("ab"), "**");
//! ```

pub mod config;
pub mod detection;
pub mod document;
pub mod domain;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod redaction;

pub use config::PipelineConfig;
pub use detection::{ClientRegistry, Detections, Detector, DetectorSource, OllamaClient};
pub use document::TextExtractor;
pub use domain::{DetectionCategory, SensitiveItem};
pub use error::{RedactorError, RedactorResult};
pub use pipeline::{
    Artifact, DocumentSource, Overrides, Pipeline, PipelineFailure, PreviewOpener, Stage,
};
pub use redaction::{RedactionReport, Redactor};
