//! Error types for the detection and redaction pipeline.
//!
//! Errors are categorised by where they originate (document, model runtime,
//! response parsing, PDF backend) so callers can decide whether re-invoking
//! makes sense. No variant renders an unmasked sensitive value.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Result type alias for pipeline operations.
pub type RedactorResult<T> = Result<T, RedactorError>;

/// Error type for all pipeline operations.
#[derive(Debug)]
pub enum RedactorError {
    /// Error occurred while reading or writing files
    Io { path: PathBuf, source: io::Error },

    /// The document cannot be opened: missing, corrupt or encrypted
    Document { path: PathBuf, reason: String },

    /// Error occurred during PDF processing
    PdfProcessing {
        message: String,
        page: Option<usize>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Text extraction failed
    TextExtraction { path: PathBuf, reason: String },

    /// Invalid configuration or parameters
    InvalidInput { parameter: String, reason: String },

    /// The model runtime is unreachable
    Connection { base_url: String, reason: String },

    /// The runtime is reachable but the requested model is not installed
    ModelUnavailable { model: String, installed: Vec<String> },

    /// The detection call exceeded its time budget
    DetectionTimeout { model: String, elapsed: Duration },

    /// Every parse recovery attempt failed on the model response
    MalformedResponse { attempts: usize, raw: String },

    /// Backend-specific error (MuPDF, HTTP, etc.)
    BackendError {
        backend: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl RedactorError {
    /// Raw model output attached to a [`RedactorError::MalformedResponse`].
    ///
    /// Kept out of `Display` since it may echo document content.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Self::MalformedResponse { raw, .. } => Some(raw),
            _ => None,
        }
    }

    pub(crate) fn mupdf(message: impl Into<String>, err: mupdf::Error) -> Self {
        Self::BackendError {
            backend: "MuPDF".to_string(),
            message: message.into(),
            source: Some(Box::new(err)),
        }
    }

    pub(crate) fn on_page(message: impl Into<String>, page: usize, err: mupdf::Error) -> Self {
        Self::PdfProcessing {
            message: message.into(),
            page: Some(page),
            source: Some(Box::new(err)),
        }
    }
}

impl fmt::Display for RedactorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "IO error for path '{}': {}", path.display(), source)
            }
            Self::Document { path, reason } => {
                write!(f, "Cannot open document '{}': {}", path.display(), reason)
            }
            Self::PdfProcessing { message, page, .. } => {
                if let Some(p) = page {
                    write!(f, "PDF processing error on page {}: {}", p, message)
                } else {
                    write!(f, "PDF processing error: {}", message)
                }
            }
            Self::TextExtraction { path, reason } => {
                write!(
                    f,
                    "Text extraction failed for '{}': {}",
                    path.display(),
                    reason
                )
            }
            Self::InvalidInput { parameter, reason } => {
                write!(f, "Invalid input for '{}': {}", parameter, reason)
            }
            Self::Connection { base_url, reason } => {
                write!(f, "Cannot reach model runtime at {}: {}", base_url, reason)
            }
            Self::ModelUnavailable { model, installed } => {
                if installed.is_empty() {
                    write!(f, "Model '{}' is not installed (no models found)", model)
                } else {
                    write!(
                        f,
                        "Model '{}' is not installed (available: {})",
                        model,
                        installed.join(", ")
                    )
                }
            }
            Self::DetectionTimeout { model, elapsed } => {
                write!(
                    f,
                    "Detection with '{}' timed out after {:.1}s",
                    model,
                    elapsed.as_secs_f64()
                )
            }
            Self::MalformedResponse { attempts, raw } => {
                write!(
                    f,
                    "Model response could not be parsed after {} attempts ({} chars)",
                    attempts,
                    raw.chars().count()
                )
            }
            Self::BackendError {
                backend, message, ..
            } => {
                write!(f, "{} backend error: {}", backend, message)
            }
        }
    }
}

impl std::error::Error for RedactorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::PdfProcessing { source, .. } | Self::BackendError { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

impl From<io::Error> for RedactorError {
    fn from(err: io::Error) -> Self {
        Self::BackendError {
            backend: "std::io".to_string(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_json::Error> for RedactorError {
    fn from(err: serde_json::Error) -> Self {
        Self::BackendError {
            backend: "serde_json".to_string(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RedactorError::InvalidInput {
            parameter: "model".to_string(),
            reason: "must not be empty".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid input for 'model': must not be empty");
    }

    #[test]
    fn test_malformed_response_hides_raw_text() {
        let err = RedactorError::MalformedResponse {
            attempts: 4,
            raw: "John Doe lives at 1 Main St".to_string(),
        };
        let display = err.to_string();
        assert!(!display.contains("John"));
        assert!(display.contains("4 attempts"));
        assert_eq!(err.raw_response(), Some("John Doe lives at 1 Main St"));
    }

    #[test]
    fn test_timeout_reports_elapsed() {
        let err = RedactorError::DetectionTimeout {
            model: "gemma3:1b".to_string(),
            elapsed: Duration::from_millis(300_250),
        };
        assert!(err.to_string().contains("300.2s") || err.to_string().contains("300.3s"));
    }
}
