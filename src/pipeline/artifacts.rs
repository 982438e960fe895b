//! Input staging and output placement.
//!
//! Encoded input is decoded into a temp file that lives as long as the
//! [`StagedInput`]. Outputs are rendered into temp files in the target
//! directory and only persisted under their final names once both copies
//! are complete, so a failed run leaves nothing behind.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};
use tracing::{debug, warn};

use crate::error::{RedactorError, RedactorResult};

const ENCODED_STEM: &str = "document";

/// Where the document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Path(PathBuf),
    /// Base64, optionally as a `data:` URL.
    Encoded(String),
}

impl DocumentSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        DocumentSource::Path(path.into())
    }

    pub fn encoded(data: impl Into<String>) -> Self {
        DocumentSource::Encoded(data.into())
    }

    pub fn is_encoded(&self) -> bool {
        matches!(self, DocumentSource::Encoded(_))
    }
}

/// A produced document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Artifact {
    File(PathBuf),
    Encoded(String),
}

impl Artifact {
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Artifact::File(path) => Some(path),
            Artifact::Encoded(_) => None,
        }
    }

    pub fn decode(&self) -> RedactorResult<Vec<u8>> {
        match self {
            Artifact::File(path) => std::fs::read(path).map_err(|e| RedactorError::Io {
                path: path.clone(),
                source: e,
            }),
            Artifact::Encoded(data) => decode_base64(data),
        }
    }
}

/// The document on disk for the duration of a run.
#[derive(Debug)]
pub struct StagedInput {
    path: PathBuf,
    stem: String,
    _temp: Option<NamedTempFile>,
}

impl StagedInput {
    pub fn stage(source: &DocumentSource) -> RedactorResult<Self> {
        match source {
            DocumentSource::Path(path) => {
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| ENCODED_STEM.to_string());
                Ok(Self {
                    path: path.clone(),
                    stem,
                    _temp: None,
                })
            }
            DocumentSource::Encoded(data) => {
                let bytes = decode_base64(data)?;
                let mut temp = tempfile::Builder::new()
                    .prefix("redactai-input-")
                    .suffix(".pdf")
                    .tempfile()?;
                temp.write_all(&bytes)?;
                temp.flush()?;
                debug!(bytes = bytes.len(), "staged encoded input");
                Ok(Self {
                    path: temp.path().to_path_buf(),
                    stem: ENCODED_STEM.to_string(),
                    _temp: Some(temp),
                })
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }
}

/// Decodes base64, accepting a `data:...;base64,` prefix.
pub fn decode_base64(data: &str) -> RedactorResult<Vec<u8>> {
    let payload = match data.split_once(',') {
        Some((_, rest)) => rest,
        None => data,
    };
    let payload: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    if payload.is_empty() {
        return Err(RedactorError::InvalidInput {
            parameter: "document".to_string(),
            reason: "Encoded document is empty".to_string(),
        });
    }
    STANDARD
        .decode(payload.as_bytes())
        .map_err(|e| RedactorError::InvalidInput {
            parameter: "document".to_string(),
            reason: format!("Invalid base64: {}", e),
        })
}

pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Final file names for a document stem.
pub fn artifact_names(stem: &str) -> (String, String) {
    (
        format!("{}_redacted.pdf", stem),
        format!("{}_highlighted.pdf", stem),
    )
}

/// Picks the output directory: configured, else beside the input, else
/// the system temp directory when the first choice is not writable.
pub fn output_dir(input: &Path, configured: Option<&Path>) -> PathBuf {
    let preferred = configured.map(Path::to_path_buf).unwrap_or_else(|| {
        match input.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    });
    if is_writable(&preferred) {
        preferred
    } else {
        let fallback = std::env::temp_dir();
        warn!(
            preferred = %preferred.display(),
            fallback = %fallback.display(),
            "output directory not writable"
        );
        fallback
    }
}

fn is_writable(dir: &Path) -> bool {
    dir.is_dir() && NamedTempFile::new_in(dir).is_ok()
}

/// Temp outputs awaiting [`PendingOutputs::persist`].
pub struct PendingOutputs {
    dir: PathBuf,
    stem: String,
    redacted: NamedTempFile,
    preview: NamedTempFile,
}

impl PendingOutputs {
    pub fn new_in(dir: &Path, stem: &str) -> RedactorResult<Self> {
        let temp = || {
            tempfile::Builder::new()
                .prefix(".redactai-")
                .suffix(".pdf")
                .tempfile_in(dir)
                .map_err(|e| RedactorError::Io {
                    path: dir.to_path_buf(),
                    source: e,
                })
        };
        Ok(Self {
            dir: dir.to_path_buf(),
            stem: stem.to_string(),
            redacted: temp()?,
            preview: temp()?,
        })
    }

    pub fn redacted_path(&self) -> &Path {
        self.redacted.path()
    }

    pub fn preview_path(&self) -> &Path {
        self.preview.path()
    }

    /// Moves both copies to their final names.
    pub fn persist(self) -> RedactorResult<(PathBuf, PathBuf)> {
        let (redacted_name, preview_name) = artifact_names(&self.stem);
        let redacted = self.dir.join(redacted_name);
        let preview = self.dir.join(preview_name);

        for (temp, target) in [(self.redacted, &redacted), (self.preview, &preview)] {
            temp.persist(target).map_err(|e| RedactorError::Io {
                path: target.clone(),
                source: e.error,
            })?;
        }
        Ok((redacted, preview))
    }
}

/// Scratch directory for runs that return encoded artifacts.
pub struct EncodedOutputs {
    dir: TempDir,
}

impl EncodedOutputs {
    pub fn new() -> RedactorResult<Self> {
        Ok(Self {
            dir: tempfile::Builder::new().prefix("redactai-").tempdir()?,
        })
    }

    pub fn paths(&self) -> (PathBuf, PathBuf) {
        let (redacted, preview) = artifact_names(ENCODED_STEM);
        (self.dir.path().join(redacted), self.dir.path().join(preview))
    }

    /// Reads both copies back; the directory is removed on drop.
    pub fn collect(self) -> RedactorResult<(Artifact, Artifact)> {
        let (redacted, preview) = self.paths();
        let read = |path: PathBuf| {
            std::fs::read(&path)
                .map(|bytes| Artifact::Encoded(encode_base64(&bytes)))
                .map_err(|e| RedactorError::Io { path, source: e })
        };
        Ok((read(redacted)?, read(preview)?))
    }
}
