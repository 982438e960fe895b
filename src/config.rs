//! Pipeline configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{RedactorError, RedactorResult};

/// Default base URL of the local model runtime.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default model identifier used when a caller does not name one.
pub const DEFAULT_MODEL: &str = "gemma3:1b";

/// Settings shared by every pipeline invocation.
///
/// Loadable from a TOML file; every field has a default so a partial
/// file is valid.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub base_url: String,
    pub default_model: String,
    #[serde(with = "secs")]
    pub detection_timeout: Duration,
    #[serde(with = "secs")]
    pub health_timeout: Duration,
    pub temperature: f32,
    /// Upper bound on page text sent in a single detection call.
    pub max_batch_chars: usize,
    /// Directory for artifacts; beside the original when unset.
    pub output_dir: Option<PathBuf>,
    /// Password for encrypted documents.
    pub password: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            detection_timeout: Duration::from_secs(300),
            health_timeout: Duration::from_secs(5),
            temperature: 0.1,
            max_batch_chars: 24_000,
            output_dir: None,
            password: None,
        }
    }
}

impl PipelineConfig {
    /// Reads a configuration file.
    pub fn from_file(path: &Path) -> RedactorResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| RedactorError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&raw).map_err(|e| RedactorError::InvalidInput {
            parameter: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_detection_timeout(mut self, timeout: Duration) -> Self {
        self.detection_timeout = timeout;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Resolves an optional per-call model to a concrete identifier.
    pub fn model_or_default<'a>(&'a self, model: Option<&'a str>) -> &'a str {
        match model {
            Some(m) if !m.trim().is_empty() => m,
            _ => &self.default_model,
        }
    }
}

mod secs {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.base_url, "http://localhost:11434");
        assert_eq!(config.detection_timeout, Duration::from_secs(300));
        assert_eq!(config.model_or_default(None), DEFAULT_MODEL);
        assert_eq!(config.model_or_default(Some("  ")), DEFAULT_MODEL);
        assert_eq!(config.model_or_default(Some("llama3.2:3b")), "llama3.2:3b");
    }

    #[test]
    fn test_partial_toml() {
        let config: PipelineConfig = toml::from_str(
            r#"
            default_model = "mistral:7b"
            detection_timeout = 60
            "#,
        )
        .unwrap();
        assert_eq!(config.default_model, "mistral:7b");
        assert_eq!(config.detection_timeout, Duration::from_secs(60));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }
}
