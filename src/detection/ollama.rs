//! Blocking client for an Ollama runtime.

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{build_prompt, parse, response_schema, Detections, Detector, ModelCatalog, RuntimeStatus};
use crate::config::PipelineConfig;
use crate::error::{RedactorError, RedactorResult};


/// A model installed in the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default, rename(deserialize = "modified_at"))]
    pub modified: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    format: Value,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Value,
}

/// Detection client bound to one model on one runtime.
///
/// Cheap to share: the underlying connection pool is reused across calls.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: Client,
    base_url: String,
    model: String,
    detection_timeout: Duration,
    health_timeout: Duration,
    temperature: f32,
}

impl OllamaClient {
    pub fn new(model: &str, base_url: &str, config: &PipelineConfig) -> RedactorResult<Self> {
        let http = Client::builder()
            .connect_timeout(config.health_timeout)
            .build()
            .map_err(|e| RedactorError::BackendError {
                backend: "reqwest".to_string(),
                message: "Failed to build HTTP client".to_string(),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            detection_timeout: config.detection_timeout,
            health_timeout: config.health_timeout,
            temperature: config.temperature,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn connection_error(&self, err: reqwest::Error) -> RedactorError {
        RedactorError::Connection {
            base_url: self.base_url.clone(),
            reason: err.to_string(),
        }
    }

    fn generate(&self, text: &str) -> RedactorResult<Detections> {
        let request = GenerateRequest {
            model: &self.model,
            prompt: build_prompt(text),
            stream: false,
            format: response_schema(),
            options: GenerateOptions {
                temperature: self.temperature,
            },
        };

        let started = Instant::now();
        let response = self
            .http
            .post(format!("{}/api/generate", self.base_url))
            .timeout(self.detection_timeout)
            .json(&request)
            .send()
            .map_err(|e| self.transport_error(e, started))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| self.transport_error(e, started))?;
        debug!(
            model = %self.model,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            bytes = body.len(),
            "generate returned"
        );

        if status == StatusCode::NOT_FOUND {
            return Err(RedactorError::ModelUnavailable {
                model: self.model.clone(),
                installed: Vec::new(),
            });
        }
        if !status.is_success() {
            return Err(http_failure(status, &body));
        }

        let envelope: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| RedactorError::BackendError {
                backend: "ollama".to_string(),
                message: "unexpected response envelope".to_string(),
                source: Some(Box::new(e)),
            })?;

        match envelope.response {
            Value::String(raw) => parse::parse_detections(&raw),
            Value::Object(object) => Ok(parse::validate(object)),
            other => Err(RedactorError::MalformedResponse {
                attempts: 0,
                raw: other.to_string(),
            }),
        }
    }

    fn transport_error(&self, err: reqwest::Error, started: Instant) -> RedactorError {
        if err.is_timeout() {
            RedactorError::DetectionTimeout {
                model: self.model.clone(),
                elapsed: started.elapsed(),
            }
        } else if err.is_connect() {
            self.connection_error(err)
        } else {
            RedactorError::BackendError {
                backend: "ollama".to_string(),
                message: "generate request failed".to_string(),
                source: Some(Box::new(err)),
            }
        }
    }
}

impl ModelCatalog for OllamaClient {
    fn list_available_models(&self) -> RedactorResult<Vec<ModelInfo>> {
        let response = self
            .http
            .get(format!("{}/api/tags", self.base_url))
            .timeout(self.health_timeout)
            .send()
            .map_err(|e| self.connection_error(e))?;

        if !response.status().is_success() {
            return Err(RedactorError::Connection {
                base_url: self.base_url.clone(),
                reason: format!("model listing returned HTTP {}", response.status()),
            });
        }

        let tags: TagsResponse = response.json().map_err(|e| RedactorError::BackendError {
            backend: "ollama".to_string(),
            message: "unexpected model listing".to_string(),
            source: Some(Box::new(e)),
        })?;
        Ok(tags.models)
    }
}

impl Detector for OllamaClient {
    fn model(&self) -> &str {
        &self.model
    }

    fn status(&self) -> RuntimeStatus {
        match self.list_available_models() {
            Ok(models) => RuntimeStatus {
                reachable: true,
                model_available: models.iter().any(|m| same_model(&m.name, &self.model)),
            },
            Err(e) => {
                warn!(base_url = %self.base_url, error = %e, "model runtime unreachable");
                RuntimeStatus {
                    reachable: false,
                    model_available: false,
                }
            }
        }
    }

    fn ensure_ready(&self) -> RedactorResult<()> {
        let models = self.list_available_models()?;
        if models.iter().any(|m| same_model(&m.name, &self.model)) {
            info!(model = %self.model, base_url = %self.base_url, "model runtime ready");
            Ok(())
        } else {
            Err(RedactorError::ModelUnavailable {
                model: self.model.clone(),
                installed: models.into_iter().map(|m| m.name).collect(),
            })
        }
    }

    fn detect(&self, text: &str) -> RedactorResult<Detections> {
        self.generate(text)
    }
}

/// Compares model names, treating a missing tag as `:latest`.
pub fn same_model(installed: &str, requested: &str) -> bool {
    fn tagged(name: &str) -> String {
        if name.contains(':') {
            name.to_string()
        } else {
            format!("{name}:latest")
        }
    }
    tagged(installed.trim()) == tagged(requested.trim())
}

/// Error for a non-2xx reply. The body may echo the prompt, so only its
/// size is kept.
fn http_failure(status: StatusCode, body: &str) -> RedactorError {
    RedactorError::BackendError {
        backend: "ollama".to_string(),
        message: format!("HTTP {} ({} byte body)", status, body.len()),
        source: None,
    }
}
