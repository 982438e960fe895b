//! Reusable detection clients keyed by model and runtime.
//!
//! A [`ClientRegistry`] is created once at process start, handed to the
//! pipeline and dropped at shutdown. Entries are never invalidated while
//! it lives.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

use super::{Detector, ModelCatalog, OllamaClient};
use crate::config::PipelineConfig;
use crate::error::{RedactorError, RedactorResult};

/// Supplies a detector for a (model, base URL) pair.
pub trait DetectorSource: Send + Sync {
    fn detector(&self, model: &str, base_url: &str) -> RedactorResult<Arc<dyn Detector>>;

    /// Model listing for a runtime, when the source can provide one.
    fn catalog(&self, base_url: &str) -> RedactorResult<Arc<dyn ModelCatalog>> {
        Err(RedactorError::InvalidInput {
            parameter: "base_url".to_string(),
            reason: format!("model listing is not supported for {}", base_url),
        })
    }
}

/// Process-lifetime cache of [`OllamaClient`]s.
#[derive(Debug)]
pub struct ClientRegistry {
    config: PipelineConfig,
    clients: Mutex<HashMap<(String, String), Arc<OllamaClient>>>,
}

impl ClientRegistry {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached client, creating it on first use.
    pub fn client(&self, model: &str, base_url: &str) -> RedactorResult<Arc<OllamaClient>> {
        let key = (model.to_string(), base_url.trim_end_matches('/').to_string());
        let mut clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(client) = clients.get(&key) {
            return Ok(Arc::clone(client));
        }

        let client = Arc::new(OllamaClient::new(&key.0, &key.1, &self.config)?);
        debug!(model = %key.0, base_url = %key.1, "created detection client");
        clients.insert(key, Arc::clone(&client));
        Ok(client)
    }

    pub fn len(&self) -> usize {
        self.clients.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DetectorSource for ClientRegistry {
    fn detector(&self, model: &str, base_url: &str) -> RedactorResult<Arc<dyn Detector>> {
        let client: Arc<dyn Detector> = self.client(model, base_url)?;
        Ok(client)
    }

    fn catalog(&self, base_url: &str) -> RedactorResult<Arc<dyn ModelCatalog>> {
        let client: Arc<dyn ModelCatalog> = self.client(&self.config.default_model, base_url)?;
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clients_are_reused() {
        let registry = ClientRegistry::new(PipelineConfig::default());
        let a = registry.client("gemma3:1b", "http://localhost:11434").unwrap();
        let b = registry.client("gemma3:1b", "http://localhost:11434/").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_distinct_models_get_distinct_clients() {
        let registry = Arc::new(ClientRegistry::new(PipelineConfig::default()));
        let handles: Vec<_> = ["gemma3:1b", "llama3.2:3b", "mistral:7b"]
            .into_iter()
            .map(|model| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    let client = registry.client(model, "http://localhost:11434").unwrap();
                    client.model().to_string()
                })
            })
            .collect();

        let mut models: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        models.sort();
        assert_eq!(models, vec!["gemma3:1b", "llama3.2:3b", "mistral:7b"]);
        assert_eq!(registry.len(), 3);
    }
}
