//! Sensitive data detection through a locally hosted language model.
//!
//! The model is asked for a JSON object holding exactly the ten
//! [`DetectionCategory`] keys. Its answer goes through the recovery chain
//! in [`parse`] and is validated into [`Detections`].

pub mod ollama;
pub mod parse;
pub mod registry;

pub use ollama::{ModelInfo, OllamaClient};
pub use registry::{ClientRegistry, DetectorSource};

use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::domain::{fold_key, DetectionCategory, PageText, RawDetection};
use crate::error::RedactorResult;

/// Validated detector output: every category present, possibly empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detections {
    by_category: BTreeMap<DetectionCategory, Vec<String>>,
}

impl Detections {
    pub fn empty() -> Self {
        Self {
            by_category: DetectionCategory::ALL
                .iter()
                .map(|c| (*c, Vec::new()))
                .collect(),
        }
    }

    pub fn push(&mut self, category: DetectionCategory, value: impl Into<String>) {
        self.by_category
            .entry(category)
            .or_default()
            .push(value.into());
    }

    pub fn get(&self, category: DetectionCategory) -> &[String] {
        self.by_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Categories in enumerated order with their values.
    pub fn iter(&self) -> impl Iterator<Item = (DetectionCategory, &[String])> {
        self.by_category.iter().map(|(c, v)| (*c, v.as_slice()))
    }

    pub fn total(&self) -> usize {
        self.by_category.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl Default for Detections {
    fn default() -> Self {
        Self::empty()
    }
}

/// Reachability of the model runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeStatus {
    pub reachable: bool,
    pub model_available: bool,
}

/// A model able to find sensitive values in text.
pub trait Detector: Send + Sync {
    /// Model identifier.
    fn model(&self) -> &str;

    /// Lightweight reachability probe; never fails.
    fn status(&self) -> RuntimeStatus;

    /// Fails fast with `Connection` or `ModelUnavailable`.
    fn ensure_ready(&self) -> RedactorResult<()>;

    /// One blocking detection call for a piece of text.
    fn detect(&self, text: &str) -> RedactorResult<Detections>;
}

/// Lists the models a runtime can serve.
pub trait ModelCatalog: Send + Sync {
    fn list_available_models(&self) -> RedactorResult<Vec<ModelInfo>>;
}

/// JSON schema sent as the structured output `format`.
pub fn response_schema() -> Value {
    let mut properties = Map::new();
    for category in DetectionCategory::ALL {
        properties.insert(
            category.as_str().to_string(),
            json!({ "type": "array", "items": { "type": "string" } }),
        );
    }
    let required: Vec<&str> = DetectionCategory::ALL.iter().map(|c| c.as_str()).collect();
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

/// Prompt asking for every category, verbatim values only.
pub fn build_prompt(text: &str) -> String {
    let mut prompt = String::from(
        "Extract all sensitive and personal information from the following text.\n\
         Copy every value exactly as it appears in the text.\n\n\
         Categories to find:\n",
    );
    for category in DetectionCategory::ALL {
        prompt.push_str(&format!("- {}: {}\n", category.as_str(), category.description()));
    }
    prompt.push_str(
        "\nReturn only a JSON object with exactly these keys, each an array of strings \
         (use [] when nothing is found).\n\nText to analyze:\n---\n",
    );
    prompt.push_str(text);
    prompt.push_str("\n---");
    prompt
}

/// Runs detection over a document, one call per batch of pages.
///
/// Consecutive pages are joined until `max_batch_chars` would be exceeded.
/// Calls are issued sequentially. Each value is attributed to the first
/// page of its batch containing it (case-insensitively), or to the first
/// page of the batch.
pub fn detect_pages(
    detector: &dyn Detector,
    pages: &[PageText],
    max_batch_chars: usize,
) -> RedactorResult<Vec<RawDetection>> {
    let batches = batch_pages(pages, max_batch_chars);
    if batches.is_empty() {
        warn!("document has no extractable text; nothing to analyze");
        return Ok(Vec::new());
    }

    let mut raw = Vec::new();
    for (n, batch) in batches.iter().enumerate() {
        let text = batch
            .iter()
            .map(|p| p.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        info!(
            model = detector.model(),
            batch = n + 1,
            of = batches.len(),
            first_page = batch[0].page_number(),
            chars = text.len(),
            "requesting detection"
        );
        let detections = detector.detect(&text)?;
        debug!(found = detections.total(), batch = n + 1, "detection batch complete");

        let folded: Vec<String> = batch.iter().map(|p| p.content.to_lowercase()).collect();
        for (category, values) in detections.iter() {
            for value in values {
                let needle = fold_key(value);
                let page = batch
                    .iter()
                    .zip(&folded)
                    .find(|(_, text)| !needle.is_empty() && text.contains(&needle))
                    .map(|(p, _)| p.page_index)
                    .unwrap_or(batch[0].page_index);
                raw.push(RawDetection {
                    category,
                    value: value.clone(),
                    page,
                });
            }
        }
    }
    Ok(raw)
}

fn batch_pages(pages: &[PageText], max_batch_chars: usize) -> Vec<Vec<&PageText>> {
    let mut batches: Vec<Vec<&PageText>> = Vec::new();
    let mut current: Vec<&PageText> = Vec::new();
    let mut size = 0;

    for page in pages.iter().filter(|p| !p.content.trim().is_empty()) {
        if !current.is_empty() && size + page.content.len() > max_batch_chars {
            batches.push(std::mem::take(&mut current));
            size = 0;
        }
        size += page.content.len();
        current.push(page);
    }
    if !current.is_empty() {
        batches.push(current);
    }
    batches
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Canned {
        calls: Mutex<Vec<String>>,
        answer: Detections,
    }

    impl Detector for Canned {
        fn model(&self) -> &str {
            "canned"
        }
        fn status(&self) -> RuntimeStatus {
            RuntimeStatus {
                reachable: true,
                model_available: true,
            }
        }
        fn ensure_ready(&self) -> RedactorResult<()> {
            Ok(())
        }
        fn detect(&self, text: &str) -> RedactorResult<Detections> {
            self.calls.lock().unwrap().push(text.to_string());
            Ok(self.answer.clone())
        }
    }

    #[test]
    fn test_schema_requires_every_category() {
        let schema = response_schema();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 10);
        assert!(schema["properties"]["ids_ssns"].is_object());
    }

    #[test]
    fn test_prompt_embeds_text() {
        let prompt = build_prompt("hello world");
        assert!(prompt.contains("hello world"));
        assert!(prompt.contains("dates_of_birth"));
    }

    #[test]
    fn test_batching_respects_budget() {
        let pages = vec![
            PageText::new(0, "a".repeat(10)),
            PageText::new(1, "   "),
            PageText::new(2, "b".repeat(10)),
            PageText::new(3, "c".repeat(25)),
        ];
        let batches = batch_pages(&pages, 20);
        let shape: Vec<Vec<usize>> = batches
            .iter()
            .map(|b| b.iter().map(|p| p.page_index).collect())
            .collect();
        assert_eq!(shape, vec![vec![0, 2], vec![3]]);
    }

    #[test]
    fn test_page_attribution() {
        let mut answer = Detections::empty();
        answer.push(DetectionCategory::Names, "JOHN DOE");
        answer.push(DetectionCategory::Names, "Ghost Person");
        let detector = Canned {
            calls: Mutex::new(Vec::new()),
            answer,
        };
        let pages = vec![
            PageText::new(0, "Cover page"),
            PageText::new(1, "Signed by John Doe"),
        ];

        let raw = detect_pages(&detector, &pages, 10_000).unwrap();
        assert_eq!(detector.calls.lock().unwrap().len(), 1);
        assert_eq!(raw[0].page, 1);
        assert_eq!(raw[1].page, 0);
    }

    #[test]
    fn test_empty_document_makes_no_calls() {
        let detector = Canned {
            calls: Mutex::new(Vec::new()),
            answer: Detections::empty(),
        };
        let raw = detect_pages(&detector, &[PageText::new(0, "\n")], 100).unwrap();
        assert!(raw.is_empty());
        assert!(detector.calls.lock().unwrap().is_empty());
    }
}
