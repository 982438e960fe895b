//! In-process detector returning canned results.

use redactai::detection::{Detections, Detector, DetectorSource, RuntimeStatus};
use redactai::{DetectionCategory, RedactorError, RedactorResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// What the scripted detector does when asked.
#[derive(Debug, Clone)]
pub enum Script {
    Found(Vec<(DetectionCategory, &'static str)>),
    /// Raw model text run through the real parse chain.
    Raw(&'static str),
    TimesOut,
    Unreachable,
}

pub struct ScriptedDetector {
    script: Script,
    calls: AtomicUsize,
}

impl ScriptedDetector {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Detector for ScriptedDetector {
    fn model(&self) -> &str {
        "scripted"
    }

    fn status(&self) -> RuntimeStatus {
        let reachable = !matches!(self.script, Script::Unreachable);
        RuntimeStatus {
            reachable,
            model_available: reachable,
        }
    }

    fn ensure_ready(&self) -> RedactorResult<()> {
        match self.script {
            Script::Unreachable => Err(RedactorError::Connection {
                base_url: "http://127.0.0.1:9".to_string(),
                reason: "connection refused".to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn detect(&self, _text: &str) -> RedactorResult<Detections> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Found(found) => {
                let mut detections = Detections::empty();
                for (category, value) in found {
                    detections.push(*category, *value);
                }
                Ok(detections)
            }
            Script::Raw(raw) => redactai::detection::parse::parse_detections(raw),
            Script::TimesOut => Err(RedactorError::DetectionTimeout {
                model: "scripted".to_string(),
                elapsed: Duration::from_secs(300),
            }),
            Script::Unreachable => unreachable!("detect after failed readiness check"),
        }
    }
}

/// Hands out the same scripted detector for every model.
pub struct ScriptedSource {
    pub detector: Arc<ScriptedDetector>,
}

impl ScriptedSource {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            detector: Arc::new(ScriptedDetector::new(script)),
        })
    }
}

impl DetectorSource for ScriptedSource {
    fn detector(&self, _model: &str, _base_url: &str) -> RedactorResult<Arc<dyn Detector>> {
        let detector: Arc<dyn Detector> = self.detector.clone();
        Ok(detector)
    }
}

/// Detections for the contact sheet fixture.
pub fn contact_findings() -> Script {
    Script::Found(vec![
        (DetectionCategory::Names, "John Doe"),
        (DetectionCategory::Emails, "john@email.com"),
        (DetectionCategory::Phones, "555-123-4567"),
    ])
}
