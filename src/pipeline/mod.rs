//! Pipeline orchestration.
//!
//! A run moves through `Extracting → Detecting → Processing → Redacting →
//! Done`. Analyze runs stop after `Processing`. Any error moves the run to
//! `Failed` and is returned as a [`PipelineFailure`] carrying the stage it
//! happened in. Temp files are scoped to the call and removed on every
//! exit path.

pub mod artifacts;
pub mod overrides;
pub mod progress;

pub use artifacts::{Artifact, DocumentSource};
pub use overrides::{OverrideSummary, Overrides};
pub use progress::{ProgressEvent, ProgressListener, ProgressSummary, ProgressTracker, Stage};

use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::detection::{detect_pages, DetectorSource, ModelInfo, RuntimeStatus};
use crate::document::TextExtractor;
use crate::domain::{deduplicate, PageText, SensitiveItem};
use crate::error::{RedactorError, RedactorResult};
use crate::redaction::{AnalysisReport, RedactionReport, Redactor};
use artifacts::{EncodedOutputs, PendingOutputs, StagedInput};

/// Which operation a run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Analyze,
    Redact,
    Custom,
}

/// Opens a produced document for a human to look at.
pub trait PreviewOpener: Send + Sync {
    fn open_for_preview(&self, path: &Path) -> RedactorResult<()>;
}

/// A run that did not reach `Done`.
#[derive(Debug, thiserror::Error)]
#[error("pipeline failed while {stage}: {source}")]
pub struct PipelineFailure {
    pub stage: Stage,
    #[source]
    pub source: RedactorError,
    pub progress: ProgressSummary,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeOutcome {
    pub model: String,
    pub report: AnalysisReport,
    pub progress: ProgressSummary,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactOutcome {
    pub model: String,
    pub redacted_document: Artifact,
    pub preview_document: Artifact,
    pub report: RedactionReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overrides: Option<OverrideSummary>,
    pub progress: ProgressSummary,
}

/// Sequences extraction, detection, processing and redaction.
pub struct Pipeline {
    detectors: Arc<dyn DetectorSource>,
    config: PipelineConfig,
    opener: Option<Box<dyn PreviewOpener>>,
    listener: Option<ProgressListener>,
}

/// State threaded through one run.
struct Run {
    tracker: ProgressTracker,
}

impl Run {
    fn enter(&mut self, stage: Stage) {
        self.tracker.enter(stage);
    }

    fn fail(&mut self, source: RedactorError) -> PipelineFailure {
        let stage = self.tracker.current().unwrap_or(Stage::Failed);
        self.tracker.enter(Stage::Failed);
        PipelineFailure {
            stage,
            source,
            progress: self.tracker.summary(),
        }
    }
}

impl Pipeline {
    pub fn new(detectors: Arc<dyn DetectorSource>, config: PipelineConfig) -> Self {
        Self {
            detectors,
            config,
            opener: None,
            listener: None,
        }
    }

    /// Opens the original and the redacted copy after each file-producing
    /// redact run.
    pub fn with_preview_opener(mut self, opener: Box<dyn PreviewOpener>) -> Self {
        self.opener = Some(opener);
        self
    }

    pub fn with_progress_listener(mut self, listener: ProgressListener) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Detects and reports; writes no artifacts.
    pub fn analyze(
        &self,
        source: &DocumentSource,
        model: Option<&str>,
    ) -> Result<AnalyzeOutcome, PipelineFailure> {
        let model = self.config.model_or_default(model).to_string();
        let mut run = self.start(Mode::Analyze, &model);

        let (_staged, pages) = self.extract(&mut run, source)?;
        let items = self.detect_items(&mut run, &pages, &model)?;
        let report = AnalysisReport::build(&pages, &items);
        run.enter(Stage::Done);

        Ok(AnalyzeOutcome {
            model,
            report,
            progress: run.tracker.summary(),
        })
    }

    /// Detects, then writes the redacted and preview copies.
    pub fn redact(
        &self,
        source: &DocumentSource,
        model: Option<&str>,
        return_encoded: bool,
    ) -> Result<RedactOutcome, PipelineFailure> {
        self.run_redaction(Mode::Redact, source, model, None, return_encoded)
    }

    /// Like [`Pipeline::redact`], with caller overrides applied to the
    /// detected set before redacting.
    pub fn redact_custom(
        &self,
        source: &DocumentSource,
        overrides: &Overrides,
        model: Option<&str>,
        return_encoded: bool,
    ) -> Result<RedactOutcome, PipelineFailure> {
        self.run_redaction(Mode::Custom, source, model, Some(overrides), return_encoded)
    }

    /// Reachability of the runtime and presence of the model.
    pub fn check_status(
        &self,
        model: Option<&str>,
        base_url: Option<&str>,
    ) -> RedactorResult<RuntimeStatus> {
        let model = self.config.model_or_default(model);
        let base_url = base_url.unwrap_or(&self.config.base_url);
        Ok(self.detectors.detector(model, base_url)?.status())
    }

    pub fn list_models(&self, base_url: Option<&str>) -> RedactorResult<Vec<ModelInfo>> {
        let base_url = base_url.unwrap_or(&self.config.base_url);
        self.detectors.catalog(base_url)?.list_available_models()
    }

    fn start(&self, mode: Mode, model: &str) -> Run {
        info!(mode = ?mode, model = %model, "pipeline started");
        Run {
            tracker: ProgressTracker::new().with_listener(self.listener.clone()),
        }
    }

    /// Stages the input and reads its text. The returned [`StagedInput`]
    /// must outlive every use of the document.
    fn extract(
        &self,
        run: &mut Run,
        source: &DocumentSource,
    ) -> Result<(StagedInput, Vec<PageText>), PipelineFailure> {
        run.enter(Stage::Extracting);
        let staged = StagedInput::stage(source).map_err(|e| run.fail(e))?;
        let pages = TextExtractor::new(staged.path())
            .with_password(self.config.password.clone())
            .extract_all()
            .map_err(|e| run.fail(e))?;
        Ok((staged, pages))
    }

    fn detect_items(
        &self,
        run: &mut Run,
        pages: &[PageText],
        model: &str,
    ) -> Result<Vec<SensitiveItem>, PipelineFailure> {
        run.enter(Stage::Detecting);
        let raw = self
            .detectors
            .detector(model, &self.config.base_url)
            .and_then(|detector| {
                detector.ensure_ready()?;
                detect_pages(detector.as_ref(), pages, self.config.max_batch_chars)
            })
            .map_err(|e| run.fail(e))?;

        run.enter(Stage::Processing);
        let items = deduplicate(&raw);
        info!(raw = raw.len(), unique = items.len(), "processed detections");
        Ok(items)
    }

    fn run_redaction(
        &self,
        mode: Mode,
        source: &DocumentSource,
        model: Option<&str>,
        overrides: Option<&Overrides>,
        return_encoded: bool,
    ) -> Result<RedactOutcome, PipelineFailure> {
        let model = self.config.model_or_default(model).to_string();
        let mut run = self.start(mode, &model);

        let (staged, pages) = self.extract(&mut run, source)?;
        let mut items = self.detect_items(&mut run, &pages, &model)?;

        let override_summary = overrides.map(|o| {
            let (adjusted, summary) = o.apply(std::mem::take(&mut items));
            items = adjusted;
            info!(
                excluded = summary.excluded,
                included = summary.included,
                remaining = items.len(),
                "applied overrides"
            );
            summary
        });
        if items.is_empty() {
            info!("nothing to redact; copies will match the original");
        }

        run.enter(Stage::Redacting);
        let redactor = Redactor::new().with_password(self.config.password.clone());
        let encoded = return_encoded || source.is_encoded();
        let (redacted_document, preview_document, report) = if encoded {
            self.write_encoded(&redactor, &staged, &items)
        } else {
            self.write_files(&redactor, &staged, &items)
        }
        .map_err(|e| run.fail(e))?;
        run.enter(Stage::Done);

        if !encoded {
            self.open_previews(staged.path(), &redacted_document);
        }

        Ok(RedactOutcome {
            model,
            redacted_document,
            preview_document,
            report,
            overrides: override_summary,
            progress: run.tracker.summary(),
        })
    }

    fn write_files(
        &self,
        redactor: &Redactor,
        staged: &StagedInput,
        items: &[SensitiveItem],
    ) -> RedactorResult<(Artifact, Artifact, RedactionReport)> {
        let dir = artifacts::output_dir(staged.path(), self.config.output_dir.as_deref());
        let pending = PendingOutputs::new_in(&dir, staged.stem())?;
        let report = redactor.redact(
            staged.path(),
            pending.redacted_path(),
            pending.preview_path(),
            items,
        )?;
        let (redacted, preview) = pending.persist()?;
        info!(
            redacted = %redacted.display(),
            preview = %preview.display(),
            marks = report.total_marks,
            "saved artifacts"
        );
        Ok((Artifact::File(redacted), Artifact::File(preview), report))
    }

    fn write_encoded(
        &self,
        redactor: &Redactor,
        staged: &StagedInput,
        items: &[SensitiveItem],
    ) -> RedactorResult<(Artifact, Artifact, RedactionReport)> {
        let outputs = EncodedOutputs::new()?;
        let (redacted, preview) = outputs.paths();
        let report = redactor.redact(staged.path(), &redacted, &preview, items)?;
        let (redacted, preview) = outputs.collect()?;
        Ok((redacted, preview, report))
    }

    fn open_previews(&self, original: &Path, redacted: &Artifact) {
        let Some(opener) = &self.opener else {
            return;
        };
        let targets = std::iter::once(original).chain(redacted.as_path());
        for path in targets {
            if let Err(e) = opener.open_for_preview(path) {
                warn!(path = %path.display(), error = %e, "could not open preview");
            }
        }
    }
}
