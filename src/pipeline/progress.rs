//! Stage machine and progress events.
//!
//! Stages run strictly in order; `Failed` is reachable from any
//! non-terminal stage and absorbs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extracting,
    Detecting,
    Processing,
    Redacting,
    Done,
    Failed,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Extracting => "extracting",
            Stage::Detecting => "detecting",
            Stage::Processing => "processing",
            Stage::Redacting => "redacting",
            Stage::Done => "done",
            Stage::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Done | Stage::Failed)
    }

    /// Whether a run currently in `from` (or not yet started) may enter `to`.
    ///
    /// Stages may be skipped forward (analyze runs never redact) but never
    /// re-entered.
    pub fn can_enter(from: Option<Stage>, to: Stage) -> bool {
        match from {
            None => !to.is_terminal() || to == Stage::Failed,
            Some(current) if current.is_terminal() => false,
            Some(_) if to == Stage::Failed => true,
            Some(current) => to > current,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emitted on every stage transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub stage: Stage,
    /// Wall-clock time the stage was entered.
    pub started_at: DateTime<Utc>,
    /// Milliseconds since the run started.
    pub elapsed_ms: u64,
}

/// Callback receiving events as they happen.
pub type ProgressListener = Arc<dyn Fn(&ProgressEvent) + Send + Sync>;

/// Events of one run plus its total duration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub final_stage: Option<Stage>,
    pub total_ms: u64,
    pub events: Vec<ProgressEvent>,
}

/// Records the transitions of a single run.
pub struct ProgressTracker {
    started: Instant,
    current: Option<Stage>,
    events: Vec<ProgressEvent>,
    listener: Option<ProgressListener>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            current: None,
            events: Vec::new(),
            listener: None,
        }
    }

    pub fn with_listener(mut self, listener: Option<ProgressListener>) -> Self {
        self.listener = listener;
        self
    }

    pub fn current(&self) -> Option<Stage> {
        self.current
    }

    /// Moves to `stage`. Returns false, recording nothing, when the
    /// transition is not allowed.
    pub fn enter(&mut self, stage: Stage) -> bool {
        if !Stage::can_enter(self.current, stage) {
            return false;
        }

        let event = ProgressEvent {
            stage,
            started_at: Utc::now(),
            elapsed_ms: self.elapsed_ms(),
        };
        if stage == Stage::Failed {
            error!(from = ?self.current, elapsed_ms = event.elapsed_ms, "pipeline failed");
        } else {
            info!(stage = %stage, elapsed_ms = event.elapsed_ms, "pipeline stage");
        }
        if let Some(listener) = &self.listener {
            listener(&event);
        }

        self.current = Some(stage);
        self.events.push(event);
        true
    }

    pub fn events(&self) -> &[ProgressEvent] {
        &self.events
    }

    pub fn summary(&self) -> ProgressSummary {
        ProgressSummary {
            final_stage: self.current,
            total_ms: self.elapsed_ms(),
            events: self.events.clone(),
        }
    }

    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
