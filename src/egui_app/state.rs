//! Shared state types for the egui UI.

use crate::egui_app::ui::style::{self, StatusTone};
use crate::toxicity_api::{ExplainMethod, ExplanationResult, ModelName, PredictionResult};
use egui::Color32;

/// Top-level UI model consumed by the egui renderer.
#[derive(Clone, Debug)]
pub struct UiState {
    pub input: AnalysisInput,
    pub run: RunState,
    pub status: StatusBarState,
    /// Service base address shown in the footer.
    pub api_base: String,
}

impl UiState {
    pub fn new(input: AnalysisInput, api_base: impl Into<String>) -> Self {
        Self {
            input,
            run: RunState::default(),
            status: StatusBarState::idle(),
            api_base: api_base.into(),
        }
    }
}

/// User-editable analysis parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnalysisInput {
    pub text: String,
    pub model: ModelName,
    pub method: ExplainMethod,
}

impl AnalysisInput {
    /// True when the text has content after trimming whitespace.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Step of an in-flight run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStage {
    Predicting,
    Explaining,
}

impl RunStage {
    /// Stage name used in failure messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Predicting => "Predict",
            Self::Explaining => "Explain",
        }
    }
}

/// Lifecycle of the current analysis run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunStatus {
    #[default]
    Idle,
    Running { run_id: u64, stage: RunStage },
    Succeeded,
    Failed,
}

/// Results and error of the latest run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunState {
    pub status: RunStatus,
    pub prediction: Option<PredictionResult>,
    pub explanation: Option<ExplanationResult>,
    /// Message shown in the alert panel; cleared only by a new run.
    pub error: Option<String>,
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self.status, RunStatus::Running { .. })
    }

    /// Id of the run currently in flight.
    pub fn running_id(&self) -> Option<u64> {
        match self.status {
            RunStatus::Running { run_id, .. } => Some(run_id),
            _ => None,
        }
    }
}

/// Status badge + text shown in the footer.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusBarState {
    /// Main status message text.
    pub text: String,
    /// Badge label shown next to the status.
    pub badge_label: String,
    /// Badge color.
    pub badge_color: Color32,
}

impl StatusBarState {
    pub fn idle() -> Self {
        Self::with_tone("Enter some text and press Analyze", StatusTone::Idle)
    }

    pub fn with_tone(text: impl Into<String>, tone: StatusTone) -> Self {
        let (badge_label, badge_color) = style::status_badge(tone);
        Self {
            text: text.into(),
            badge_label: badge_label.to_string(),
            badge_color,
        }
    }
}
