//! Analysis orchestration: sequences the prediction and explanation calls and
//! owns the state the egui renderer reads.
//!
//! A run always starts with a prediction call. Only when it succeeds, and the
//! run's method is not `none`, is the explanation call issued. Each call runs
//! on a worker thread and reports back through [`jobs::AnalysisJobs`]; every
//! message carries the id of the run that issued it, and anything not matching
//! the run currently in flight is dropped, so a superseded run can never
//! overwrite a newer one.

mod jobs;
#[cfg(test)]
mod test_support;
#[cfg(test)]
mod tests;

use crate::attribution::RankedAttributions;
use crate::egui_app::state::{AnalysisInput, RunStage, RunStatus, StatusBarState, UiState};
use crate::egui_app::ui::style::StatusTone;
use crate::egui_app::view_model::{self, AnalysisView, ExplanationPanel};
use crate::sandbox::SandboxedDocument;
use crate::settings::Settings;
use crate::toxicity_api::{
    ExplainMethod, ExplanationResult, ModelName, RequestTuning, ServiceError, ToxicityService,
};
use jobs::{AnalysisJobs, ExplainOutcome, JobMessage, PredictOutcome};
use std::sync::Arc;

/// Why a run request was refused before reaching the network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RunRejected {
    #[error("Enter some text to analyze")]
    EmptyInput,
    #[error("An analysis is already running")]
    InFlight,
}

/// A failed stage; its display text is what the alert panel shows.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{} failed: {error}", .stage.label())]
pub struct RunFailure {
    pub stage: RunStage,
    pub error: ServiceError,
}

/// Parameters captured when a run starts; edits made mid-run do not leak in.
#[derive(Clone, Debug)]
struct RunRequest {
    run_id: u64,
    text: String,
    model: ModelName,
    method: ExplainMethod,
}

/// Maintains analysis state and bridges the service to the egui UI.
pub struct EguiController {
    pub ui: UiState,
    jobs: AnalysisJobs,
    tuning: RequestTuning,
    active_run: Option<RunRequest>,
    ranking: RankedAttributions,
}

impl EguiController {
    pub fn new(
        service: Arc<dyn ToxicityService>,
        settings: &Settings,
        api_base: impl Into<String>,
    ) -> Self {
        let input = AnalysisInput {
            text: settings.default_text.clone(),
            model: settings.default_model,
            method: settings.default_method,
        };
        Self {
            ui: UiState::new(input, api_base),
            jobs: AnalysisJobs::new(service),
            tuning: settings.request_tuning(),
            active_run: None,
            ranking: RankedAttributions::default(),
        }
    }

    /// True when the Analyze trigger should be enabled.
    pub fn can_run(&self) -> bool {
        self.ui.input.has_text() && !self.is_running()
    }

    pub fn is_running(&self) -> bool {
        self.ui.run.is_running()
    }

    /// Start a run from the current input, unless one is already in flight.
    pub fn run_analysis(&mut self) -> Result<u64, RunRejected> {
        if self.is_running() {
            return Err(RunRejected::InFlight);
        }
        self.restart_analysis()
    }

    /// Start a run from the current input, superseding any run in flight.
    ///
    /// Nothing is cancelled on the service side; results of the superseded
    /// run are discarded when they arrive.
    pub fn restart_analysis(&mut self) -> Result<u64, RunRejected> {
        if !self.ui.input.has_text() {
            self.set_status(RunRejected::EmptyInput.to_string(), StatusTone::Warning);
            return Err(RunRejected::EmptyInput);
        }
        if let Some(previous) = self.ui.run.running_id() {
            tracing::info!(run_id = previous, "Superseding analysis run");
        }
        Ok(self.start_run())
    }

    fn start_run(&mut self) -> u64 {
        let run_id = self.jobs.next_run_id();
        let request = RunRequest {
            run_id,
            text: self.ui.input.text.clone(),
            model: self.ui.input.model,
            method: self.ui.input.method,
        };
        tracing::info!(
            run_id,
            model = request.model.as_str(),
            method = request.method.header_tag(),
            chars = request.text.chars().count(),
            "Starting analysis run"
        );
        self.ui.run.prediction = None;
        self.ui.run.explanation = None;
        self.ui.run.error = None;
        self.ui.run.status = RunStatus::Running {
            run_id,
            stage: RunStage::Predicting,
        };
        self.ranking.clear();
        self.jobs
            .begin_predict(run_id, self.tuning.predict_request(&request.text, request.model));
        self.active_run = Some(request);
        self.set_status("Scoring text…", StatusTone::Busy);
        run_id
    }

    /// Drain finished service calls and advance the current run.
    pub fn poll_jobs(&mut self) {
        while let Ok(message) = self.jobs.try_recv_message() {
            match message {
                JobMessage::Predicted(outcome) => self.handle_predicted(outcome),
                JobMessage::Explained(outcome) => self.handle_explained(outcome),
            }
        }
    }

    fn expects(&self, run_id: u64, stage: RunStage) -> bool {
        self.ui.run.status == RunStatus::Running { run_id, stage }
    }

    fn handle_predicted(&mut self, outcome: PredictOutcome) {
        if !self.expects(outcome.run_id, RunStage::Predicting) {
            tracing::debug!(run_id = outcome.run_id, "Discarding stale prediction");
            return;
        }
        let prediction = match outcome.result {
            Ok(prediction) => prediction,
            Err(error) => {
                self.fail_run(outcome.run_id, RunStage::Predicting, error);
                return;
            }
        };
        let Some(request) = self.active_run.clone() else {
            return;
        };
        let toxic_probability = prediction.toxic_probability();
        tracing::info!(
            run_id = outcome.run_id,
            toxic_score = prediction.toxic_score,
            "Prediction finished"
        );
        self.ui.run.prediction = Some(prediction);

        match request.method.wire_method() {
            Some(method) => {
                self.ui.run.status = RunStatus::Running {
                    run_id: request.run_id,
                    stage: RunStage::Explaining,
                };
                self.jobs.begin_explain(
                    request.run_id,
                    self.tuning
                        .explain_request(&request.text, request.model, method),
                );
                self.set_status(
                    format!("Explaining with {}…", request.method.display_name()),
                    StatusTone::Busy,
                );
            }
            None => {
                self.ui.run.status = RunStatus::Succeeded;
                let verdict = view_model::Classification::from_probability(toxic_probability);
                self.set_status(
                    format!(
                        "Scored {} ({})",
                        verdict.as_str(),
                        view_model::format_percent(toxic_probability)
                    ),
                    StatusTone::Info,
                );
            }
        }
    }

    fn handle_explained(&mut self, outcome: ExplainOutcome) {
        if !self.expects(outcome.run_id, RunStage::Explaining) {
            tracing::debug!(run_id = outcome.run_id, "Discarding stale explanation");
            return;
        }
        match outcome.result {
            Ok(explanation) => {
                tracing::info!(
                    run_id = outcome.run_id,
                    method = explanation.method().header_tag(),
                    "Explanation finished"
                );
                let method = explanation.method();
                self.ui.run.explanation = Some(explanation);
                self.ui.run.status = RunStatus::Succeeded;
                self.set_status(
                    format!("{} explanation ready", method.display_name()),
                    StatusTone::Info,
                );
            }
            Err(error) => self.fail_run(outcome.run_id, RunStage::Explaining, error),
        }
    }

    /// Mark the run failed; an already received prediction is kept.
    fn fail_run(&mut self, run_id: u64, stage: RunStage, error: ServiceError) {
        let failure = RunFailure { stage, error };
        tracing::warn!(run_id, "{failure}");
        let message = failure.to_string();
        self.ui.run.status = RunStatus::Failed;
        self.ui.run.explanation = None;
        self.ui.run.error = Some(message.clone());
        self.set_status(message, StatusTone::Error);
    }

    /// Derived score-card state for the current prediction and selected method.
    pub fn analysis_view(&self) -> AnalysisView {
        view_model::analysis_view(self.ui.run.prediction.as_ref(), self.ui.input.method)
    }

    /// Decide what the explanation card shows, ranking attributions at most
    /// once per explanation.
    pub fn explanation_panel(&mut self) -> ExplanationPanel<'_> {
        if !self.analysis_view().explanation_available {
            return ExplanationPanel::Prompt;
        }
        if let RunStatus::Running {
            stage: RunStage::Explaining,
            ..
        } = self.ui.run.status
        {
            return ExplanationPanel::Pending;
        }
        let run_id = self.active_run.as_ref().map(|run| run.run_id).unwrap_or(0);
        match &self.ui.run.explanation {
            Some(ExplanationResult::Lime(markup) | ExplanationResult::Shap(markup))
                if !markup.html.trim().is_empty() =>
            {
                ExplanationPanel::Markup {
                    run_id,
                    html: markup.html.as_str(),
                }
            }
            Some(ExplanationResult::IntegratedGradients(attribution)) => {
                ExplanationPanel::Attributions(
                    self.ranking.get_or_rank(run_id, &attribution.attributions),
                )
            }
            _ => ExplanationPanel::Blank,
        }
    }

    /// Open the current markup explanation in the sandboxed browser viewer.
    pub fn open_explanation_viewer(&mut self) {
        let (run_id, html) = match self.explanation_panel() {
            ExplanationPanel::Markup { run_id, html } => (run_id, html.to_string()),
            _ => return,
        };
        match SandboxedDocument::new(html).open_in_browser(run_id) {
            Ok(path) => {
                tracing::info!(path = %path.display(), "Opened sandboxed explanation");
                self.set_status("Explanation opened in sandboxed viewer", StatusTone::Info);
            }
            Err(err) => {
                tracing::warn!("{err}");
                self.set_status(err.to_string(), StatusTone::Error);
            }
        }
    }

    pub(crate) fn set_status(&mut self, text: impl Into<String>, tone: StatusTone) {
        self.ui.status = StatusBarState::with_tone(text, tone);
    }
}
