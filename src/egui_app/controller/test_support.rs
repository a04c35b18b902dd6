use super::*;
use crate::toxicity_api::{
    AttributionExplanation, ClassProbability, ExplainRequest, MarkupExplanation, PredictRequest,
    PredictionResult, TokenAttribution, ToxicityLabel,
};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// A request observed by [`ScriptedService`], in call order.
#[derive(Clone, Debug, PartialEq)]
pub(super) enum Call {
    Predict(PredictRequest),
    Explain(ExplainRequest),
}

/// Service double answering from queued responses and recording every call.
#[derive(Default)]
pub(super) struct ScriptedService {
    predictions: Mutex<VecDeque<Result<PredictionResult, ServiceError>>>,
    explanations: Mutex<VecDeque<Result<ExplanationResult, ServiceError>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedService {
    pub(super) fn push_prediction(&self, result: Result<PredictionResult, ServiceError>) {
        self.predictions.lock().unwrap().push_back(result);
    }

    pub(super) fn push_explanation(&self, result: Result<ExplanationResult, ServiceError>) {
        self.explanations.lock().unwrap().push_back(result);
    }

    pub(super) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl ToxicityService for ScriptedService {
    fn predict(&self, request: &PredictRequest) -> Result<PredictionResult, ServiceError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Predict(request.clone()));
        self.predictions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ServiceError::Transport("no scripted prediction".into())))
    }

    fn explain(&self, request: &ExplainRequest) -> Result<ExplanationResult, ServiceError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Explain(request.clone()));
        self.explanations
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ServiceError::Transport("no scripted explanation".into())))
    }
}

pub(super) fn controller_with(service: &Arc<ScriptedService>) -> EguiController {
    let service: Arc<dyn ToxicityService> = service.clone();
    EguiController::new(service, &Settings::default(), "http://127.0.0.1:8000")
}

pub(super) fn prediction(toxic: f64) -> PredictionResult {
    PredictionResult {
        model: ModelName::Camembert,
        probs: vec![
            ClassProbability {
                label: ToxicityLabel::NonToxic,
                score: 1.0 - toxic,
            },
            ClassProbability {
                label: ToxicityLabel::Toxic,
                score: toxic,
            },
        ],
        toxic_score: toxic,
    }
}

pub(super) fn lime(html: &str) -> ExplanationResult {
    ExplanationResult::Lime(MarkupExplanation {
        model: ModelName::Camembert,
        toxic_score: 0.82,
        html: html.to_string(),
    })
}

pub(super) fn ig(attributions: Vec<TokenAttribution>) -> ExplanationResult {
    ExplanationResult::IntegratedGradients(AttributionExplanation {
        model: ModelName::Camembert,
        toxic_score: 0.82,
        attributions,
    })
}

pub(super) fn attr(token: &str, score: f64) -> TokenAttribution {
    TokenAttribution {
        token: token.to_string(),
        score,
    }
}

/// Poll until the controller leaves the running state.
pub(super) fn wait_until_idle(controller: &mut EguiController) {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        controller.poll_jobs();
        if !controller.is_running() {
            return;
        }
        assert!(Instant::now() < deadline, "run did not finish in time");
        std::thread::sleep(Duration::from_millis(5));
    }
}
