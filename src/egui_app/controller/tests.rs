use super::test_support::{
    Call, ScriptedService, attr, controller_with, ig, lime, prediction, wait_until_idle,
};
use super::*;
use crate::toxicity_api::WireMethod;

fn scripted() -> Arc<ScriptedService> {
    Arc::new(ScriptedService::default())
}

#[test]
fn method_none_issues_only_the_prediction_call() {
    let service = scripted();
    service.push_prediction(Ok(prediction(0.82)));
    let mut controller = controller_with(&service);
    controller.ui.input.text = "Tu es bête".into();
    controller.ui.input.method = ExplainMethod::None;

    controller.run_analysis().unwrap();
    wait_until_idle(&mut controller);

    let calls = service.calls();
    assert_eq!(calls.len(), 1);
    assert!(matches!(&calls[0], Call::Predict(request) if request.text == "Tu es bête"));
    assert_eq!(controller.ui.run.status, RunStatus::Succeeded);
    assert!(controller.ui.run.explanation.is_none());
    assert!(controller.ui.run.error.is_none());
    let view = controller.analysis_view();
    assert_eq!(view.classification.as_str(), "toxic");
    assert!(!view.explanation_available);
    assert_eq!(controller.explanation_panel(), ExplanationPanel::Prompt);
}

#[test]
fn explanation_follows_prediction_with_wire_method() {
    let service = scripted();
    service.push_prediction(Ok(prediction(0.7)));
    service.push_explanation(Ok(ig(vec![attr("bête", 0.9)])));
    let mut controller = controller_with(&service);
    controller.ui.input.text = "Tu es bête".into();
    controller.ui.input.model = ModelName::Gpt2;
    controller.ui.input.method = ExplainMethod::IntegratedGradients;

    controller.run_analysis().unwrap();
    wait_until_idle(&mut controller);

    let calls = service.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(&calls[0], Call::Predict(request) if request.model == ModelName::Gpt2));
    match &calls[1] {
        Call::Explain(request) => {
            assert_eq!(request.method, WireMethod::Ig);
            assert_eq!(request.model, ModelName::Gpt2);
            assert_eq!(request.text, "Tu es bête");
        }
        other => panic!("expected explain call, got {other:?}"),
    }
    assert_eq!(controller.ui.run.status, RunStatus::Succeeded);
    assert!(controller.ui.run.prediction.is_some());
    assert!(controller.ui.run.explanation.is_some());
}

#[test]
fn prediction_failure_skips_explanation() {
    let service = scripted();
    service.push_prediction(Err(ServiceError::Status {
        code: 500,
        detail: None,
    }));
    let mut controller = controller_with(&service);
    controller.ui.input.method = ExplainMethod::Lime;

    controller.run_analysis().unwrap();
    wait_until_idle(&mut controller);

    assert_eq!(service.calls().len(), 1);
    assert_eq!(controller.ui.run.status, RunStatus::Failed);
    let error = controller.ui.run.error.clone().unwrap();
    assert!(error.contains("Predict"));
    assert!(error.contains("500"));
    assert!(controller.ui.run.prediction.is_none());
    assert!(controller.ui.run.explanation.is_none());
    assert_eq!(controller.ui.status.text, error);
}

#[test]
fn explanation_failure_keeps_prediction() {
    let service = scripted();
    service.push_prediction(Ok(prediction(0.4)));
    service.push_explanation(Err(ServiceError::Transport("connection reset".into())));
    let mut controller = controller_with(&service);
    controller.ui.input.method = ExplainMethod::Shap;

    controller.run_analysis().unwrap();
    wait_until_idle(&mut controller);

    assert_eq!(controller.ui.run.status, RunStatus::Failed);
    assert_eq!(controller.ui.run.prediction, Some(prediction(0.4)));
    assert!(controller.ui.run.explanation.is_none());
    let error = controller.ui.run.error.clone().unwrap();
    assert!(error.starts_with("Explain failed"));
    assert_eq!(controller.explanation_panel(), ExplanationPanel::Blank);
}

#[test]
fn markup_explanation_is_passed_through_verbatim() {
    let service = scripted();
    service.push_prediction(Ok(prediction(0.9)));
    service.push_explanation(Ok(lime("<p>ok</p>")));
    let mut controller = controller_with(&service);
    controller.ui.input.method = ExplainMethod::Lime;

    let run_id = controller.run_analysis().unwrap();
    wait_until_idle(&mut controller);

    assert_eq!(
        controller.explanation_panel(),
        ExplanationPanel::Markup {
            run_id,
            html: "<p>ok</p>"
        }
    );
}

#[test]
fn blank_markup_renders_nothing() {
    let service = scripted();
    service.push_prediction(Ok(prediction(0.9)));
    service.push_explanation(Ok(lime("  ")));
    let mut controller = controller_with(&service);
    controller.ui.input.method = ExplainMethod::Lime;

    controller.run_analysis().unwrap();
    wait_until_idle(&mut controller);

    assert_eq!(controller.ui.run.status, RunStatus::Succeeded);
    assert_eq!(controller.explanation_panel(), ExplanationPanel::Blank);
}

#[test]
fn attributions_are_ranked_and_truncated() {
    let service = scripted();
    service.push_prediction(Ok(prediction(0.9)));
    let attributions = (0..40)
        .map(|index| attr(&format!("t{index}"), f64::from(index) / 40.0))
        .collect();
    service.push_explanation(Ok(ig(attributions)));
    let mut controller = controller_with(&service);
    controller.ui.input.method = ExplainMethod::IntegratedGradients;

    controller.run_analysis().unwrap();
    wait_until_idle(&mut controller);

    let ExplanationPanel::Attributions(ranked) = controller.explanation_panel() else {
        panic!("expected attributions");
    };
    assert_eq!(ranked.len(), 30);
    assert_eq!(ranked[0].token, "t39");
    assert!(ranked.windows(2).all(|pair| pair[0].score >= pair[1].score));
}

#[test]
fn ranking_is_computed_once_per_explanation() {
    let service = scripted();
    service.push_prediction(Ok(prediction(0.9)));
    service.push_explanation(Ok(ig(vec![attr("a", 0.1), attr("b", 0.5)])));
    let mut controller = controller_with(&service);
    controller.ui.input.method = ExplainMethod::IntegratedGradients;

    controller.run_analysis().unwrap();
    wait_until_idle(&mut controller);

    for _ in 0..3 {
        let _ = controller.explanation_panel();
    }
    assert_eq!(controller.ranking.computations(), 1);
}

#[test]
fn identical_runs_produce_identical_state() {
    let service = scripted();
    for _ in 0..2 {
        service.push_prediction(Ok(prediction(0.6)));
        service.push_explanation(Ok(lime("<b>x</b>")));
    }
    let mut controller = controller_with(&service);
    controller.ui.input.method = ExplainMethod::Lime;

    controller.run_analysis().unwrap();
    wait_until_idle(&mut controller);
    let first = controller.ui.run.clone();
    controller.run_analysis().unwrap();
    wait_until_idle(&mut controller);

    assert_eq!(controller.ui.run, first);
    assert_eq!(service.calls().len(), 4);
}

#[test]
fn empty_input_is_rejected_without_calls() {
    let service = scripted();
    let mut controller = controller_with(&service);
    controller.ui.input.text = " \n\t ".into();

    assert!(!controller.can_run());
    assert_eq!(controller.run_analysis(), Err(RunRejected::EmptyInput));
    assert_eq!(controller.ui.run.status, RunStatus::Idle);
    assert!(controller.ui.run.error.is_none());
    assert!(service.calls().is_empty());
    assert!(controller.ui.status.text.contains("Enter some text"));
}

#[test]
fn second_trigger_is_rejected_while_running() {
    let service = scripted();
    service.push_prediction(Ok(prediction(0.2)));
    let mut controller = controller_with(&service);

    controller.run_analysis().unwrap();
    assert!(controller.is_running());
    assert!(!controller.can_run());
    assert_eq!(controller.run_analysis(), Err(RunRejected::InFlight));
    wait_until_idle(&mut controller);

    assert_eq!(service.calls().len(), 1);
    assert!(controller.can_run());
}

#[test]
fn restart_supersedes_the_run_in_flight() {
    let service = scripted();
    service.push_prediction(Ok(prediction(0.3)));
    service.push_prediction(Ok(prediction(0.3)));
    let mut controller = controller_with(&service);
    controller.ui.input.text = "first".into();

    let first = controller.run_analysis().unwrap();
    controller.ui.input.text = "second".into();
    let second = controller.restart_analysis().unwrap();
    assert_ne!(first, second);
    assert_eq!(controller.ui.run.running_id(), Some(second));
    wait_until_idle(&mut controller);

    assert_eq!(controller.ui.run.status, RunStatus::Succeeded);
    let texts: Vec<String> = service
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            Call::Predict(request) => Some(request.text),
            Call::Explain(_) => None,
        })
        .collect();
    assert_eq!(texts.len(), 2);
    assert!(texts.contains(&"second".to_string()));
}

#[test]
fn stale_messages_are_discarded() {
    let service = scripted();
    service.push_prediction(Ok(prediction(0.9)));
    let mut controller = controller_with(&service);

    let run_id = controller.run_analysis().unwrap();
    wait_until_idle(&mut controller);
    let settled = controller.ui.run.clone();

    let sender = controller.jobs.message_sender();
    sender
        .send(JobMessage::Predicted(PredictOutcome {
            run_id,
            result: Ok(prediction(0.1)),
        }))
        .unwrap();
    sender
        .send(JobMessage::Explained(ExplainOutcome {
            run_id: run_id + 7,
            result: Ok(lime("<p>late</p>")),
        }))
        .unwrap();
    controller.poll_jobs();

    assert_eq!(controller.ui.run, settled);
}

#[test]
fn input_edits_during_a_run_do_not_leak_into_it() {
    let service = scripted();
    service.push_prediction(Ok(prediction(0.9)));
    service.push_explanation(Ok(lime("<p>ok</p>")));
    let mut controller = controller_with(&service);
    controller.ui.input.text = "original".into();
    controller.ui.input.method = ExplainMethod::Lime;

    controller.run_analysis().unwrap();
    controller.ui.input.text = "edited".into();
    controller.ui.input.model = ModelName::Gpt2;
    wait_until_idle(&mut controller);

    for call in service.calls() {
        match call {
            Call::Predict(request) => {
                assert_eq!(request.text, "original");
                assert_eq!(request.model, ModelName::Camembert);
            }
            Call::Explain(request) => {
                assert_eq!(request.text, "original");
                assert_eq!(request.model, ModelName::Camembert);
            }
        }
    }
}

#[test]
fn new_run_clears_previous_results() {
    let service = scripted();
    service.push_prediction(Ok(prediction(0.9)));
    service.push_explanation(Ok(lime("<p>ok</p>")));
    service.push_prediction(Err(ServiceError::Status {
        code: 503,
        detail: Some("warming up".into()),
    }));
    let mut controller = controller_with(&service);
    controller.ui.input.method = ExplainMethod::Lime;

    controller.run_analysis().unwrap();
    wait_until_idle(&mut controller);
    assert!(controller.ui.run.explanation.is_some());

    controller.run_analysis().unwrap();
    assert!(controller.ui.run.prediction.is_none());
    assert!(controller.ui.run.explanation.is_none());
    wait_until_idle(&mut controller);
    assert_eq!(
        controller.ui.run.error.as_deref(),
        Some("Predict failed: 503 (warming up)")
    );
}
