use crate::toxicity_api::{
    ExplainRequest, ExplanationResult, PredictRequest, PredictionResult, ServiceError,
    ToxicityService,
};
use std::{
    sync::{
        Arc,
        mpsc::{Receiver, Sender},
    },
    thread,
};

type TryRecvError = std::sync::mpsc::TryRecvError;

/// Completion of a worker-thread service call, tagged with its run.
#[derive(Debug)]
pub(crate) enum JobMessage {
    Predicted(PredictOutcome),
    Explained(ExplainOutcome),
}

#[derive(Debug)]
pub(crate) struct PredictOutcome {
    pub(crate) run_id: u64,
    pub(crate) result: Result<PredictionResult, ServiceError>,
}

#[derive(Debug)]
pub(crate) struct ExplainOutcome {
    pub(crate) run_id: u64,
    pub(crate) result: Result<ExplanationResult, ServiceError>,
}

/// Runs service calls off the UI thread and funnels results back.
pub(crate) struct AnalysisJobs {
    service: Arc<dyn ToxicityService>,
    message_tx: Sender<JobMessage>,
    message_rx: Receiver<JobMessage>,
    next_run_id: u64,
}

impl AnalysisJobs {
    pub(super) fn new(service: Arc<dyn ToxicityService>) -> Self {
        let (message_tx, message_rx) = std::sync::mpsc::channel::<JobMessage>();
        Self {
            service,
            message_tx,
            message_rx,
            next_run_id: 1,
        }
    }

    pub(super) fn next_run_id(&mut self) -> u64 {
        let run_id = self.next_run_id;
        self.next_run_id = self.next_run_id.wrapping_add(1).max(1);
        run_id
    }

    pub(super) fn try_recv_message(&self) -> Result<JobMessage, TryRecvError> {
        self.message_rx.try_recv()
    }

    #[cfg(test)]
    pub(super) fn message_sender(&self) -> Sender<JobMessage> {
        self.message_tx.clone()
    }

    pub(super) fn begin_predict(&self, run_id: u64, request: PredictRequest) {
        let service = Arc::clone(&self.service);
        let tx = self.message_tx.clone();
        thread::spawn(move || {
            let result = service.predict(&request);
            let _ = tx.send(JobMessage::Predicted(PredictOutcome { run_id, result }));
        });
    }

    pub(super) fn begin_explain(&self, run_id: u64, request: ExplainRequest) {
        let service = Arc::clone(&self.service);
        let tx = self.message_tx.clone();
        thread::spawn(move || {
            let result = service.explain(&request);
            let _ = tx.send(JobMessage::Explained(ExplainOutcome { run_id, result }));
        });
    }
}
