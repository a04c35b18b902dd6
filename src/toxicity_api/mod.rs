//! Contract and client for the remote toxicity scoring/explanation service.

mod client;
mod types;

pub use client::{
    DEFAULT_MAX_RESPONSE_BYTES, EXPLAIN_PATH, HttpToxicityService, PREDICT_PATH, ServiceError,
    ServiceOptions, ToxicityService,
};
pub use types::{
    AttributionExplanation, ClassProbability, ExplainMethod, ExplainRequest, ExplanationResult,
    MarkupExplanation, ModelName, PredictRequest, PredictionResult, RequestTuning,
    TokenAttribution, ToxicityLabel, WireMethod,
};
