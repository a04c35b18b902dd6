//! HTTP client for the `/v1/predict` and `/v1/explain` endpoints.

use serde::{Serialize, de::DeserializeOwned};

use crate::http_client::{self, AgentTimeouts};

use super::types::{ExplainRequest, ExplanationResult, PredictRequest, PredictionResult};

/// Path of the prediction endpoint, relative to the API base.
pub const PREDICT_PATH: &str = "/v1/predict";
/// Path of the explanation endpoint, relative to the API base.
pub const EXPLAIN_PATH: &str = "/v1/explain";

/// Default cap on response bodies; SHAP pages embed their own scripts.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 16 * 1024 * 1024;

const MAX_DETAIL_CHARS: usize = 200;

/// Remote scoring/explanation service.
///
/// Calls are blocking; the orchestrator runs them on worker threads.
pub trait ToxicityService: Send + Sync {
    /// Score `request.text` with the requested model.
    fn predict(&self, request: &PredictRequest) -> Result<PredictionResult, ServiceError>;
    /// Explain a previously scored text with the requested method.
    fn explain(&self, request: &ExplainRequest) -> Result<ExplanationResult, ServiceError>;
}

/// Failure of a single service call.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// No response was obtained (connection refused, DNS, reset, timeout).
    #[error("transport error: {0}")]
    Transport(String),
    /// The service answered with a non-success status.
    #[error("{code}{}", detail_suffix(.detail))]
    Status { code: u16, detail: Option<String> },
    /// The body could not be read or did not match the contract.
    #[error("invalid response: {0}")]
    InvalidBody(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|detail| format!(" ({detail})"))
        .unwrap_or_default()
}

/// Connection options for [`HttpToxicityService`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServiceOptions {
    pub timeouts: AgentTimeouts,
    pub max_response_bytes: usize,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            timeouts: AgentTimeouts::default(),
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }
}

/// [`ToxicityService`] backed by the FastAPI HTTP contract.
pub struct HttpToxicityService {
    base_url: String,
    agent: ureq::Agent,
    max_response_bytes: usize,
}

impl HttpToxicityService {
    /// Create a client for `base_url` (e.g. `http://127.0.0.1:8000`).
    pub fn new(base_url: impl Into<String>, options: ServiceOptions) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            agent: http_client::build_agent(options.timeouts),
            max_response_bytes: options.max_response_bytes,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, ServiceError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%url, "POST");
        let request = self
            .agent
            .post(&url)
            .set("Accept", "application/json")
            .set("Content-Type", "application/json");

        let response = match request.send_json(body) {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                let body = http_client::read_response_text(response, self.max_response_bytes)
                    .unwrap_or_default();
                return Err(ServiceError::Status {
                    code,
                    detail: parse_error_detail(&body),
                });
            }
            Err(ureq::Error::Transport(err)) => {
                return Err(ServiceError::Transport(err.to_string()));
            }
        };

        let text = http_client::read_response_text(response, self.max_response_bytes)
            .map_err(map_read_error)?;
        serde_json::from_str(text.trim()).map_err(|err| ServiceError::InvalidBody(err.to_string()))
    }
}

impl ToxicityService for HttpToxicityService {
    fn predict(&self, request: &PredictRequest) -> Result<PredictionResult, ServiceError> {
        let prediction: PredictionResult = self.post_json(PREDICT_PATH, request)?;
        prediction.validate().map_err(ServiceError::InvalidBody)
    }

    fn explain(&self, request: &ExplainRequest) -> Result<ExplanationResult, ServiceError> {
        let explanation: ExplanationResult = self.post_json(EXPLAIN_PATH, request)?;
        explanation.validate().map_err(ServiceError::InvalidBody)
    }
}

fn map_read_error(err: std::io::Error) -> ServiceError {
    match err.kind() {
        std::io::ErrorKind::InvalidData => ServiceError::InvalidBody(err.to_string()),
        _ => ServiceError::Transport(err.to_string()),
    }
}

/// Extract FastAPI's `detail` field from an error body.
fn parse_error_detail(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    let detail = match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => match value.get("detail") {
            Some(serde_json::Value::String(detail)) => detail.clone(),
            Some(other) => other.to_string(),
            None => return None,
        },
        Err(_) => trimmed.to_string(),
    };
    let detail = detail.trim();
    if detail.is_empty() {
        return None;
    }
    Some(truncate_chars(detail, MAX_DETAIL_CHARS))
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
