//! Wire contracts exchanged with the scoring/explanation service.

use serde::{Deserialize, Serialize};

/// Model variants the service can score with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelName {
    #[default]
    Camembert,
    Gpt2,
}

impl ModelName {
    /// Every supported model, in selector order.
    pub const ALL: [ModelName; 2] = [ModelName::Camembert, ModelName::Gpt2];

    /// Wire identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Camembert => "camembert",
            Self::Gpt2 => "gpt2",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Camembert => "CamemBERT",
            Self::Gpt2 => "GPT-2",
        }
    }
}

/// Explanation method chosen by the user, including "no explanation".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExplainMethod {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "lime")]
    Lime,
    #[serde(rename = "shap")]
    Shap,
    #[serde(rename = "ig", alias = "integrated-gradients")]
    IntegratedGradients,
}

impl ExplainMethod {
    /// Every selectable method, in selector order.
    pub const ALL: [ExplainMethod; 4] = [
        ExplainMethod::None,
        ExplainMethod::Lime,
        ExplainMethod::Shap,
        ExplainMethod::IntegratedGradients,
    ];

    /// Method to send to `/v1/explain`, or `None` when no call should be made.
    pub fn wire_method(self) -> Option<WireMethod> {
        match self {
            Self::None => None,
            Self::Lime => Some(WireMethod::Lime),
            Self::Shap => Some(WireMethod::Shap),
            Self::IntegratedGradients => Some(WireMethod::Ig),
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Lime => "LIME",
            Self::Shap => "SHAP",
            Self::IntegratedGradients => "Integrated Gradients",
        }
    }

    /// Short tag shown in the explanation card header.
    pub fn header_tag(self) -> &'static str {
        match self {
            Self::None => "—",
            Self::Lime => "LIME",
            Self::Shap => "SHAP",
            Self::IntegratedGradients => "IG",
        }
    }
}

/// Explanation method as accepted by the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireMethod {
    Lime,
    Shap,
    Ig,
}

/// Optional request knobs forwarded to the service when configured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RequestTuning {
    /// Tokenizer truncation length for both endpoints.
    pub max_length: Option<u32>,
    /// LIME feature count.
    pub num_features: Option<u32>,
    /// LIME perturbation sample count.
    pub num_samples: Option<u32>,
}

impl RequestTuning {
    pub fn predict_request(&self, text: &str, model: ModelName) -> PredictRequest {
        PredictRequest {
            text: text.to_string(),
            model,
            max_length: self.max_length,
        }
    }

    pub fn explain_request(&self, text: &str, model: ModelName, method: WireMethod) -> ExplainRequest {
        ExplainRequest {
            text: text.to_string(),
            model,
            method,
            max_length: self.max_length,
            num_features: self.num_features,
            num_samples: self.num_samples,
        }
    }
}

/// Body of `POST /v1/predict`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PredictRequest {
    pub text: String,
    pub model: ModelName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
}

/// Body of `POST /v1/explain`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExplainRequest {
    pub text: String,
    pub model: ModelName,
    pub method: WireMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_features: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_samples: Option<u32>,
}

/// The two labels the classifier scores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToxicityLabel {
    #[serde(rename = "non-toxic")]
    NonToxic,
    #[serde(rename = "toxic")]
    Toxic,
}

impl ToxicityLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NonToxic => "non-toxic",
            Self::Toxic => "toxic",
        }
    }
}

/// One (label, probability) pair as returned by the service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassProbability {
    pub label: ToxicityLabel,
    pub score: f64,
}

/// Response of `POST /v1/predict`.
///
/// Scores are the service's own output; they are never renormalized here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub model: ModelName,
    pub probs: Vec<ClassProbability>,
    pub toxic_score: f64,
}

impl PredictionResult {
    /// Probability attached to the `toxic` label, or 0 when absent.
    pub fn toxic_probability(&self) -> f64 {
        self.probs
            .iter()
            .find(|prob| prob.label == ToxicityLabel::Toxic)
            .map(|prob| prob.score)
            .unwrap_or(0.0)
    }

    pub(crate) fn validate(self) -> Result<Self, String> {
        ensure_probability("toxic_score", self.toxic_score)?;
        for prob in &self.probs {
            ensure_probability(prob.label.as_str(), prob.score)?;
        }
        Ok(self)
    }
}

/// A token and its contribution to the toxicity score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenAttribution {
    pub token: String,
    pub score: f64,
}

/// LIME/SHAP payload: an HTML document meant for isolated rendering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkupExplanation {
    pub model: ModelName,
    pub toxic_score: f64,
    pub html: String,
}

/// Integrated-gradients payload: unordered per-token scores.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttributionExplanation {
    pub model: ModelName,
    pub toxic_score: f64,
    pub attributions: Vec<TokenAttribution>,
}

/// Response of `POST /v1/explain`, discriminated by its `method` field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum ExplanationResult {
    #[serde(rename = "lime")]
    Lime(MarkupExplanation),
    #[serde(rename = "shap")]
    Shap(MarkupExplanation),
    #[serde(rename = "ig")]
    IntegratedGradients(AttributionExplanation),
}

impl ExplanationResult {
    pub fn method(&self) -> ExplainMethod {
        match self {
            Self::Lime(_) => ExplainMethod::Lime,
            Self::Shap(_) => ExplainMethod::Shap,
            Self::IntegratedGradients(_) => ExplainMethod::IntegratedGradients,
        }
    }

    pub fn model(&self) -> ModelName {
        match self {
            Self::Lime(markup) | Self::Shap(markup) => markup.model,
            Self::IntegratedGradients(attribution) => attribution.model,
        }
    }

    pub fn toxic_score(&self) -> f64 {
        match self {
            Self::Lime(markup) | Self::Shap(markup) => markup.toxic_score,
            Self::IntegratedGradients(attribution) => attribution.toxic_score,
        }
    }

    /// HTML document for markup explanations.
    pub fn markup(&self) -> Option<&str> {
        match self {
            Self::Lime(markup) | Self::Shap(markup) => Some(markup.html.as_str()),
            Self::IntegratedGradients(_) => None,
        }
    }

    /// Token attributions for integrated-gradients explanations.
    pub fn attributions(&self) -> Option<&[TokenAttribution]> {
        match self {
            Self::IntegratedGradients(attribution) => Some(attribution.attributions.as_slice()),
            Self::Lime(_) | Self::Shap(_) => None,
        }
    }

    pub(crate) fn validate(self) -> Result<Self, String> {
        ensure_probability("toxic_score", self.toxic_score())?;
        Ok(self)
    }
}

fn ensure_probability(field: &str, value: f64) -> Result<(), String> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{field} score {value} outside [0, 1]"))
    }
}
