//! Pure helpers deriving display data from orchestrator state.

use crate::toxicity_api::{ExplainMethod, PredictionResult, ToxicityLabel, TokenAttribution};

/// Toxic probability above which text is classified toxic (strictly greater).
pub const TOXIC_THRESHOLD: f64 = 0.5;
/// Token scores above this are in the high band.
pub const HIGH_BAND_THRESHOLD: f64 = 0.66;
/// Token scores above this (and not high) are in the mid band.
pub const MID_BAND_THRESHOLD: f64 = 0.33;

/// Binary verdict shown on the score card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    NonToxic,
    Toxic,
}

impl Classification {
    pub fn from_probability(toxic_probability: f64) -> Self {
        if toxic_probability > TOXIC_THRESHOLD {
            Self::Toxic
        } else {
            Self::NonToxic
        }
    }

    /// Label value, matching the service's label domain.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NonToxic => "non-toxic",
            Self::Toxic => "toxic",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::NonToxic => "Non-toxic",
            Self::Toxic => "Toxic",
        }
    }
}

/// Colour band of an attribution chip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreBand {
    Low,
    Mid,
    High,
}

impl ScoreBand {
    pub fn for_score(score: f64) -> Self {
        if score > HIGH_BAND_THRESHOLD {
            Self::High
        } else if score > MID_BAND_THRESHOLD {
            Self::Mid
        } else {
            Self::Low
        }
    }
}

/// Derived view state of the score card.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisView {
    pub toxic_probability: f64,
    pub classification: Classification,
    pub explanation_available: bool,
}

/// Derive the score-card state from the current prediction and selected method.
pub fn analysis_view(prediction: Option<&PredictionResult>, method: ExplainMethod) -> AnalysisView {
    let toxic_probability = prediction
        .map(PredictionResult::toxic_probability)
        .unwrap_or(0.0);
    AnalysisView {
        toxic_probability,
        classification: Classification::from_probability(toxic_probability),
        explanation_available: method != ExplainMethod::None && prediction.is_some(),
    }
}

/// What the explanation card should show.
#[derive(Clone, Debug, PartialEq)]
pub enum ExplanationPanel<'a> {
    /// No method selected or no prediction yet: ask the user to pick one and re-run.
    Prompt,
    /// The explanation call is in flight.
    Pending,
    /// LIME/SHAP document for the sandboxed viewer, exactly as received.
    Markup { run_id: u64, html: &'a str },
    /// Ranked integrated-gradients tokens.
    Attributions(&'a [TokenAttribution]),
    /// Nothing to show (explanation failed or came back empty).
    Blank,
}

/// Render a fraction as a percentage with one decimal; ties round up.
pub fn format_percent(fraction: f64) -> String {
    format!("{:.1}%", (fraction * 1000.0).round() / 10.0)
}

/// Probability bar fill, clamped to the bar.
pub fn bar_fraction(toxic_probability: f64) -> f32 {
    toxic_probability.clamp(0.0, 1.0) as f32
}

/// Label caption on a probability row, each word capitalized, e.g. `Non Toxic`.
pub fn label_caption(label: ToxicityLabel) -> String {
    label
        .as_str()
        .split('-')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Text of an attribution chip, e.g. `bête · 0.91`.
pub fn chip_label(attribution: &TokenAttribution) -> String {
    format!("{} · {:.2}", attribution.token, attribution.score)
}

/// Hover text of an attribution chip with the full-precision score.
pub fn chip_tooltip(attribution: &TokenAttribution) -> String {
    format!("{:.4}", attribution.score)
}
