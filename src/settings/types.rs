use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http_client::AgentTimeouts;
use crate::toxicity_api::{ExplainMethod, ModelName, RequestTuning, ServiceOptions};

use super::defaults::{
    clamp_connect_timeout_secs, clamp_max_response_bytes, default_connect_timeout_secs,
    default_max_response_bytes, default_text,
};

/// User settings loaded from `config.toml`.
///
/// Config keys (TOML): `api_base`, `default_model`, `default_method`,
/// `default_text`, `max_length`, `explain`, `http`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// API base used when `TOXILENS_API_BASE` is unset.
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default)]
    pub default_model: ModelName,
    #[serde(default)]
    pub default_method: ExplainMethod,
    /// Text pre-filled in the input box at launch.
    #[serde(default = "default_text")]
    pub default_text: String,
    /// Tokenizer truncation length forwarded to both endpoints.
    #[serde(default)]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub explain: ExplainTuning,
    #[serde(default)]
    pub http: HttpSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: None,
            default_model: ModelName::default(),
            default_method: ExplainMethod::default(),
            default_text: default_text(),
            max_length: None,
            explain: ExplainTuning::default(),
            http: HttpSettings::default(),
        }
    }
}

impl Settings {
    pub(crate) fn normalized(self) -> Self {
        Self {
            http: self.http.normalized(),
            ..self
        }
    }

    /// Optional request fields forwarded to the service.
    pub fn request_tuning(&self) -> RequestTuning {
        RequestTuning {
            max_length: self.max_length,
            num_features: self.explain.num_features,
            num_samples: self.explain.num_samples,
        }
    }

    pub fn service_options(&self) -> ServiceOptions {
        ServiceOptions {
            timeouts: AgentTimeouts {
                connect: Duration::from_secs(self.http.connect_timeout_secs),
                overall: self.http.request_timeout_secs.map(Duration::from_secs),
            },
            max_response_bytes: self.http.max_response_bytes,
        }
    }
}

/// LIME tuning forwarded to `/v1/explain`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplainTuning {
    #[serde(default)]
    pub num_features: Option<u32>,
    #[serde(default)]
    pub num_samples: Option<u32>,
}

/// Transport settings for the service client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Overall request bound; unset means a hung call waits indefinitely.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: None,
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

impl HttpSettings {
    fn normalized(self) -> Self {
        Self {
            connect_timeout_secs: clamp_connect_timeout_secs(self.connect_timeout_secs),
            request_timeout_secs: self.request_timeout_secs.filter(|secs| *secs > 0),
            max_response_bytes: clamp_max_response_bytes(self.max_response_bytes),
        }
    }
}

/// Errors that may occur while loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The app directory could not be resolved.
    #[error("No suitable config directory found: {0}")]
    ConfigDir(#[from] crate::app_dirs::AppDirError),
    /// Failed to read the config file.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Failed to parse TOML config.
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        /// TOML file path.
        path: PathBuf,
        /// TOML parse error.
        source: toml::de::Error,
    },
    /// The API base is not an absolute http(s) URL.
    #[error("Invalid API base {value:?} from {origin}: {reason}")]
    InvalidApiBase {
        value: String,
        origin: &'static str,
        reason: String,
    },
}
