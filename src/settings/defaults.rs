use crate::toxicity_api::DEFAULT_MAX_RESPONSE_BYTES;

/// Used when neither the environment nor the config file names an API base.
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

pub(super) const MIN_RESPONSE_BYTES: usize = 64 * 1024;

pub(super) fn default_text() -> String {
    "Tu es bête et idiot.".to_string()
}

pub(super) fn default_connect_timeout_secs() -> u64 {
    10
}

pub(super) fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}

pub(super) fn clamp_connect_timeout_secs(value: u64) -> u64 {
    value.max(1)
}

pub(super) fn clamp_max_response_bytes(value: usize) -> usize {
    value.max(MIN_RESPONSE_BYTES)
}
