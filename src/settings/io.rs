use std::path::{Path, PathBuf};

use crate::app_dirs;

use super::defaults::DEFAULT_API_BASE;
use super::types::{Settings, SettingsError};

/// Default filename used to store the app configuration.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable overriding the service base address.
pub const API_BASE_ENV: &str = "TOXILENS_API_BASE";

/// Resolve the configuration file path, ensuring the parent directory exists.
pub fn config_path() -> Result<PathBuf, SettingsError> {
    Ok(app_dirs::app_root_dir()?.join(CONFIG_FILE_NAME))
}

/// Load settings from the app directory, returning defaults if the file is missing.
pub fn load_or_default() -> Result<Settings, SettingsError> {
    load_settings_from(&config_path()?)
}

/// Load settings from a specific TOML file; a missing file yields defaults.
pub fn load_settings_from(path: &Path) -> Result<Settings, SettingsError> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str::<Settings>(&text)
        .map(Settings::normalized)
        .map_err(|source| SettingsError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
}

/// Resolve the API base once at startup: environment, then config, then default.
pub fn api_base(settings: &Settings) -> Result<String, SettingsError> {
    resolve_api_base(std::env::var(API_BASE_ENV).ok(), settings.api_base.as_deref())
}

pub(crate) fn resolve_api_base(
    from_env: Option<String>,
    from_config: Option<&str>,
) -> Result<String, SettingsError> {
    let non_blank = |value: &str| !value.trim().is_empty();
    let (value, origin) = match (from_env, from_config) {
        (Some(value), _) if non_blank(&value) => (value, API_BASE_ENV),
        (_, Some(value)) if non_blank(value) => (value.to_string(), CONFIG_FILE_NAME),
        _ => (DEFAULT_API_BASE.to_string(), "defaults"),
    };
    validate_api_base(value.trim(), origin)
}

fn validate_api_base(value: &str, origin: &'static str) -> Result<String, SettingsError> {
    let invalid = |reason: String| SettingsError::InvalidApiBase {
        value: value.to_string(),
        origin,
        reason,
    };
    let parsed = url::Url::parse(value).map_err(|err| invalid(err.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", parsed.scheme())));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(invalid("query and fragment are not allowed".to_string()));
    }
    Ok(value.trim_end_matches('/').to_string())
}
