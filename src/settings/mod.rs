//! Launch settings: TOML config file plus the service base address.

mod defaults;
mod io;
mod types;

pub use defaults::DEFAULT_API_BASE;
pub use io::{API_BASE_ENV, CONFIG_FILE_NAME, api_base, config_path, load_or_default, load_settings_from};
pub use types::{ExplainTuning, HttpSettings, Settings, SettingsError};
