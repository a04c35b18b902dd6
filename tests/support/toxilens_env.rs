use std::{
    path::PathBuf,
    sync::{Mutex, OnceLock},
};

use toxilens::app_dirs::CONFIG_HOME_ENV;
use toxilens::settings::API_BASE_ENV;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Points the app directory (and optionally the API base) at test values
/// until dropped.
pub struct ToxilensEnvGuard {
    previous: Vec<(&'static str, Option<String>)>,
    _lock: std::sync::MutexGuard<'static, ()>,
}

impl ToxilensEnvGuard {
    pub fn set(config_home: PathBuf, api_base: Option<&str>) -> Self {
        let lock = ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|err| err.into_inner());
        let previous = vec![
            (CONFIG_HOME_ENV, std::env::var(CONFIG_HOME_ENV).ok()),
            (API_BASE_ENV, std::env::var(API_BASE_ENV).ok()),
        ];
        // SAFETY: tests run under a global lock to prevent concurrent env mutations.
        unsafe {
            std::env::set_var(CONFIG_HOME_ENV, config_home);
            match api_base {
                Some(value) => std::env::set_var(API_BASE_ENV, value),
                None => std::env::remove_var(API_BASE_ENV),
            }
        }
        Self {
            previous,
            _lock: lock,
        }
    }
}

impl Drop for ToxilensEnvGuard {
    fn drop(&mut self) {
        for (key, value) in self.previous.drain(..) {
            // SAFETY: tests run under a global lock to prevent concurrent env mutations.
            unsafe {
                match value {
                    Some(value) => std::env::set_var(key, value),
                    None => std::env::remove_var(key),
                }
            }
        }
    }
}
