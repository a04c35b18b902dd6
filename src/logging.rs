//! Tracing setup: stdout plus one log file per launch under `.toxilens/logs`.
//!
//! Log files are named `toxilens_<YYYYMMDD-HHMMSS>.log`, so lexical order is
//! launch order; only the newest [`KEEP_LOG_FILES`] survive a launch.

use std::{
    fs::{self, File, OpenOptions},
    io,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};
use tracing::subscriber::SetGlobalDefaultError;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::app_dirs::{self, AppDirError};

/// Number of launch logs kept on disk.
pub const KEEP_LOG_FILES: usize = 10;
const LOG_FILE_PREFIX: &str = "toxilens_";
const LOG_FILE_EXTENSION: &str = ".log";
const DEFAULT_FILTER: &str = "info,ureq=warn";

struct ActiveLog {
    path: PathBuf,
    _guard: WorkerGuard,
}

static ACTIVE_LOG: OnceLock<ActiveLog> = OnceLock::new();

/// Errors that may occur while initializing logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Log directory unavailable: {0}")]
    Dir(#[from] AppDirError),
    #[error("Log file operation failed for {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("Failed to format log file timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
    #[error("Failed to install global tracing subscriber: {0}")]
    Subscriber(#[from] SetGlobalDefaultError),
}

/// Install the global subscriber and return the path of this launch's log file.
///
/// Repeated calls return the already active file. Callers are expected to
/// carry on without file logging when this fails.
pub fn init() -> Result<PathBuf, LoggingError> {
    if let Some(active) = ACTIVE_LOG.get() {
        return Ok(active.path.clone());
    }

    let dir = app_dirs::logs_dir()?;
    let path = dir.join(log_file_name(launch_time())?);
    let file = open_log_file(&path)?;
    let removed = prune_logs(&dir, KEEP_LOG_FILES)?;

    let (file_writer, guard) = tracing_appender::non_blocking(file);
    let timer = local_timer();
    let subscriber = tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_timer(timer.clone()).with_target(false))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_timer(timer)
                .with_writer(file_writer),
        );
    tracing::subscriber::set_global_default(subscriber)?;

    let path = ACTIVE_LOG
        .get_or_init(|| ActiveLog {
            path,
            _guard: guard,
        })
        .path
        .clone();
    tracing::info!(log_file = %path.display(), pruned = removed, "Logging initialized");
    Ok(path)
}

/// Install a stdout-only subscriber, used when [`init`] could not set up the
/// log file.
pub fn init_stdout_only() -> Result<(), LoggingError> {
    let subscriber = tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_timer(local_timer()).with_target(false));
    tracing::subscriber::set_global_default(subscriber)?;
    tracing::warn!("File logging unavailable; logging to stdout only");
    Ok(())
}

fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn is_launch_log(name: &str) -> bool {
    name.starts_with(LOG_FILE_PREFIX) && name.ends_with(LOG_FILE_EXTENSION)
}

/// Delete the oldest launch logs in `dir` beyond `keep`; returns how many went.
fn prune_logs(dir: &Path, keep: usize) -> Result<usize, LoggingError> {
    let read_error = |source| LoggingError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut logs: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(read_error)?
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_file()))
        .filter(|entry| entry.file_name().to_str().is_some_and(is_launch_log))
        .map(|entry| entry.path())
        .collect();
    logs.sort();

    let excess = logs.len().saturating_sub(keep);
    for path in logs.into_iter().take(excess) {
        fs::remove_file(&path).map_err(|source| LoggingError::Io { path, source })?;
    }
    Ok(excess)
}

fn log_file_name(at: OffsetDateTime) -> Result<String, LoggingError> {
    const STAMP: &[FormatItem<'_>] =
        format_description!("[year][month][day]-[hour][minute][second]");
    Ok(format!(
        "{LOG_FILE_PREFIX}{}{LOG_FILE_EXTENSION}",
        at.format(STAMP)?
    ))
}

fn launch_time() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

fn local_timer() -> fmt::time::OffsetTime<time::format_description::BorrowedFormatItem<'static>> {
    const LINE_STAMP: &[FormatItem<'static>] =
        format_description!("[hour]:[minute]:[second].[subsecond digits:3]");
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    fmt::time::OffsetTime::new(offset, LINE_STAMP.into())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
