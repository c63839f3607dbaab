//! Veil Core
//!
//! Central coordination layer for the Veil browser. The window shell builds
//! one [`Browser`] from a [`Config`], feeds it engine events and key presses,
//! and listens for [`ShellNotice`]s.

mod browser;
mod config;
mod error;
mod input;
mod keymap;
mod zoom;

pub use browser::{Browser, ShellRequest};
pub use config::{Config, CONFIG_FILE_NAME};
pub use error::CoreError;
pub use input::{InputResolution, InputResolver};
pub use keymap::{normalize_keys, Action, Keymap};
pub use zoom::{ZoomStepper, DEFAULT_ZOOM_STEPS};

// Re-export core components
pub use veil_history::{
    FaviconCache, FaviconImage, FaviconRecord, FaviconStatus, HistoryEntry, HistoryError,
    HistoryLedger,
};
pub use veil_storage::{DocumentStore, JsonFileStore, SqliteStore, StorageError};
pub use veil_tabs::{EngineEvent, EngineFactory, ShellNotice, Tab, TabError, TabId, TabManager, WebEngine};

use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;

pub type Result<T> = std::result::Result<T, CoreError>;

pub const LOG_FILE_NAME: &str = "veil_browser.log";

/// Keeps the background log writer alive. Buffered lines are flushed when dropped.
#[must_use = "logging to the file stops when the handle is dropped"]
pub struct LogHandle {
    path: PathBuf,
    _guard: WorkerGuard,
}

impl LogHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Initialize logging
///
/// Always appends to `<data_dir>/logs/veil_browser.log`; also prints to
/// stdout when `stdout_log` is set. `RUST_LOG` overrides the default `info`
/// level.
pub fn init_logging(config: &Config) -> Result<LogHandle> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let log_dir = config.log_dir();
    fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE_NAME)
        .build(&log_dir)
        .map_err(|e| CoreError::Logging(e.to_string()))?;
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true);
    let stdout_layer = config
        .stdout_log
        .then(|| fmt::layer().with_target(true));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .map_err(|e| CoreError::Logging(e.to_string()))?;

    let path = log_dir.join(LOG_FILE_NAME);
    tracing::info!(path = %path.display(), "Logging initialized");

    Ok(LogHandle {
        path,
        _guard: guard,
    })
}
