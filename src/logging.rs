//! Logging setup
//!
//! Logs go to stderr so stdout only carries the prototype report. The filter
//! comes from `RUST_LOG` when set, then from [`LogSettings::filter`], then
//! [`DEFAULT_FILTER`]. With [`LogSettings::file`] set, logs are also written
//! to that file through a non-blocking `tracing-appender` writer.

use crate::config::LogSettings;
use crate::error::{PrototypeError, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when neither `RUST_LOG` nor the settings name one
pub const DEFAULT_FILTER: &str = "info,dwarf_prototypes=info";

/// Build the filter for `settings`
pub fn env_filter(settings: &LogSettings) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directive = settings.filter.as_deref().unwrap_or(DEFAULT_FILTER);
        EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    })
}

/// Install the global subscriber
///
/// The returned guard flushes the log file on drop and must be held for the
/// life of the program.
pub fn init_logging(settings: &LogSettings) -> Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match &settings.file {
        Some(path) => {
            let (dir, name) = split_log_path(path)?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter(settings))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(|e| PrototypeError::Config(format!("Failed to initialise logging: {}", e)))?;

    Ok(guard)
}

fn split_log_path(path: &Path) -> Result<(PathBuf, PathBuf)> {
    let name = path.file_name().ok_or_else(|| {
        PrototypeError::Config(format!("Log file path {:?} has no file name", path))
    })?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, PathBuf::from(name)))
}
