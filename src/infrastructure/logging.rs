//! Centralized file-based logging
//!
//! Writes logs under a root directory, separated by log type:
//! - main/ - all events (JSON)
//! - error/ - warnings and errors only
//! - share/ - connection pool events
//! - stream/ - seekable stream events

use std::fs;
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter,
};

/// Log sub-directories created under the root
pub const LOG_TYPES: [&str; 4] = ["main", "error", "share", "stream"];

/// Create the root log directory and one sub-directory per log type
pub fn prepare_log_dirs(root: &Path) -> io::Result<()> {
    for log_type in LOG_TYPES {
        fs::create_dir_all(root.join(log_type))?;
    }
    Ok(())
}

/// Initialize file logging under `root`
///
/// Returns the writer guards, which must be kept alive for the duration of
/// the program. Fails if the directories cannot be created or a global
/// subscriber is already installed.
pub fn init_logging(root: &Path) -> io::Result<Vec<WorkerGuard>> {
    prepare_log_dirs(root)?;

    let mut guards = Vec::new();

    let (main_appender, main_guard) = create_appender(root, "main");
    guards.push(main_guard);

    let (error_appender, error_guard) = create_appender(root, "error");
    guards.push(error_guard);

    let (share_appender, share_guard) = create_appender(root, "share");
    guards.push(share_guard);

    let (stream_appender, stream_guard) = create_appender(root, "stream");
    guards.push(stream_guard);

    let main_layer = tracing_subscriber::fmt::layer()
        .with_writer(main_appender)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .json();

    let error_layer = tracing_subscriber::fmt::layer()
        .with_writer(error_appender)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_filter(tracing_subscriber::filter::LevelFilter::WARN);

    let share_layer = tracing_subscriber::fmt::layer()
        .with_writer(share_appender)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_filter(tracing_subscriber::filter::filter_fn(|metadata| {
            metadata.target() == "share"
        }));

    let stream_layer = tracing_subscriber::fmt::layer()
        .with_writer(stream_appender)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_filter(tracing_subscriber::filter::filter_fn(|metadata| {
            metadata.target() == "stream"
        }));

    // Console layer for development
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(EnvFilter::new("info"))
        .with(main_layer)
        .with(error_layer)
        .with(share_layer)
        .with(stream_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e))?;

    tracing::info!("Logging system initialized. Log files in {}", root.display());

    Ok(guards)
}

/// Create a daily rolling, non-blocking file appender
fn create_appender(root: &Path, name: &str) -> (NonBlocking, WorkerGuard) {
    let appender = RollingFileAppender::new(Rotation::DAILY, root.join(name), name);
    tracing_appender::non_blocking(appender)
}

/// Log macro helpers for specific log types
#[macro_export]
macro_rules! log_share {
    ($level:expr, $($arg:tt)+) => {
        tracing::event!(target: "share", $level, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_stream {
    ($level:expr, $($arg:tt)+) => {
        tracing::event!(target: "stream", $level, $($arg)+)
    };
}
