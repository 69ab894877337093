use anyhow::{Context, Result};
use camino::Utf8Path;
use std::fs::File;
use std::io;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Level used when `RUST_LOG` is not set.
pub fn default_directive(debug_mode: bool) -> &'static str {
    if debug_mode { "debug" } else { "info" }
}

/// `RUST_LOG` if present and valid, otherwise [`default_directive`].
pub fn build_filter(debug_mode: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(debug_mode)))
}

/// Create (or truncate) the log file. Each launch starts with an empty log.
pub fn open_log_file(log_path: &Utf8Path) -> io::Result<File> {
    if let Some(parent) = log_path.parent().filter(|p| !p.as_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    File::create(log_path)
}

/// Setup logging to a single file next to the launcher.
///
/// If the file can't be created, logging goes to stderr instead and the launch goes on.
///
/// # Arguments
/// * `log_path` - Log file, truncated on every start
/// * `debug_mode` - If true, use debug level; otherwise use info level
/// * `console_output` - If true, also log to stderr
///
/// # Returns
/// A guard that must be held for the duration of the program to flush the file writer,
/// or `None` when no file is being written.
pub fn setup_logging(
    log_path: &Utf8Path,
    debug_mode: bool,
    console_output: bool,
) -> Result<Option<WorkerGuard>> {
    let (writer, guard, file_error) = match open_log_file(log_path) {
        Ok(file) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            (Some(writer), Some(guard), None)
        }
        Err(e) => (None, None, Some(e)),
    };

    let file_layer = writer.map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
    });

    let console_layer = (console_output || file_error.is_some()).then(|| {
        fmt::layer()
            .with_writer(io::stderr)
            .with_ansi(true)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(build_filter(debug_mode))
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install the global tracing subscriber")?;

    match file_error {
        None => tracing::info!("Logging initialized: file={}, debug={}", log_path, debug_mode),
        Some(e) => tracing::warn!("Could not create log file {}: {}; logging to stderr", log_path, e),
    }

    Ok(guard)
}
