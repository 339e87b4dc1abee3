use anyhow::Result;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Install stdout and file logging for one batch run.
///
/// The run log rotates daily as `<log_dir>/sanitizer.<date>.log`, next to the
/// per-document JSON logs. Keep the returned guard alive until the batch ends
/// or buffered lines are lost.
pub fn init_logger(log_dir: &Path) -> Result<WorkerGuard> {
    let log_level = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,text_sanitizer=debug".to_string());

    // pretty (default) or json
    let log_format = std::env::var("LOG_FORMAT")
        .unwrap_or_else(|_| "pretty".to_string());

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("sanitizer")
        .filename_suffix("log")
        .build(log_dir)?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_new(&log_level)?;
    let registry = tracing_subscriber::registry().with(filter);

    if log_format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stdout))
            .with(
                fmt::layer()
                    .json()
                    .with_writer(file_writer)
                    .with_thread_ids(true)
            )
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .compact()
                    .with_writer(std::io::stdout)
                    .with_target(false)
            )
            .with(
                fmt::layer()
                    .with_writer(file_writer)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_ansi(false)
            )
            .try_init()?;
    }

    Ok(guard)
}
