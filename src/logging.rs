//! Tracing setup. The TUI owns the terminal, so events go to a log file
//! instead of stderr.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_NAME: &str = "library-manager.log";

/// Install the global subscriber writing to `<log_dir>/library-manager.log`.
/// Keep the returned guard alive for the whole run or buffered lines are lost.
pub fn init_logging(log_dir: &Path, filter: &str) -> Result<WorkerGuard> {
    fs::create_dir_all(log_dir).context("failed to create log directory")?;

    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_new(filter).context("invalid log filter")?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .try_init()
        .context("failed to install tracing subscriber")?;

    tracing::info!(
        "Starting Library Manager v{}",
        env!("CARGO_PKG_VERSION")
    );
    Ok(guard)
}
