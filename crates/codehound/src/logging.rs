//! Process-wide tracing setup
//!
//! Logs always go to stderr so stdout carries only results. When a log
//! directory is configured, a daily-rotated file receives the same events.

use anyhow::Context;
use codehound_config::TelemetryConfig;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

const LOG_FILE_PREFIX: &str = "codehound.log";

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over the configured level. The returned
/// guards flush the non-blocking writers and must be held until exit.
///
/// # Errors
/// Returns an error if the log directory cannot be created or a global
/// subscriber is already installed
pub fn init(telemetry: &TelemetryConfig) -> anyhow::Result<Vec<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&telemetry.tracing_level));

    let (stderr_writer, stderr_guard): (NonBlocking, WorkerGuard) =
        tracing_appender::non_blocking(std::io::stderr());
    let mut guards = vec![stderr_guard];

    if let Some(log_dir) = &telemetry.log_dir {
        std::fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

        let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);
        let (file_writer, file_guard): (NonBlocking, WorkerGuard) =
            tracing_appender::non_blocking(file_appender);
        guards.push(file_guard);

        install(filter, telemetry.json_logs, stderr_writer.and(file_writer))?;
    } else {
        install(filter, telemetry.json_logs, stderr_writer)?;
    }

    Ok(guards)
}

fn install<W>(filter: EnvFilter, json: bool, writer: W) -> anyhow::Result<()>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| anyhow::anyhow!(e).context("Failed to install tracing subscriber"))
}
