//! Tracing subscriber setup for the daemon.
//!
//! `RUST_LOG` wins when set; otherwise [`LoggerOptions::directive`] is used.
//! An optional log directory adds a daily-rolling file next to stderr output.

use std::path::PathBuf;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter};

const CLIENT_TARGET: &str = "proxmox_provider_client";
const LOG_FILE_PREFIX: &str = "proxmox-provider.log";

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("Invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("Failed to install tracing subscriber: {0}")]
    SetGlobalDefault(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("Failed to bridge log records: {0}")]
    LogTracer(#[from] tracing_log::log::SetLoggerError),
}

#[derive(Debug, Clone)]
pub struct LoggerOptions {
    /// Filter directive used when `RUST_LOG` is unset, e.g. `info`
    pub level: String,
    /// Raise the HTTP client's target to `debug`
    pub api_debug: bool,
    /// Directory for the rolling log file
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self { level: "info".to_string(), api_debug: false, log_dir: None }
    }
}

impl LoggerOptions {
    pub fn with_api_debug(mut self, api_debug: bool) -> Self {
        self.api_debug = api_debug;
        self
    }

    pub fn directive(&self) -> String {
        if self.api_debug {
            format!("{},{}=debug", self.level, CLIENT_TARGET)
        } else {
            self.level.clone()
        }
    }
}

/// Install the global subscriber. Keep the returned guard alive for the
/// lifetime of the process or buffered file output is lost.
pub fn init(options: &LoggerOptions) -> Result<Option<WorkerGuard>, LoggerError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(options.directive())?,
    };

    let (file_layer, guard) = match &options.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        },
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer);

    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;

    if let Some(dir) = &options.log_dir {
        tracing::info!("Writing logs to {}", dir.display());
    }

    Ok(guard)
}
