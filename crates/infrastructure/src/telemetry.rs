//! Logging initialisation
//!
//! One `tracing` subscriber per process. `RUST_LOG` wins over the configured
//! filter; JSON output is meant for schedulers that ship logs elsewhere.
//! With `logging.file` set, every line is also appended to that file.

use std::path::Path;

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::config::LoggingConfig;

type Filtered = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<Filtered> + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Invalid log filter '{filter}': {reason}")]
    Filter { filter: String, reason: String },

    #[error("Cannot open log file {path}: {reason}")]
    File { path: String, reason: String },

    #[error("Failed to initialize tracing: {0}")]
    Init(String),
}

/// Flushes the log file when dropped; hold it until the process exits
#[must_use = "dropping the guard stops writes to the log file"]
#[derive(Debug)]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Resolve the effective filter: `RUST_LOG` when set, else `config.filter`
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.filter).map_err(|e| TelemetryError::Filter {
        filter: config.filter.clone(),
        reason: e.to_string(),
    })
}

fn fmt_layer<W>(json: bool, ansi: bool, writer: W) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_ansi(ansi)
        .with_writer(writer);
    if json {
        layer.json().with_current_span(true).boxed()
    } else {
        layer.with_target(true).boxed()
    }
}

/// Appending, never-rotated writer for `path`; missing parent directories
/// are created
fn file_appender(path: &Path) -> Result<RollingFileAppender, TelemetryError> {
    let error = |reason: String| TelemetryError::File {
        path: path.display().to_string(),
        reason,
    };
    let name = path
        .file_name()
        .ok_or_else(|| error("path has no file name".into()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name.to_string_lossy())
        .build(dir)
        .map_err(|e| error(e.to_string()))
}

/// stderr layer plus the optional file layer
fn layers(config: &LoggingConfig) -> Result<(Vec<BoxedLayer>, LogGuard), TelemetryError> {
    let mut layers = vec![fmt_layer(config.json, true, std::io::stderr)];
    let worker = match &config.file {
        Some(path) => {
            let (writer, worker) = tracing_appender::non_blocking(file_appender(path)?);
            layers.push(fmt_layer(config.json, false, writer));
            Some(worker)
        },
        None => None,
    };
    Ok((layers, LogGuard { _file: worker }))
}

/// Install the global subscriber
///
/// Logs go to stderr so stdout stays free for command output.
pub fn init_logging(config: &LoggingConfig) -> Result<LogGuard, TelemetryError> {
    let filter = env_filter(config)?;
    let (layers, guard) = layers(config)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(layers)
        .try_init()
        .map_err(|e| TelemetryError::Init(e.to_string()))?;

    info!(json = config.json, file = ?config.file, "Logging initialized");
    Ok(guard)
}
