//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global tracing subscriber
//! - Human-readable diagnostics on stdout, filtered by `RUST_LOG`
//! - JSON access entries appended to the access log file
//!
//! # Design Decisions
//! - Per-layer filters: `RUST_LOG` never silences the access log
//! - File writes go through a non-blocking appender; keep the guard alive

use std::io;
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::ObservabilityConfig;
use crate::observability::access_log::ACCESS_LOG_TARGET;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping it flushes and closes the access log writer.
pub struct LoggingGuard {
    _access_guard: WorkerGuard,
}

/// Initialize logging.
///
/// Creates the access log's parent directory if needed. Existing entries are
/// kept; new ones are appended.
pub fn init_logging(config: &ObservabilityConfig) -> Result<LoggingGuard, io::Error> {
    let (dir, file) = split_log_path(&config.access_log_path)?;
    std::fs::create_dir_all(&dir)?;

    let appender = tracing_appender::rolling::never(&dir, &file);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let access_layer = tracing_subscriber::fmt::layer()
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(Targets::new().with_target(ACCESS_LOG_TARGET, Level::INFO));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_filter(env_filter(&config.log_level));

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(access_layer)
        .try_init()
        .map_err(io::Error::other)?;

    Ok(LoggingGuard {
        _access_guard: guard,
    })
}

/// `RUST_LOG` if set, otherwise `level` for this crate and tower-http.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "prompt_balancer={level},tower_http={level},{ACCESS_LOG_TARGET}=info"
        ))
    })
}

fn split_log_path(path: &str) -> Result<(String, String), io::Error> {
    let path = Path::new(path);
    let file = path
        .file_name()
        .and_then(|f| f.to_str())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("access log path '{}' has no file name", path.display()),
            )
        })?
        .to_string();

    let dir = match path.parent().and_then(|p| p.to_str()) {
        Some("") | None => ".".to_string(),
        Some(dir) => dir.to_string(),
    };

    Ok((dir, file))
}
