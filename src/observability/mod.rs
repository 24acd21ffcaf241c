//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every request produces:
//!     → access_log.rs (one entry: client IP, request line, status)
//!     → metrics.rs (counters, histograms, pool gauge)
//!     → logging.rs (structured diagnostic events)
//!
//! Consumers:
//!     → stdout (human readable diagnostics)
//!     → access log file (JSON lines, appended)
//!     → Prometheus scrape (optional)
//! ```
//!
//! # Design Decisions
//! - Access entries are plain tracing events on a dedicated target
//! - The access logger is injected, so tests can capture entries in memory
//! - Metrics are cheap (atomic increments) and no-ops without an exporter

pub mod access_log;
pub mod logging;
pub mod metrics;

pub use access_log::{AccessEntry, AccessLog, TracingAccessLog, ACCESS_LOG_TARGET};
