//! Per-request access logging.
//!
//! # Responsibilities
//! - Describe one served request (client IP, request line, status)
//! - Hand the entry to a sink; the default sink emits a tracing event that
//!   `logging.rs` routes to the access log file

use std::fmt;
use std::net::IpAddr;
use axum::http::{Method, StatusCode, Version};

/// Tracing target reserved for access entries.
pub const ACCESS_LOG_TARGET: &str = "access_log";

/// One access log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessEntry {
    /// Peer address, when the transport exposes it.
    pub client_ip: Option<IpAddr>,
    pub method: Method,
    pub path: String,
    pub version: Version,
    pub status: StatusCode,
}

impl AccessEntry {
    /// `METHOD PATH HTTP/VERSION`, e.g. `POST /prompt HTTP/1.1`.
    pub fn request_line(&self) -> String {
        format!("{} {} {}", self.method, self.path, protocol(self.version))
    }

    pub fn client(&self) -> ClientIp {
        ClientIp(self.client_ip)
    }
}

/// Protocol token as it appears on a request line.
fn protocol(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        Version::HTTP_2 => "HTTP/2",
        Version::HTTP_3 => "HTTP/3",
        _ => "HTTP/?",
    }
}

/// Display adapter printing `unknown` when the peer address is missing.
#[derive(Debug, Clone, Copy)]
pub struct ClientIp(Option<IpAddr>);

impl fmt::Display for ClientIp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(ip) => write!(f, "{}", ip),
            None => f.write_str("unknown"),
        }
    }
}

/// Sink for access entries.
pub trait AccessLog: Send + Sync {
    fn record(&self, entry: &AccessEntry);
}

/// Emits each entry as an `info` event on [`ACCESS_LOG_TARGET`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAccessLog;

impl AccessLog for TracingAccessLog {
    fn record(&self, entry: &AccessEntry) {
        tracing::info!(
            target: ACCESS_LOG_TARGET,
            client_ip = %entry.client(),
            request_line = %entry.request_line(),
            status_code = entry.status.as_u16()
        );
    }
}
