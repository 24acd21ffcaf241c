//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Endpoint list is non-empty and every entry is an http URL
//! - Validate value ranges (timeouts > 0, ports valid, limits > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BalancerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::BalancerConfig;
use crate::load_balancer::{DispatchError, Endpoint};

/// A single semantic problem with the configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("no worker endpoints configured")]
    NoEndpoints,

    #[error("{0}")]
    Endpoint(#[from] DispatchError),

    #[error("listener port must be non-zero")]
    ZeroPort,

    #[error("limits.max_request_size must be greater than zero")]
    ZeroRequestSize,

    #[error("timeouts.upstream_secs must be greater than zero")]
    ZeroUpstreamTimeout,

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let endpoints: Vec<&String> = config
        .upstream
        .endpoints
        .iter()
        .filter(|e| !e.trim().is_empty())
        .collect();
    if endpoints.is_empty() {
        errors.push(ValidationError::NoEndpoints);
    }
    for endpoint in endpoints {
        if let Err(e) = Endpoint::parse(endpoint) {
            errors.push(e.into());
        }
    }

    if config.listener.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }
    if config.limits.max_request_size == 0 {
        errors.push(ValidationError::ZeroRequestSize);
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::ZeroUpstreamTimeout);
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_socket_addr().is_none()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
