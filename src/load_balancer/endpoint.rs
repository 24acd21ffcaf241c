//! Worker endpoint abstraction.
//!
//! # Responsibilities
//! - Represent a single worker's job-submission route
//! - Parse the configured endpoint list (comma-separated or TOML array)
//! - Guarantee the set is non-empty before any dispatcher is built

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use url::Url;

use crate::load_balancer::DispatchError;

/// A single worker's job-submission URL.
///
/// Cloning is cheap; the parsed URL is shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    url: Arc<Url>,
}

impl Endpoint {
    /// Parse an endpoint from an absolute `http` URL.
    pub fn parse(raw: &str) -> Result<Self, DispatchError> {
        let raw = raw.trim();
        let url = Url::parse(raw).map_err(|source| DispatchError::InvalidEndpoint {
            endpoint: raw.to_string(),
            source,
        })?;

        // Plain-HTTP client; TLS to workers is terminated elsewhere.
        if url.scheme() != "http" {
            return Err(DispatchError::UnsupportedScheme {
                endpoint: raw.to_string(),
                scheme: url.scheme().to_string(),
            });
        }

        Ok(Self { url: Arc::new(url) })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// Ordered, non-empty list of endpoints fixed at startup.
#[derive(Debug, Clone)]
pub struct EndpointSet {
    endpoints: Vec<Endpoint>,
}

impl EndpointSet {
    /// Build a set from already-split entries. Blank entries are skipped.
    pub fn parse<I, S>(entries: I) -> Result<Self, DispatchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let endpoints = entries
            .into_iter()
            .filter(|e| !e.as_ref().trim().is_empty())
            .map(|e| Endpoint::parse(e.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(endpoints)
    }

    /// Build a set from a comma-separated list, e.g. the `WORKER_ENDPOINTS` variable.
    pub fn from_comma_list(list: &str) -> Result<Self, DispatchError> {
        Self::parse(list.split(','))
    }

    pub fn new(endpoints: Vec<Endpoint>) -> Result<Self, DispatchError> {
        if endpoints.is_empty() {
            return Err(DispatchError::EmptyEndpointSet);
        }

        // Duplicates are the operator's call; they just get a larger share of traffic.
        for (i, endpoint) in endpoints.iter().enumerate() {
            if endpoints[..i].contains(endpoint) {
                tracing::warn!(endpoint = %endpoint, "Duplicate worker endpoint configured");
            }
        }

        Ok(Self { endpoints })
    }

    /// First endpoint in configuration order.
    pub fn first(&self) -> &Endpoint {
        // Non-empty by construction.
        &self.endpoints[0]
    }
}

impl Deref for EndpointSet {
    type Target = [Endpoint];
    fn deref(&self) -> &Self::Target {
        &self.endpoints
    }
}
