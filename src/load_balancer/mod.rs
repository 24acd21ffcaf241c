//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! POST /prompt (body already size-checked)
//!     → Dispatcher::checkout
//!         - fixed.rs (one endpoint, shared by everyone)
//!         - round_robin.rs (rotate through endpoints, shared)
//!         - pool.rs (exclusive checkout, waits when empty)
//!     → Lease (endpoint + release-on-drop)
//!     → forwarder
//!     → Lease dropped → Dispatcher::release
//! ```
//!
//! # Design Decisions
//! - The endpoint set is fixed at startup; no discovery or health checks
//! - Only the pool variant tracks exclusivity; release is a no-op elsewhere
//! - Dispatcher state is owned by the instance and shared via `Arc`

pub mod endpoint;
pub mod fixed;
pub mod lease;
pub mod pool;
pub mod round_robin;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use endpoint::{Endpoint, EndpointSet};
pub use fixed::StaticDispatcher;
pub use lease::Lease;
pub use pool::PoolDispatcher;
pub use round_robin::RoundRobinDispatcher;

/// Errors raised while building or using a dispatcher.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No endpoints were configured.
    #[error("No worker endpoints configured")]
    EmptyEndpointSet,

    /// An endpoint is not a valid URL.
    #[error("Invalid worker endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    /// An endpoint uses a scheme the forwarder cannot speak.
    #[error("Unsupported scheme '{scheme}' in worker endpoint '{endpoint}'")]
    UnsupportedScheme { endpoint: String, scheme: String },

    /// The availability pool can no longer hand out endpoints.
    #[error("Endpoint pool closed")]
    PoolClosed,
}

/// Dispatch strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Always the first configured endpoint.
    Static,
    /// Rotate through endpoints, no exclusivity.
    #[default]
    RoundRobin,
    /// Exclusive checkout from a FIFO pool.
    Pool,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Static => "static",
            Strategy::RoundRobin => "round-robin",
            Strategy::Pool => "pool",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "static" => Ok(Strategy::Static),
            "round-robin" | "round_robin" | "roundrobin" => Ok(Strategy::RoundRobin),
            "pool" => Ok(Strategy::Pool),
            other => Err(format!(
                "unknown strategy '{}', expected one of: static, round-robin, pool",
                other
            )),
        }
    }
}

/// Selects the worker endpoint for each request.
#[derive(Debug)]
pub enum Dispatcher {
    Static(StaticDispatcher),
    RoundRobin(RoundRobinDispatcher),
    Pool(PoolDispatcher),
}

impl Dispatcher {
    /// Build the dispatcher for `strategy` over `endpoints`.
    pub fn new(strategy: Strategy, endpoints: EndpointSet) -> Self {
        match strategy {
            Strategy::Static => {
                if endpoints.len() > 1 {
                    tracing::warn!(
                        endpoint = %endpoints.first(),
                        ignored = endpoints.len() - 1,
                        "Static strategy uses only the first endpoint"
                    );
                }
                Dispatcher::Static(StaticDispatcher::new(endpoints.first().clone()))
            }
            Strategy::RoundRobin => Dispatcher::RoundRobin(RoundRobinDispatcher::new(endpoints)),
            Strategy::Pool => Dispatcher::Pool(PoolDispatcher::new(endpoints)),
        }
    }

    /// Select an endpoint without a lease. Only the pool variant can suspend;
    /// code outside this crate goes through `checkout`.
    pub(crate) async fn select(&self) -> Result<Endpoint, DispatchError> {
        match self {
            Dispatcher::Static(d) => Ok(d.select()),
            Dispatcher::RoundRobin(d) => Ok(d.select()),
            Dispatcher::Pool(d) => d.select().await,
        }
    }

    /// Return an endpoint obtained from `select`.
    pub(crate) fn release(&self, endpoint: Endpoint) {
        if let Dispatcher::Pool(d) = self {
            d.release(endpoint);
        }
    }

    /// Select an endpoint and wrap it in a lease that releases it on drop.
    pub async fn checkout(self: &Arc<Self>) -> Result<Lease, DispatchError> {
        let endpoint = self.select().await?;
        Ok(Lease::new(self.clone(), endpoint))
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            Dispatcher::Static(_) => Strategy::Static,
            Dispatcher::RoundRobin(_) => Strategy::RoundRobin,
            Dispatcher::Pool(_) => Strategy::Pool,
        }
    }

    /// Whether `release` returns the endpoint to a shared pool.
    pub fn tracks_exclusivity(&self) -> bool {
        matches!(self, Dispatcher::Pool(_))
    }

    /// Every endpoint this dispatcher can hand out, in configuration order.
    pub fn endpoints(&self) -> Vec<Endpoint> {
        match self {
            Dispatcher::Static(d) => vec![d.endpoint().clone()],
            Dispatcher::RoundRobin(d) => d.endpoints().to_vec(),
            Dispatcher::Pool(d) => d.endpoints().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> EndpointSet {
        EndpointSet::parse(["http://a/prompt_sync", "http://b/prompt_sync", "http://c/prompt_sync"])
            .unwrap()
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("pool".parse::<Strategy>().unwrap(), Strategy::Pool);
        assert_eq!("Round-Robin".parse::<Strategy>().unwrap(), Strategy::RoundRobin);
        assert_eq!("round_robin".parse::<Strategy>().unwrap(), Strategy::RoundRobin);
        assert_eq!("static".parse::<Strategy>().unwrap(), Strategy::Static);
        assert!("random".parse::<Strategy>().is_err());
        assert_eq!(Strategy::default(), Strategy::RoundRobin);
    }

    #[tokio::test]
    async fn test_static_uses_first_endpoint() {
        let endpoints = abc();
        let dispatcher = Dispatcher::new(Strategy::Static, endpoints.clone());
        assert_eq!(dispatcher.select().await.unwrap(), endpoints[0]);
        assert_eq!(dispatcher.select().await.unwrap(), endpoints[0]);
        assert!(!dispatcher.tracks_exclusivity());
    }

    #[tokio::test]
    async fn test_concurrent_round_robin_selects_cover_set() {
        let endpoints = abc();
        let dispatcher = Arc::new(Dispatcher::new(Strategy::RoundRobin, endpoints.clone()));

        let tasks: Vec<_> = (0..3)
            .map(|_| {
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move { dispatcher.select().await.unwrap() })
            })
            .collect();

        let mut got = Vec::new();
        for task in tasks {
            got.push(task.await.unwrap());
        }
        got.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        assert_eq!(got, endpoints.to_vec());

        match dispatcher.as_ref() {
            Dispatcher::RoundRobin(rr) => assert_eq!(rr.cursor(), 0),
            other => panic!("unexpected dispatcher {:?}", other.strategy()),
        }
    }

    #[tokio::test]
    async fn test_lease_releases_on_drop() {
        let dispatcher = Arc::new(Dispatcher::new(Strategy::Pool, abc()));
        let Dispatcher::Pool(pool) = dispatcher.as_ref() else {
            panic!("expected pool dispatcher");
        };

        let lease = dispatcher.checkout().await.unwrap();
        assert_eq!(pool.available(), 2);
        drop(lease);
        assert_eq!(pool.available(), 3);
    }

    #[tokio::test]
    async fn test_lease_released_when_task_panics() {
        let dispatcher = Arc::new(Dispatcher::new(Strategy::Pool, abc()));

        let d = dispatcher.clone();
        let result = tokio::spawn(async move {
            let _lease = d.checkout().await.unwrap();
            panic!("forwarding blew up");
        })
        .await;
        assert!(result.is_err());

        let Dispatcher::Pool(pool) = dispatcher.as_ref() else {
            panic!("expected pool dispatcher");
        };
        assert_eq!(pool.available(), 3);
    }

    #[tokio::test]
    async fn test_release_is_noop_without_exclusivity() {
        let dispatcher = Arc::new(Dispatcher::new(Strategy::RoundRobin, abc()));
        let lease = dispatcher.checkout().await.unwrap();
        let endpoint = lease.endpoint().clone();
        drop(lease);
        assert_eq!(dispatcher.endpoints().len(), 3);
        assert_eq!(endpoint.as_str(), "http://a/prompt_sync");
    }
}
