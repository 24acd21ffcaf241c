//! Static dispatch: every request goes to one fixed endpoint.
//!
//! Used when an external load balancer already spreads traffic across
//! identical workers behind a single address.

use crate::load_balancer::endpoint::Endpoint;

/// Always selects the same endpoint. Holds no mutable state.
#[derive(Debug, Clone)]
pub struct StaticDispatcher {
    endpoint: Endpoint,
}

impl StaticDispatcher {
    pub fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }

    pub fn select(&self) -> Endpoint {
        self.endpoint.clone()
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}
