//! Endpoint lease.
//!
//! # Responsibilities
//! - Pair every `select` with exactly one `release`
//! - Release on every exit path: success, upstream failure, panic, task abort

use std::ops::Deref;
use std::sync::Arc;

use crate::load_balancer::Dispatcher;
use crate::load_balancer::endpoint::Endpoint;

/// A RAII guard over a selected endpoint.
///
/// Dropping the lease releases the endpoint back to its dispatcher.
#[derive(Debug)]
pub struct Lease {
    dispatcher: Arc<Dispatcher>,
    endpoint: Option<Endpoint>,
}

impl Lease {
    pub(crate) fn new(dispatcher: Arc<Dispatcher>, endpoint: Endpoint) -> Self {
        Self {
            dispatcher,
            endpoint: Some(endpoint),
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        self
    }
}

impl Deref for Lease {
    type Target = Endpoint;
    fn deref(&self) -> &Self::Target {
        // Only `drop` takes the endpoint out.
        match &self.endpoint {
            Some(endpoint) => endpoint,
            None => unreachable!("lease endpoint taken before drop"),
        }
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        if let Some(endpoint) = self.endpoint.take() {
            self.dispatcher.release(endpoint);
        }
    }
}
