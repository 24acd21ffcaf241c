//! Round-robin dispatch strategy.

use std::sync::atomic::{AtomicUsize, Ordering};
use crate::load_balancer::endpoint::{Endpoint, EndpointSet};

/// Round-robin selector.
/// Rotates a shared cursor through the endpoint set. No exclusivity is
/// tracked, so one endpoint may serve several concurrent requests.
#[derive(Debug)]
pub struct RoundRobinDispatcher {
    endpoints: EndpointSet,
    /// Always in `0..endpoints.len()`.
    cursor: AtomicUsize,
}

impl RoundRobinDispatcher {
    pub fn new(endpoints: EndpointSet) -> Self {
        Self {
            endpoints,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Return the endpoint under the cursor and advance it by one.
    ///
    /// The read and the advance are a single atomic step, so concurrent
    /// callers observe a single total order of cursor values.
    pub fn select(&self) -> Endpoint {
        let len = self.endpoints.len();
        let index = match self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| Some((c + 1) % len))
        {
            Ok(prev) | Err(prev) => prev,
        };
        self.endpoints[index].clone()
    }

    /// Index the next `select` will return.
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }

    pub fn endpoints(&self) -> &EndpointSet {
        &self.endpoints
    }
}
