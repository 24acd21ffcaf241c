//! Exclusive endpoint pool.
//!
//! # Responsibilities
//! - Treat the endpoint set as a bounded resource
//! - Hand each endpoint to at most one request at a time
//! - Park callers in FIFO order while every endpoint is checked out
//!
//! # Design Decisions
//! - A fair semaphore orders the waiters; a `VecDeque` orders the endpoints
//! - Permits and queue entries move together: one permit per queued endpoint
//! - The wait for an endpoint has no timeout. Under sustained overload
//!   requests pile up here until a worker frees up.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::Semaphore;

use crate::load_balancer::DispatchError;
use crate::load_balancer::endpoint::{Endpoint, EndpointSet};
use crate::observability::metrics;

/// FIFO pool of exclusively checked-out endpoints.
#[derive(Debug)]
pub struct PoolDispatcher {
    endpoints: EndpointSet,
    available: Mutex<VecDeque<Endpoint>>,
    permits: Semaphore,
    capacity: usize,
}

impl PoolDispatcher {
    /// Seed the pool with every endpoint exactly once.
    pub fn new(endpoints: EndpointSet) -> Self {
        let capacity = endpoints.len();
        let available: VecDeque<Endpoint> = endpoints.iter().cloned().collect();
        metrics::record_pool_available(capacity);

        Self {
            endpoints,
            available: Mutex::new(available),
            permits: Semaphore::new(capacity),
            capacity,
        }
    }

    /// Check out the endpoint at the head of the queue, waiting if none is free.
    pub(crate) async fn select(&self) -> Result<Endpoint, DispatchError> {
        let permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| DispatchError::PoolClosed)?;

        let (endpoint, remaining) = {
            let mut available = self.lock();
            (available.pop_front(), available.len())
        };

        match endpoint {
            Some(endpoint) => {
                // The permit now travels with the endpoint until `release`.
                permit.forget();
                metrics::record_pool_available(remaining);
                tracing::debug!(endpoint = %endpoint, available = remaining, "Endpoint checked out");
                Ok(endpoint)
            }
            None => Err(DispatchError::PoolClosed),
        }
    }

    /// Return a checked-out endpoint to the tail of the queue.
    ///
    /// A release that would put more copies of `endpoint` in the queue than
    /// the pool was seeded with is dropped and logged; the pool size never grows.
    pub(crate) fn release(&self, endpoint: Endpoint) {
        let remaining = {
            let mut available = self.lock();
            let seeded = self.endpoints.iter().filter(|e| **e == endpoint).count();
            let queued = available.iter().filter(|e| **e == endpoint).count();
            if available.len() >= self.capacity || queued >= seeded {
                tracing::warn!(
                    endpoint = %endpoint,
                    available = available.len(),
                    capacity = self.capacity,
                    "Ignoring release of an endpoint that is not checked out"
                );
                return;
            }
            tracing::debug!(endpoint = %endpoint, available = available.len() + 1, "Endpoint checked in");
            available.push_back(endpoint);
            available.len()
        };
        metrics::record_pool_available(remaining);
        self.permits.add_permits(1);
    }

    /// Number of endpoints currently free.
    pub fn available(&self) -> usize {
        self.lock().len()
    }

    /// Number of endpoints the pool was seeded with.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn endpoints(&self) -> &EndpointSet {
        &self.endpoints
    }

    /// Number of endpoints currently checked out.
    pub fn in_flight(&self) -> usize {
        self.capacity.saturating_sub(self.available())
    }

    /// Snapshot of the free endpoints, head first.
    pub fn snapshot(&self) -> Vec<Endpoint> {
        self.lock().iter().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Endpoint>> {
        // The queue is never left half-updated, so a poisoned lock is still usable.
        self.available.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn set(n: usize) -> EndpointSet {
        EndpointSet::parse((0..n).map(|i| format!("http://127.0.0.1:93{:02}/prompt_sync", i)))
            .unwrap()
    }

    #[tokio::test]
    async fn test_checkout_is_fifo() {
        let endpoints = set(3);
        let pool = PoolDispatcher::new(endpoints.clone());

        let a = pool.select().await.unwrap();
        let b = pool.select().await.unwrap();
        assert_eq!(a, endpoints[0]);
        assert_eq!(b, endpoints[1]);
        assert_eq!(pool.available(), 1);

        pool.release(a.clone());
        assert_eq!(pool.snapshot(), vec![endpoints[2].clone(), a]);
        pool.release(b);
        assert_eq!(pool.available(), 3);
    }

    #[tokio::test]
    async fn test_select_waits_for_release() {
        let endpoints = set(1);
        let pool = Arc::new(PoolDispatcher::new(endpoints.clone()));

        let held = pool.select().await.unwrap();
        assert_eq!(pool.available(), 0);

        let waiter = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.select().await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished(), "select must park while the pool is empty");

        pool.release(held);
        let got = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter woke up")
            .unwrap()
            .unwrap();
        assert_eq!(got, endpoints[0]);
        assert_eq!(pool.available(), 0);
    }

    #[tokio::test]
    async fn test_waiters_served_in_order() {
        let pool = Arc::new(PoolDispatcher::new(set(1)));
        let held = pool.select().await.unwrap();
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));

        let mut waiters = Vec::new();
        for id in 0..3 {
            let pool = pool.clone();
            let order = order.clone();
            waiters.push(tokio::spawn(async move {
                let endpoint = pool.select().await.unwrap();
                order.lock().unwrap().push(id);
                pool.release(endpoint);
            }));
            // Let each waiter queue up before the next one arrives.
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        pool.release(held);
        for waiter in waiters {
            waiter.await.unwrap();
        }
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(pool.available(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_outstanding_never_exceeds_capacity() {
        let capacity = 3;
        let pool = Arc::new(PoolDispatcher::new(set(capacity)));
        let outstanding = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let holders = Arc::new(std::sync::Mutex::new(std::collections::HashSet::new()));

        let tasks: Vec<_> = (0..30)
            .map(|_| {
                let pool = pool.clone();
                let outstanding = outstanding.clone();
                let peak = peak.clone();
                let holders = holders.clone();
                tokio::spawn(async move {
                    let endpoint = pool.select().await.unwrap();
                    assert!(
                        holders.lock().unwrap().insert(endpoint.clone()),
                        "endpoint handed out twice"
                    );
                    let now = outstanding.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);

                    tokio::time::sleep(Duration::from_millis(5)).await;

                    outstanding.fetch_sub(1, Ordering::SeqCst);
                    holders.lock().unwrap().remove(&endpoint);
                    pool.release(endpoint);
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap();
        }

        assert!(peak.load(Ordering::SeqCst) <= capacity);
        assert_eq!(pool.available(), capacity);
        assert_eq!(pool.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_release_without_checkout_is_ignored() {
        let endpoints = set(1);
        let pool = PoolDispatcher::new(endpoints.clone());

        pool.release(endpoints[0].clone());
        assert_eq!(pool.available(), 1);
        assert_eq!(pool.capacity(), 1);
        assert_eq!(pool.in_flight(), 0);

        // Only one holder at a time, even after the stray release.
        let held = pool.select().await.unwrap();
        assert_eq!(held, endpoints[0]);
        let second = tokio::time::timeout(Duration::from_millis(50), pool.select()).await;
        assert!(second.is_err(), "endpoint handed out twice");
        assert_eq!(pool.in_flight(), 1);
    }

    #[tokio::test]
    async fn test_double_release_is_ignored() {
        let endpoints = set(2);
        let pool = PoolDispatcher::new(endpoints.clone());

        let a = pool.select().await.unwrap();
        pool.release(a.clone());
        pool.release(a.clone());
        assert_eq!(pool.snapshot(), vec![endpoints[1].clone(), a]);

        // A stray release of a free endpoint must not mask a real checkout.
        let b = pool.select().await.unwrap();
        assert_eq!(b, endpoints[1]);
        pool.release(endpoints[0].clone());
        assert_eq!(pool.available(), 1);
        assert_eq!(pool.in_flight(), 1);
        pool.release(b);
        assert_eq!(pool.available(), 2);
    }
}
