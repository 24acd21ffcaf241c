//! Upstream forwarding.
//!
//! # Responsibilities
//! - Build the outbound POST for the selected endpoint
//! - Enforce the upstream deadline over the whole exchange
//! - Buffer the worker's response into an `OutboundResult`
//!
//! # Design Decisions
//! - One shared hyper client; connections to workers are pooled by hyper
//! - Every transport failure is a `ForwardError`; callers do not tell them apart
//! - No retries: one failure, one failed response

use std::time::{Duration, Instant};
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request};
use http_body_util::BodyExt;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use thiserror::Error;

use crate::http::request::outbound_headers;
use crate::http::response::OutboundResult;
use crate::load_balancer::Endpoint;
use crate::observability::metrics;

/// Failure talking to a worker.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// No complete response within the deadline.
    #[error("upstream timed out after {0} seconds")]
    Timeout(u64),

    /// Connection refused, DNS failure, protocol error.
    #[error("upstream connection failed: {0}")]
    Connect(#[from] hyper_util::client::legacy::Error),

    /// Outbound request could not be assembled.
    #[error("failed to build upstream request: {0}")]
    Build(#[from] axum::http::Error),

    /// Response body broke off mid-stream.
    #[error("failed to read upstream body: {0}")]
    Body(#[from] hyper::Error),
}

/// Relays request bodies to worker endpoints.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    timeout: Duration,
}

impl Forwarder {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder(TokioExecutor::new())
            .build(HttpConnector::new());

        Self { client, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// POST `body` to `endpoint` with the inbound `headers`, minus `host` and `content-length`.
    pub async fn forward(
        &self,
        endpoint: &Endpoint,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<OutboundResult, ForwardError> {
        let start = Instant::now();

        let result = match tokio::time::timeout(self.timeout, self.exchange(endpoint, headers, body)).await {
            Ok(result) => result,
            Err(_) => Err(ForwardError::Timeout(self.timeout.as_secs())),
        };

        match &result {
            Ok(outbound) => {
                metrics::record_upstream(endpoint.as_str(), start);
                tracing::debug!(
                    endpoint = %endpoint,
                    status = %outbound.status,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Upstream responded"
                );
            }
            Err(_) => metrics::record_upstream_failure(endpoint.as_str()),
        }

        result
    }

    async fn exchange(
        &self,
        endpoint: &Endpoint,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<OutboundResult, ForwardError> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(endpoint.as_str());

        if let Some(outbound) = builder.headers_mut() {
            *outbound = outbound_headers(headers);
        }

        let request = builder.body(Body::from(body))?;
        let response = self.client.request(request).await?;

        let (parts, incoming) = response.into_parts();
        let body = incoming.collect().await?.to_bytes();

        Ok(OutboundResult::new(parts.status, parts.headers, body))
    }
}

impl Default for Forwarder {
    fn default() -> Self {
        Self::new(Duration::from_secs(crate::config::schema::UPSTREAM_TIMEOUT_SECS))
    }
}
