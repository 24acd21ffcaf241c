//! `/prompt` entry handler.
//!
//! # Request lifecycle
//! ```text
//! Received
//!     → RequestGuard (413 Rejected on oversized body)
//!     → Dispatcher::checkout (may park under the pool strategy)
//!     → Forwarder::forward
//!     → Lease dropped (pool: endpoint back in the queue)
//!     → Responded, or Errored (500) on upstream failure
//! ```
//!
//! Dispatch, forward and release run in a detached task: a client that hangs
//! up does not cancel the upstream call, and the lease is released when the
//! call finishes either way.

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, Request},
    response::{IntoResponse, Response},
};

use crate::error::ProxyError;
use crate::http::request::request_id;
use crate::http::response::OutboundResult;
use crate::http::server::AppState;

pub async fn prompt_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request_id(&request).to_string();
    let (parts, body) = request.into_parts();

    let result = async {
        let body = state.guard.read_body(&parts.headers, body).await?;
        dispatch(&state, parts.headers, body).await
    }
    .await;

    match result {
        Ok(outbound) => outbound.into_response(),
        Err(e) => {
            match &e {
                ProxyError::PayloadTooLarge { limit } => {
                    tracing::warn!(request_id = %request_id, limit, "Request body too large");
                }
                ProxyError::MalformedRequest(cause) => {
                    tracing::warn!(request_id = %request_id, error = %cause, "Failed to read request body");
                }
                other => {
                    tracing::error!(request_id = %request_id, error = %other, "Error processing request");
                }
            }
            e.into_response()
        }
    }
}

/// Select an endpoint, forward, and release. Runs to completion even if the caller goes away.
async fn dispatch(state: &AppState, headers: HeaderMap, body: Bytes) -> Result<OutboundResult, ProxyError> {
    let dispatcher = state.dispatcher.clone();
    let forwarder = state.forwarder.clone();

    let task = tokio::spawn(async move {
        let lease = dispatcher.checkout().await?;
        tracing::debug!(endpoint = %lease.endpoint(), strategy = %dispatcher.strategy(), "Forwarding request");

        let result = forwarder.forward(&lease, &headers, body).await;
        drop(lease);

        result.map_err(ProxyError::from)
    });

    task.await
        .map_err(|e| ProxyError::Internal(format!("forwarding task failed: {}", e)))?
}
