//! Request size limits.
//!
//! # Responsibilities
//! - Enforce maximum request body size
//! - Reject early on a declared `Content-Length` above the limit
//! - Read bodies through a bounded collector so oversized payloads are never buffered whole
//!
//! # Design Decisions
//! - Limits checked before dispatch (no endpoint consulted on rejection)
//! - A body of exactly the limit is accepted
//! - Return 413 Payload Too Large; other read failures are 400

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, header};
use http_body_util::{BodyExt, LengthLimitError, Limited};

use crate::error::ProxyError;

/// Rejects request bodies larger than `max_request_size`.
#[derive(Debug, Clone, Copy)]
pub struct RequestGuard {
    max_request_size: usize,
}

impl RequestGuard {
    pub fn new(max_request_size: usize) -> Self {
        Self { max_request_size }
    }

    pub fn limit(&self) -> usize {
        self.max_request_size
    }

    /// Accept `body` if it is at most the limit.
    pub fn check(&self, body: &[u8]) -> Result<(), ProxyError> {
        if body.len() > self.max_request_size {
            return Err(self.too_large());
        }
        Ok(())
    }

    /// Reject on a declared `Content-Length` above the limit.
    ///
    /// A missing or unparsable header is left to the bounded read.
    pub fn check_declared(&self, headers: &HeaderMap) -> Result<(), ProxyError> {
        let declared = headers
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        match declared {
            Some(len) if len > self.max_request_size as u64 => Err(self.too_large()),
            _ => Ok(()),
        }
    }

    /// Read the whole body, stopping as soon as it exceeds the limit.
    pub async fn read_body(&self, headers: &HeaderMap, body: Body) -> Result<Bytes, ProxyError> {
        self.check_declared(headers)?;

        let bytes = Limited::new(body, self.max_request_size)
            .collect()
            .await
            .map_err(|e| {
                if e.is::<LengthLimitError>() {
                    self.too_large()
                } else {
                    ProxyError::MalformedRequest(e)
                }
            })?
            .to_bytes();

        self.check(&bytes)?;
        Ok(bytes)
    }

    fn too_large(&self) -> ProxyError {
        ProxyError::PayloadTooLarge {
            limit: self.max_request_size,
        }
    }
}
