//! Request-level error taxonomy.
//!
//! Every failure inside the `/prompt` pipeline ends up as a `ProxyError`,
//! which is converted to a response at the handler boundary. Response bodies
//! are short and fixed; causes only reach the server log.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::http::forward::ForwardError;
use crate::load_balancer::DispatchError;

#[derive(Debug, Error)]
pub enum ProxyError {
    /// Body exceeds the configured maximum. No upstream was contacted.
    #[error("request body exceeds limit of {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// Body could not be read from the client.
    #[error("failed to read request body: {0}")]
    MalformedRequest(#[source] axum::BoxError),

    /// Any transport-level failure talking to the selected worker.
    #[error("upstream request failed: {0}")]
    UpstreamFailure(#[from] ForwardError),

    /// The dispatcher could not provide an endpoint.
    #[error("dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),

    /// Forwarding task died before producing a result.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::UpstreamFailure(_)
            | ProxyError::Dispatch(_)
            | ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            ProxyError::PayloadTooLarge { .. } => "Request too large",
            ProxyError::MalformedRequest(_) => "Bad Request",
            _ => "Internal Server Error",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), self.public_message()).into_response()
    }
}
