//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4) when the caller sent none
//! - Prepare inbound headers for forwarding to a worker
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing, and sent upstream
//! - `host`, `content-length` and the connection-level headers describe the
//!   inbound hop only; hyper recomputes what the worker needs

use axum::http::{HeaderMap, HeaderName, Request, header};
use tower_http::request_id::{MakeRequestId, RequestId};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Headers never copied onto the outbound request.
const STRIPPED_REQUEST_HEADERS: [HeaderName; 4] = [
    header::HOST,
    header::CONTENT_LENGTH,
    header::TRANSFER_ENCODING,
    header::CONNECTION,
];

/// Copy of `inbound` suitable for the worker request.
pub fn outbound_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = inbound.clone();
    for name in STRIPPED_REQUEST_HEADERS.iter() {
        headers.remove(name);
    }
    headers
}

/// Generates `x-request-id` values.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string();
        id.parse().ok().map(RequestId::new)
    }
}

/// Request ID of `request`, or `-` before the ID layer ran.
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_outbound_headers_strip_host_and_length() {
        let mut inbound = HeaderMap::new();
        inbound.insert(header::HOST, HeaderValue::from_static("balancer:9000"));
        inbound.insert(header::CONTENT_LENGTH, HeaderValue::from_static("12"));
        inbound.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        inbound.append("x-tag", HeaderValue::from_static("a"));
        inbound.append("x-tag", HeaderValue::from_static("b"));

        let outbound = outbound_headers(&inbound);

        assert!(!outbound.contains_key(header::HOST));
        assert!(!outbound.contains_key(header::CONTENT_LENGTH));
        assert_eq!(outbound[header::CONTENT_TYPE], "application/json");
        assert_eq!(outbound.get_all("x-tag").iter().count(), 2);
    }

    #[test]
    fn test_uuid_request_ids_are_unique() {
        let request = Request::new(());
        let a = UuidRequestId.make_request_id(&request).unwrap();
        let b = UuidRequestId.make_request_id(&request).unwrap();
        assert_ne!(a.header_value(), b.header_value());
        assert_eq!(a.header_value().len(), 36);
    }
}
