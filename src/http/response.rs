//! Response handling and transformation.
//!
//! # Responsibilities
//! - Hold a worker's buffered response
//! - Transform it for the client (status, headers, body, content type)
//!
//! # Design Decisions
//! - Hop-by-hop headers stripped; framing is recomputed for the client hop
//! - Missing upstream content type falls back to `application/octet-stream`

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

/// Content type used when the worker sent none.
pub const DEFAULT_CONTENT_TYPE: HeaderValue = HeaderValue::from_static("application/octet-stream");

const HOP_BY_HOP_HEADERS: [HeaderName; 7] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::TRANSFER_ENCODING,
    header::TE,
    header::TRAILER,
    header::UPGRADE,
    header::CONTENT_LENGTH,
];

/// A worker's response, fully buffered.
#[derive(Debug, Clone)]
pub struct OutboundResult {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub content_type: HeaderValue,
}

impl OutboundResult {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .cloned()
            .unwrap_or(DEFAULT_CONTENT_TYPE);

        Self {
            status,
            headers,
            body,
            content_type,
        }
    }
}

/// Remove headers that only describe the worker → balancer hop.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP_HEADERS.iter() {
        headers.remove(name);
    }

    let proxy_headers: Vec<HeaderName> = headers
        .keys()
        .filter(|name| name.as_str().starts_with("proxy-"))
        .cloned()
        .collect();
    for name in proxy_headers {
        headers.remove(&name);
    }
}

impl IntoResponse for OutboundResult {
    fn into_response(self) -> Response {
        let mut headers = self.headers;
        strip_hop_by_hop(&mut headers);
        headers.insert(header::CONTENT_TYPE, self.content_type);

        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_from_upstream() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/png"));
        let result = OutboundResult::new(StatusCode::OK, headers, Bytes::new());
        assert_eq!(result.content_type, "image/png");
    }

    #[test]
    fn test_content_type_fallback() {
        let result = OutboundResult::new(StatusCode::OK, HeaderMap::new(), Bytes::new());
        assert_eq!(result.content_type, DEFAULT_CONTENT_TYPE);

        let response = result.into_response();
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/octet-stream");
    }

    #[test]
    fn test_into_response_keeps_end_to_end_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("close"));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("2"));
        headers.insert("proxy-authenticate", HeaderValue::from_static("Basic"));
        headers.insert("x-worker-id", HeaderValue::from_static("w3"));

        let response =
            OutboundResult::new(StatusCode::CREATED, headers, Bytes::from_static(b"{}")).into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()["x-worker-id"], "w3");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert!(!response.headers().contains_key(header::TRANSFER_ENCODING));
        assert!(!response.headers().contains_key(header::CONNECTION));
        assert!(!response.headers().contains_key("proxy-authenticate"));
    }
}
