//! Access logging middleware.
//! Records one entry per request once the response status is known.

use std::net::SocketAddr;
use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::http::server::AppState;
use crate::observability::{AccessEntry, metrics};

pub async fn access_log_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    // Absent when the router is driven without a socket (e.g. in-process tests).
    let client_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let version = req.version();

    let response = next.run(req).await;

    let entry = AccessEntry {
        client_ip,
        method,
        path,
        version,
        status: response.status(),
    };
    state.access_log.record(&entry);
    metrics::record_request(entry.status.as_u16());

    response
}
