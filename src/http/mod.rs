//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, routes)
//!     → request.rs (request ID, outbound header preparation)
//!     → handler.rs (size check → dispatch → forward → release)
//!     → forward.rs (POST to the selected worker)
//!     → response.rs (relay status, headers, body, content type)
//!     → middleware/access_log.rs (one entry per request)
//!     → Send to client
//! ```

pub mod forward;
pub mod handler;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use forward::{ForwardError, Forwarder};
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use response::OutboundResult;
pub use server::{AppState, HttpServer};
