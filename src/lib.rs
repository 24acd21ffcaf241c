//! Job-submission balancer library.
//!
//! Accepts `POST /prompt`, picks one worker endpoint with the configured
//! dispatch strategy, forwards the body and relays the worker's response.

pub mod config;
pub mod error;
pub mod http;
pub mod load_balancer;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod admin;

pub use config::BalancerConfig;
pub use error::ProxyError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use load_balancer::{Dispatcher, Endpoint, EndpointSet, Strategy};
