//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the dispatcher, forwarder and request guard from configuration
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request ID, access log)
//! - Bind server to listener and shut down gracefully

use axum::{
    body::Body,
    http::Request,
    middleware,
    routing::post,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::admin::admin_routes;
use crate::config::BalancerConfig;
use crate::http::forward::Forwarder;
use crate::http::handler::prompt_handler;
use crate::http::middleware::access_log_middleware;
use crate::http::request::{UuidRequestId, request_id};
use crate::load_balancer::{DispatchError, Dispatcher, EndpointSet};
use crate::observability::{AccessLog, TracingAccessLog};
use crate::security::RequestGuard;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub forwarder: Arc<Forwarder>,
    pub guard: RequestGuard,
    pub access_log: Arc<dyn AccessLog>,
}

/// HTTP server for the balancer.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server that writes access entries through tracing.
    pub fn new(config: BalancerConfig) -> Result<Self, DispatchError> {
        Self::with_access_log(config, Arc::new(TracingAccessLog))
    }

    /// Create a new HTTP server with an explicit access log sink.
    pub fn with_access_log(
        config: BalancerConfig,
        access_log: Arc<dyn AccessLog>,
    ) -> Result<Self, DispatchError> {
        let endpoints = EndpointSet::parse(&config.upstream.endpoints)?;
        let dispatcher = Arc::new(Dispatcher::new(config.upstream.strategy, endpoints));

        tracing::info!(
            strategy = %dispatcher.strategy(),
            endpoints = dispatcher.endpoints().len(),
            "Dispatcher ready"
        );

        let state = AppState {
            dispatcher,
            forwarder: Arc::new(Forwarder::new(Duration::from_secs(config.timeouts.upstream_secs))),
            guard: RequestGuard::new(config.limits.max_request_size),
            access_log,
        };

        let router = Self::build_router(state.clone());
        Ok(Self { router, state })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/prompt", post(prompt_handler))
            .merge(admin_routes())
            .layer(middleware::from_fn_with_state(state.clone(), access_log_middleware))
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %req.method(),
                    path = %req.uri().path(),
                    request_id = %request_id(req),
                )
            }))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
            .with_state(state)
    }

    /// Router with all layers applied, for driving the server in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            strategy = %self.state.dispatcher.strategy(),
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
