//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::post,
    Router,
};
use tokio::net::TcpListener;

use prompt_balancer::config::BalancerConfig;
use prompt_balancer::http::HttpServer;
use prompt_balancer::lifecycle::Shutdown;
use prompt_balancer::observability::{AccessEntry, AccessLog};

/// Behaviour of one mock worker.
#[derive(Clone)]
pub struct WorkerSpec {
    pub name: &'static str,
    pub status: StatusCode,
    pub content_type: &'static str,
    pub delay: Duration,
}

impl WorkerSpec {
    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            status: StatusCode::OK,
            content_type: "application/json",
            delay: Duration::ZERO,
        }
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn content_type(mut self, content_type: &'static str) -> Self {
        self.content_type = content_type;
        self
    }
}

/// Requests observed by a mock worker.
#[derive(Clone, Default)]
pub struct WorkerLog {
    inner: Arc<Mutex<Vec<(HeaderMap, Bytes)>>>,
}

impl WorkerLog {
    pub fn hits(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<(HeaderMap, Bytes)> {
        self.inner.lock().unwrap().clone()
    }
}

/// A running mock worker.
pub struct MockWorker {
    pub addr: SocketAddr,
    pub log: WorkerLog,
}

impl MockWorker {
    /// URL of the worker's job route.
    pub fn endpoint(&self) -> String {
        format!("http://{}/prompt_sync", self.addr)
    }
}

async fn prompt_sync(
    State((spec, log)): State<(WorkerSpec, WorkerLog)>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    log.inner.lock().unwrap().push((headers, body));
    tokio::time::sleep(spec.delay).await;
    (
        spec.status,
        [(header::CONTENT_TYPE, spec.content_type)],
        spec.name,
    )
}

/// Start a mock worker on an ephemeral port. The body of every response is the worker's name.
pub async fn start_worker(spec: WorkerSpec) -> MockWorker {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log = WorkerLog::default();

    let app = Router::new()
        .route("/prompt_sync", post(prompt_sync))
        .with_state((spec, log.clone()));

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockWorker { addr, log }
}

/// An endpoint nothing listens on.
pub async fn dead_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/prompt_sync", addr)
}

/// Access log sink keeping entries in memory.
#[derive(Default)]
pub struct RecordingAccessLog {
    entries: Mutex<Vec<AccessEntry>>,
}

impl RecordingAccessLog {
    pub fn entries(&self) -> Vec<AccessEntry> {
        self.entries.lock().unwrap().clone()
    }
}

impl AccessLog for RecordingAccessLog {
    fn record(&self, entry: &AccessEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

/// A balancer serving on an ephemeral port.
pub struct RunningBalancer {
    pub addr: SocketAddr,
    pub access_log: Arc<RecordingAccessLog>,
    shutdown: Shutdown,
}

impl RunningBalancer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn stop(&self) {
        self.shutdown.trigger();
    }
}

/// Start the balancer with `config`, ignoring the configured host and port.
pub async fn start_balancer(config: BalancerConfig) -> RunningBalancer {
    let access_log = Arc::new(RecordingAccessLog::default());
    let server = HttpServer::with_access_log(config, access_log.clone()).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    RunningBalancer {
        addr,
        access_log,
        shutdown,
    }
}

/// Config pointing at `endpoints` with the given strategy.
pub fn config_for(strategy: prompt_balancer::Strategy, endpoints: Vec<String>) -> BalancerConfig {
    let mut config = BalancerConfig::default();
    config.upstream.strategy = strategy;
    config.upstream.endpoints = endpoints;
    config
}
