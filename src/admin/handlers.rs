use axum::{
    extract::State,
    Json,
};
use serde::Serialize;
use crate::http::server::AppState;
use crate::load_balancer::Dispatcher;

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub version: &'static str,
    pub strategy: &'static str,
    pub endpoints: Vec<String>,
    pub capacity: usize,
    /// Free endpoints; only the pool strategy tracks this.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_flight: Option<usize>,
}

pub async fn get_status(
    State(state): State<AppState>,
) -> Json<StatusReport> {
    let dispatcher = state.dispatcher.as_ref();
    let endpoints: Vec<String> = dispatcher
        .endpoints()
        .iter()
        .map(|e| e.to_string())
        .collect();

    let (available, in_flight) = match dispatcher {
        Dispatcher::Pool(pool) => (Some(pool.available()), Some(pool.in_flight())),
        _ => (None, None),
    };

    Json(StatusReport {
        version: env!("CARGO_PKG_VERSION"),
        strategy: dispatcher.strategy().as_str(),
        capacity: endpoints.len(),
        endpoints,
        available,
        in_flight,
    })
}
