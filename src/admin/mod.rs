//! Operator endpoints.

pub mod handlers;

use axum::{routing::get, Router};
use crate::http::server::AppState;
use self::handlers::get_status;

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/status", get(get_status))
}
