//! Stand-in worker for local testing.
//!
//! Accepts `POST /prompt_sync`, sleeps for `--delay-ms`, then echoes the body
//! back as JSON together with the worker's name.

use std::net::SocketAddr;
use std::time::Duration;
use axum::{
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::post,
    Router,
};
use clap::Parser;

#[derive(Parser, Clone)]
#[command(name = "mock-worker")]
#[command(about = "Mock job worker exposing POST /prompt_sync", long_about = None)]
struct Cli {
    #[arg(short, long, default_value_t = 9200)]
    port: u16,

    /// Name reported back in every response.
    #[arg(short, long, default_value = "worker")]
    name: String,

    /// Simulated processing time per job.
    #[arg(short, long, default_value_t = 0)]
    delay_ms: u64,
}

async fn prompt_sync(State(cli): State<Cli>, body: Bytes) -> impl IntoResponse {
    tokio::time::sleep(Duration::from_millis(cli.delay_ms)).await;

    let payload = serde_json::json!({
        "worker": cli.name,
        "received_bytes": body.len(),
        "echo": String::from_utf8_lossy(&body),
    });

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        payload.to_string(),
    )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let addr = SocketAddr::from(([127, 0, 0, 1], cli.port));
    let app = Router::new()
        .route("/prompt_sync", post(prompt_sync))
        .with_state(cli.clone());

    tracing::info!(address = %addr, name = %cli.name, "Mock worker listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
