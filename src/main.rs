//! Job-submission balancer.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌───────────────────────────────────────────────┐
//!                         │                PROMPT BALANCER                │
//!     POST /prompt        │  ┌───────────┐   ┌────────────┐   ┌────────┐  │
//!     ────────────────────┼─▶│  request  │──▶│ dispatcher │──▶│forward │──┼──▶ worker
//!                         │  │   guard   │   │ static/rr/ │   │ (POST, │  │    /prompt_sync
//!                         │  │  (1 MiB)  │   │    pool    │   │ 600 s) │  │
//!                         │  └───────────┘   └─────▲──────┘   └───┬────┘  │
//!     response            │                        │ release      │       │
//!     ◀───────────────────┼────────────────────────┴──────────────┘       │
//!                         │                                               │
//!                         │  access log (JSON lines) · metrics · tracing  │
//!                         └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use clap::Parser;

use prompt_balancer::config::{BalancerConfig, ConfigOverrides, read_config};
use prompt_balancer::lifecycle;
use prompt_balancer::load_balancer::Strategy;
use prompt_balancer::observability::logging::init_logging;

#[derive(Parser, Debug)]
#[command(name = "prompt-balancer")]
#[command(about = "Forwards job submissions to a pool of identical workers", long_about = None)]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(short, long, env = "BALANCER_CONFIG")]
    config: Option<PathBuf>,

    /// Interface to listen on.
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on.
    #[arg(short, long)]
    port: Option<u16>,

    /// Dispatch strategy: static, round-robin or pool.
    #[arg(short, long)]
    strategy: Option<Strategy>,

    /// Comma-separated worker endpoints.
    #[arg(long, env = "WORKER_ENDPOINTS")]
    endpoints: Option<String>,

    /// Access log file.
    #[arg(long)]
    access_log: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match read_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("failed to load {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => BalancerConfig::default(),
    };

    ConfigOverrides {
        host: cli.host,
        port: cli.port,
        strategy: cli.strategy,
        endpoints: cli.endpoints,
        access_log_path: cli.access_log.map(|p| p.to_string_lossy().into_owned()),
    }
    .apply(&mut config);

    let _logging = match init_logging(&config.observability) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("failed to initialize logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("prompt-balancer v{} starting", env!("CARGO_PKG_VERSION"));

    match lifecycle::run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            ExitCode::FAILURE
        }
    }
}
