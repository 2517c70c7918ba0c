//! `calc-worker` -- computing agent pool for the distributed calculator.
//!
//! Polls the orchestrator for single operations, simulates their execution
//! time, and posts the results back.
//!
//! # Environment variables
//!
//! | Variable           | Required | Default                 | Description                       |
//! |--------------------|----------|-------------------------|-----------------------------------|
//! | `ORCHESTRATOR_URL` | no       | `http://localhost:8080` | Base URL of the orchestrator      |
//! | `COMPUTING_POWER`  | no       | `2`                     | Number of concurrent agents       |
//! | `POLL_INTERVAL_MS` | no       | `2000`                  | Back-off when no task is available |

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use calc_worker::client::OrchestratorClient;
use calc_worker::config::WorkerConfig;
use calc_core::shutdown::shutdown_signal;
use calc_worker::runner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "calc_worker=debug,calc_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = WorkerConfig::from_env();
    tracing::info!(
        url = %config.orchestrator_url,
        computing_power = config.computing_power,
        "Starting calc-worker",
    );

    let client = OrchestratorClient::new(config.orchestrator_url.clone());
    let cancel = CancellationToken::new();

    let pool = tokio::spawn(runner::run_pool(config, client, cancel.clone()));

    shutdown_signal().await;
    cancel.cancel();

    pool.await.context("worker pool terminated abnormally")?;
    tracing::info!("Worker shut down");
    Ok(())
}
