use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use calc_api::config::ServerConfig;
use calc_api::router::build_app_router;
use calc_api::state::AppState;
use calc_core::shutdown::shutdown_signal;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "calc_api=debug,calc_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        add_ms = config.operation_times.addition.as_millis() as u64,
        sub_ms = config.operation_times.subtraction.as_millis() as u64,
        mul_ms = config.operation_times.multiplication.as_millis() as u64,
        div_ms = config.operation_times.division.as_millis() as u64,
        "Loaded server configuration",
    );

    // --- App state & router ---
    let state = AppState::new(config.clone());
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting orchestrator");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
        })
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}
