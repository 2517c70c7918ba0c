use std::sync::Arc;

use calc_core::Orchestrator;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Scheduling engine owning every expression graph and the task queue.
    pub orchestrator: Arc<Orchestrator>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Build state with a fresh orchestrator using the configured operation times.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            orchestrator: Arc::new(Orchestrator::new(config.operation_times)),
            config: Arc::new(config),
        }
    }
}
