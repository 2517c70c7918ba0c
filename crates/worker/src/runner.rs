//! Agent pool: N concurrent poll/compute/report loops.

use std::time::Duration;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use calc_core::{Task, TaskResult};

use crate::client::OrchestratorClient;
use crate::compute::compute;
use crate::config::WorkerConfig;

/// Run `config.computing_power` agents until `cancel` is triggered.
///
/// Returns once every agent has stopped. An agent that is mid-task when
/// cancellation arrives abandons it; the orchestrator does not reissue it.
pub async fn run_pool(config: WorkerConfig, client: OrchestratorClient, cancel: CancellationToken) {
    let agents = config.computing_power.max(1);
    tracing::info!(
        agents,
        url = %client.base_url(),
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        "Worker pool started",
    );

    let mut set = JoinSet::new();
    for agent in 0..agents {
        let client = client.clone();
        let cancel = cancel.clone();
        let poll_interval = config.poll_interval;
        set.spawn(async move { run_agent(agent, client, poll_interval, cancel).await });
    }

    while let Some(joined) = set.join_next().await {
        if let Err(e) = joined {
            tracing::error!(error = %e, "Worker agent panicked");
        }
    }

    tracing::info!("Worker pool stopped");
}

/// A single agent's loop.
async fn run_agent(
    agent: usize,
    client: OrchestratorClient,
    poll_interval: Duration,
    cancel: CancellationToken,
) {
    tracing::debug!(agent, "Agent started");

    loop {
        let busy = tokio::select! {
            _ = cancel.cancelled() => break,
            busy = poll_once(agent, &client) => busy,
        };

        if !busy {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(poll_interval) => {}
            }
        }
    }

    tracing::debug!(agent, "Agent stopped");
}

/// One fetch/compute/report cycle. Returns `false` when there was nothing
/// to do, so the caller backs off before polling again.
async fn poll_once(agent: usize, client: &OrchestratorClient) -> bool {
    let task = match client.fetch_task().await {
        Ok(Some(task)) => task,
        Ok(None) => return false,
        Err(e) => {
            tracing::warn!(agent, error = %e, "Failed to fetch task");
            return false;
        }
    };

    tracing::debug!(
        agent,
        task_id = %task.id,
        operation = %task.operation,
        operation_time_ms = task.operation_time,
        "Task claimed",
    );

    let report = execute(&task).await;
    let failed = report.error.is_some();

    match client.send_result(&report).await {
        Ok(()) => {
            tracing::info!(agent, task_id = %report.id, result = report.result, "Result reported");
        }
        Err(e) if failed && e.status() == Some(422) => {
            tracing::info!(agent, task_id = %report.id, "Failure reported");
        }
        Err(e) => {
            tracing::error!(agent, task_id = %report.id, error = %e, "Failed to report result");
        }
    }

    true
}

/// Wait the simulated duration, then evaluate.
async fn execute(task: &Task) -> TaskResult {
    tokio::time::sleep(Duration::from_millis(task.operation_time)).await;

    match compute(task) {
        Ok(value) => TaskResult::success(task.id.clone(), value),
        Err(e) => {
            tracing::warn!(task_id = %task.id, error = %e, "Computation failed");
            TaskResult::failure(task.id.clone(), e.to_string())
        }
    }
}
