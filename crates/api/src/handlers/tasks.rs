//! Internal handlers polled by workers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use calc_core::{ReportOutcome, Task, TaskResult};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Response for GET /internal/task.
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub task: Task,
}

/// Response for POST /internal/task/result.
#[derive(Debug, Serialize)]
pub struct ResultAck {
    pub status: &'static str,
}

/// GET /internal/task
///
/// Hand the highest-priority pending operation to the calling worker.
/// Responds 404 when the queue is empty; workers treat that as "poll later".
pub async fn next_task(State(state): State<AppState>) -> AppResult<Json<TaskResponse>> {
    let task = state
        .orchestrator
        .dequeue_task()
        .await
        .ok_or(AppError::NoTaskAvailable)?;

    tracing::info!(
        task_id = %task.id,
        operation = %task.operation,
        operation_time_ms = task.operation_time,
        "Task sent to worker",
    );

    Ok(Json(TaskResponse { task }))
}

/// POST /internal/task/result
///
/// Record a worker's result. A report carrying an error marks the owning
/// expression as failed and answers 422 with the worker's message.
pub async fn submit_result(
    State(state): State<AppState>,
    payload: Result<Json<TaskResult>, JsonRejection>,
) -> AppResult<Json<ResultAck>> {
    let Json(report) = payload?;
    let task_id = report.id.clone();

    match state.orchestrator.report_result(report).await? {
        ReportOutcome::Recorded => {}
        ReportOutcome::ParentScheduled { task_id: parent } => {
            tracing::debug!(task_id = %task_id, parent = %parent, "Parent task scheduled");
        }
        ReportOutcome::Completed {
            expression_id,
            result,
        } => {
            tracing::debug!(expression_id = %expression_id, result, "Result completed its expression");
        }
    }

    Ok(Json(ResultAck {
        status: "result recorded",
    }))
}
