//! Wire-level models shared by the orchestrator, the HTTP surface and workers.

use serde::{Deserialize, Serialize};

use crate::operator::Operator;
use crate::types::{ExpressionId, NodeId};

/// Lifecycle of a submitted expression.
///
/// `Pending` moves to exactly one of the terminal states, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpressionStatus {
    Pending,
    Completed,
    Error,
}

impl ExpressionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Snapshot of a submitted expression as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub id: ExpressionId,
    pub status: ExpressionStatus,
    /// Present only once the root operation has been computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<f64>,
}

impl Expression {
    pub fn pending(id: ExpressionId) -> Self {
        Self {
            id,
            status: ExpressionStatus::Pending,
            result: None,
        }
    }
}

/// A single binary operation handed to a worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Equal to the id of the graph node this task resolves.
    pub id: NodeId,
    pub arg1: f64,
    pub arg2: f64,
    pub operation: Operator,
    /// Simulated execution time in milliseconds.
    pub operation_time: u64,
    pub priority: i32,
}

/// A worker's report for a previously dequeued task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub id: NodeId,
    #[serde(default)]
    pub result: f64,
    /// Non-empty when the worker failed to compute the operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskResult {
    pub fn success(id: impl Into<NodeId>, result: f64) -> Self {
        Self {
            id: id.into(),
            result,
            error: None,
        }
    }

    pub fn failure(id: impl Into<NodeId>, error: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            result: 0.0,
            error: Some(error.into()),
        }
    }

    /// The error message, treating an empty string the same as no error.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }
}
