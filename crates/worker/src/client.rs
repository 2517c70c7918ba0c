//! HTTP client for the orchestrator's internal task endpoints.

use serde::Deserialize;

use calc_core::{Task, TaskResult};

/// HTTP client for one orchestrator instance.
#[derive(Debug, Clone)]
pub struct OrchestratorClient {
    client: reqwest::Client,
    base_url: String,
}

/// Body of a successful `GET /internal/task`.
#[derive(Debug, Deserialize)]
struct TaskEnvelope {
    task: Task,
}

/// Errors from the orchestrator client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (connection refused, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The orchestrator answered with an unexpected status code.
    #[error("orchestrator returned {status}: {body}")]
    Api {
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl ClientError {
    /// The HTTP status, when the orchestrator answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

impl OrchestratorClient {
    /// * `base_url` - e.g. `http://localhost:8080`.
    ///
    /// Clones share one connection pool, so every agent gets a clone.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Claim the next task. `Ok(None)` when the queue is empty (404).
    pub async fn fetch_task(&self) -> Result<Option<Task>, ClientError> {
        let response = self
            .client
            .get(format!("{}/internal/task", self.base_url))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = Self::ensure_success(response).await?;
        let envelope: TaskEnvelope = response.json().await?;
        Ok(Some(envelope.task))
    }

    /// Report the outcome of a task.
    ///
    /// The orchestrator answers a failure report with 422, which surfaces
    /// here as [`ClientError::Api`].
    pub async fn send_result(&self, result: &TaskResult) -> Result<(), ClientError> {
        let response = self
            .client
            .post(format!("{}/internal/task/result", self.base_url))
            .json(result)
            .send()
            .await?;

        Self::ensure_success(response).await?;
        Ok(())
    }

    // ---- private helpers ----

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}
