//! Standalone key-value store of expression snapshots.
//!
//! Not consulted by the [`Orchestrator`](crate::orchestrator::Orchestrator),
//! which keeps its own state; useful for persistence experiments and tests
//! that want expressions without a scheduling engine attached.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::task::Expression;
use crate::types::ExpressionId;

/// Thread-safe in-memory map from expression id to its latest snapshot.
#[derive(Debug, Default)]
pub struct ExpressionStore {
    expressions: RwLock<HashMap<ExpressionId, Expression>>,
}

impl ExpressionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the snapshot stored under `expression.id`.
    pub async fn save(&self, expression: Expression) {
        self.expressions
            .write()
            .await
            .insert(expression.id.clone(), expression);
    }

    pub async fn get(&self, id: &str) -> Option<Expression> {
        self.expressions.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.expressions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.expressions.read().await.is_empty()
    }
}
