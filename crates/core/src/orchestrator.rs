//! Scheduling engine: owns every expression graph and the dispatch queue.
//!
//! # Locking
//!
//! Two independent locks guard the shared state:
//!
//! 1. `state` -- the expression/graph map and every node or expression
//!    field mutation. Responses are also read under this lock.
//! 2. `queue` -- push/pop on the [`DispatchQueue`].
//!
//! When both are needed the state lock is always taken first and the queue
//! lock is released before it. Nothing awaits I/O while either is held.
//!
//! A task popped by a worker leaves no trace here. If that worker never
//! reports back, the node stays uncomputed and its expression stays
//! `pending`; there is no requeue.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::error::CoreError;
use crate::graph::{self, Graph};
use crate::operator::OperationTimes;
use crate::queue::DispatchQueue;
use crate::task::{Expression, ExpressionStatus, Task, TaskResult};
use crate::types::{self, ExpressionId, NodeId};

/// An expression and the graph that computes it.
#[derive(Debug)]
struct Tracked {
    expression: Expression,
    graph: Graph,
}

#[derive(Debug, Default)]
struct GraphState {
    entries: HashMap<ExpressionId, Tracked>,
}

/// What applying a successful result did to the owning expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    /// The node was updated; its parent is still waiting on a sibling, or the
    /// expression already failed.
    Recorded,
    /// The parent became ready and its task was enqueued.
    ParentScheduled { task_id: NodeId },
    /// The root resolved; the expression is complete.
    Completed {
        expression_id: ExpressionId,
        result: f64,
    },
}

/// The orchestrator's scheduling core. Share it behind an `Arc`.
pub struct Orchestrator {
    state: Mutex<GraphState>,
    queue: Mutex<DispatchQueue>,
    times: OperationTimes,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(OperationTimes::default())
    }
}

impl Orchestrator {
    pub fn new(times: OperationTimes) -> Self {
        Self {
            state: Mutex::new(GraphState::default()),
            queue: Mutex::new(DispatchQueue::new()),
            times,
        }
    }

    /// Compile `text`, register the expression and enqueue every operation
    /// whose operands are both literals.
    ///
    /// On a syntax error nothing is registered.
    pub async fn submit(&self, text: &str) -> Result<ExpressionId, CoreError> {
        self.submit_as(uuid::Uuid::now_v7().to_string(), text).await
    }

    /// Register `text` under a caller-chosen id. An id that is already
    /// tracked is a [`CoreError::Conflict`] and leaves the old entry intact.
    async fn submit_as(
        &self,
        expression_id: ExpressionId,
        text: &str,
    ) -> Result<ExpressionId, CoreError> {
        let graph = graph::compile(&expression_id, text)?;

        let mut state = self.state.lock().await;
        let tracked = match state.entries.entry(expression_id.clone()) {
            Entry::Occupied(_) => {
                return Err(CoreError::Conflict(format!(
                    "expression id {expression_id} is already registered"
                )));
            }
            Entry::Vacant(slot) => slot.insert(Tracked {
                expression: Expression::pending(expression_id.clone()),
                graph,
            }),
        };

        tracing::info!(
            expression_id = %expression_id,
            expression = %text,
            nodes = tracked.graph.len(),
            "Expression accepted",
        );

        // A bare literal has nothing to compute.
        if tracked.graph.root().computed {
            let value = tracked.graph.root().value;
            tracked.expression.status = ExpressionStatus::Completed;
            tracked.expression.result = Some(value);
            tracing::info!(expression_id = %expression_id, result = value, "Expression completed");
            return Ok(expression_id);
        }

        for index in tracked.graph.schedulable() {
            self.schedule(&mut tracked.graph, index).await;
        }

        Ok(expression_id)
    }

    pub async fn get_expression(&self, id: &str) -> Result<Expression, CoreError> {
        let state = self.state.lock().await;
        state
            .entries
            .get(id)
            .map(|tracked| tracked.expression.clone())
            .ok_or_else(|| CoreError::not_found("Expression", id))
    }

    /// Every known expression, in no particular order.
    pub async fn list_expressions(&self) -> Vec<Expression> {
        let state = self.state.lock().await;
        state
            .entries
            .values()
            .map(|tracked| tracked.expression.clone())
            .collect()
    }

    /// Pop the highest-priority pending task. `None` when there is no work.
    pub async fn dequeue_task(&self) -> Option<Task> {
        let task = self.queue.lock().await.pop();
        if let Some(task) = &task {
            tracing::debug!(
                task_id = %task.id,
                operation = %task.operation,
                priority = task.priority,
                "Task dispatched",
            );
        }
        task
    }

    pub async fn queued_tasks(&self) -> usize {
        self.queue.lock().await.len()
    }

    /// Apply a worker's report to the graph.
    ///
    /// A non-empty error marks the owning expression `error` and is returned
    /// as [`CoreError::Computation`]. A success records the value and either
    /// enqueues the now-ready parent or, at the root, completes the
    /// expression.
    pub async fn report_result(&self, report: TaskResult) -> Result<ReportOutcome, CoreError> {
        let not_found = || CoreError::not_found("Task", report.id.as_str());

        let mut state = self.state.lock().await;
        let (expression_id, _) = types::split_node_id(&report.id).ok_or_else(not_found)?;
        let tracked = state.entries.get_mut(expression_id).ok_or_else(not_found)?;
        let index = tracked.graph.position(&report.id).ok_or_else(not_found)?;

        let node = &tracked.graph.nodes()[index];
        // Only nodes that were handed out as tasks accept results.
        if node.is_literal() || !node.scheduled {
            return Err(not_found());
        }
        if node.computed {
            return Err(CoreError::Conflict(format!(
                "task {} already has a result",
                report.id
            )));
        }
        let parent = node.parent;

        if let Some(message) = report.error_message() {
            if !tracked.expression.status.is_terminal() {
                tracked.expression.status = ExpressionStatus::Error;
            }
            tracing::warn!(
                task_id = %report.id,
                expression_id = %tracked.expression.id,
                error = %message,
                "Task failed, expression marked as error",
            );
            return Err(CoreError::Computation(message.to_string()));
        }

        tracked.graph.record(index, report.result);
        tracing::debug!(task_id = %report.id, result = report.result, "Node updated");

        match parent {
            Some(parent) => {
                if tracked.expression.status.is_terminal() {
                    return Ok(ReportOutcome::Recorded);
                }
                let parent_node = &tracked.graph.nodes()[parent];
                if parent_node.scheduled
                    || parent_node.computed
                    || !tracked.graph.is_ready(parent)
                {
                    return Ok(ReportOutcome::Recorded);
                }
                let task_id = parent_node.id.clone();
                self.schedule(&mut tracked.graph, parent).await;
                Ok(ReportOutcome::ParentScheduled { task_id })
            }
            None => {
                let expression = &mut tracked.expression;
                if expression.status.is_terminal() {
                    return Ok(ReportOutcome::Recorded);
                }
                expression.status = ExpressionStatus::Completed;
                expression.result = Some(report.result);
                tracing::info!(
                    expression_id = %expression.id,
                    result = report.result,
                    "Expression completed",
                );
                Ok(ReportOutcome::Completed {
                    expression_id: expression.id.clone(),
                    result: report.result,
                })
            }
        }
    }

    /// Build the task for a ready node, flag it scheduled and push it.
    ///
    /// Callers hold the state lock; the queue lock is taken and released
    /// inside.
    async fn schedule(&self, graph: &mut Graph, index: usize) {
        let Some((op, arg1, arg2)) = graph.operands(index) else {
            return;
        };
        let task = Task {
            id: graph.nodes()[index].id.clone(),
            arg1,
            arg2,
            operation: op,
            operation_time: self.times.for_operator(op).as_millis() as u64,
            priority: op.priority(),
        };
        graph.mark_scheduled(index);

        tracing::debug!(
            task_id = %task.id,
            arg1,
            operation = %op,
            arg2,
            priority = task.priority,
            "Task scheduled",
        );

        let mut queue = self.queue.lock().await;
        debug_assert!(!queue.contains(&task.id), "task {} queued twice", task.id);
        queue.push(task);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;

    use super::*;
    use crate::operator::Operator;
    use crate::parser;

    fn orchestrator() -> Orchestrator {
        Orchestrator::new(OperationTimes::zero())
    }

    /// Repeatedly pop and resolve every task until the queue is empty.
    async fn drain(orch: &Orchestrator) -> Vec<Task> {
        let mut seen = Vec::new();
        while let Some(task) = orch.dequeue_task().await {
            let value = task.operation.apply(task.arg1, task.arg2).unwrap();
            orch.report_result(TaskResult::success(task.id.clone(), value))
                .await
                .unwrap();
            seen.push(task);
        }
        seen
    }

    #[tokio::test]
    async fn fresh_orchestrator_is_empty() {
        let orch = orchestrator();
        assert_eq!(orch.dequeue_task().await, None);
        assert!(orch.list_expressions().await.is_empty());
        assert_matches!(
            orch.get_expression("missing").await,
            Err(CoreError::NotFound { entity: "Expression", .. })
        );
    }

    #[tokio::test]
    async fn single_addition_completes() {
        let orch = orchestrator();
        let id = orch.submit("1+2").await.unwrap();

        let task = orch.dequeue_task().await.unwrap();
        assert_eq!(task.operation, Operator::Add);
        assert_eq!((task.arg1, task.arg2), (1.0, 2.0));
        assert_eq!(task.id, format!("{id}-1"));
        assert_eq!(orch.dequeue_task().await, None);

        let outcome = orch
            .report_result(TaskResult::success(task.id, 3.0))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ReportOutcome::Completed {
                expression_id: id.clone(),
                result: 3.0
            }
        );

        let expr = orch.get_expression(&id).await.unwrap();
        assert_eq!(expr.status, ExpressionStatus::Completed);
        assert_eq!(expr.result, Some(3.0));
    }

    #[tokio::test]
    async fn parent_is_scheduled_only_after_child_result() {
        let orch = orchestrator();
        orch.submit("1+2*3").await.unwrap();

        let mul = orch.dequeue_task().await.unwrap();
        assert_eq!(mul.operation, Operator::Multiply);
        assert_eq!((mul.arg1, mul.arg2), (2.0, 3.0));
        assert_eq!(mul.priority, 2);
        assert_eq!(orch.dequeue_task().await, None, "add must wait for the product");

        let outcome = orch
            .report_result(TaskResult::success(mul.id, 6.0))
            .await
            .unwrap();
        assert_matches!(outcome, ReportOutcome::ParentScheduled { .. });

        let add = orch.dequeue_task().await.unwrap();
        assert_eq!(add.operation, Operator::Add);
        assert_eq!((add.arg1, add.arg2), (1.0, 6.0));
        assert_eq!(add.priority, 1);
    }

    #[tokio::test]
    async fn task_carries_configured_duration() {
        let times = OperationTimes {
            division: std::time::Duration::from_millis(1234),
            ..OperationTimes::default()
        };
        let orch = Orchestrator::new(times);
        orch.submit("8/2").await.unwrap();
        let task = orch.dequeue_task().await.unwrap();
        assert_eq!(task.operation_time, 1234);
    }

    #[tokio::test]
    async fn division_error_marks_expression() {
        let orch = orchestrator();
        let id = orch.submit("1/0").await.unwrap();

        let task = orch.dequeue_task().await.unwrap();
        assert_eq!(task.operation, Operator::Divide);

        let err = orch
            .report_result(TaskResult::failure(task.id.clone(), "division by zero"))
            .await
            .unwrap_err();
        assert_matches!(err, CoreError::Computation(ref msg) if msg == "division by zero");

        let expr = orch.get_expression(&id).await.unwrap();
        assert_eq!(expr.status, ExpressionStatus::Error);
        assert_eq!(expr.result, None);
    }

    #[tokio::test]
    async fn failed_expression_schedules_no_further_work() {
        let orch = orchestrator();
        let id = orch.submit("(1/0) + (2*3) - 4").await.unwrap();

        // Both leaf-level operations are queued. Equal priorities pop FIFO
        // and the scan reaches `/` before `*`.
        let div = orch.dequeue_task().await.unwrap();
        let mul = orch.dequeue_task().await.unwrap();
        assert_eq!(div.operation, Operator::Divide);
        assert_eq!(mul.operation, Operator::Multiply);

        orch.report_result(TaskResult::failure(div.id, "division by zero"))
            .await
            .unwrap_err();
        let outcome = orch
            .report_result(TaskResult::success(mul.id, 6.0))
            .await
            .unwrap();
        assert_eq!(outcome, ReportOutcome::Recorded);
        assert_eq!(orch.dequeue_task().await, None);
        assert_eq!(
            orch.get_expression(&id).await.unwrap().status,
            ExpressionStatus::Error
        );
    }

    #[tokio::test]
    async fn unknown_task_is_not_found() {
        let orch = orchestrator();
        let id = orch.submit("1+2").await.unwrap();

        let out_of_range = format!("{id}-9");
        for bogus in ["nope", "nope-1", out_of_range.as_str()] {
            assert_matches!(
                orch.report_result(TaskResult::success(bogus, 1.0)).await,
                Err(CoreError::NotFound { entity: "Task", .. })
            );
        }
        // Literal nodes never produce tasks.
        assert_matches!(
            orch.report_result(TaskResult::success(format!("{id}-2"), 1.0)).await,
            Err(CoreError::NotFound { .. })
        );
    }

    #[tokio::test]
    async fn reused_expression_id_is_a_conflict() {
        let orch = orchestrator();
        orch.submit_as("fixed".into(), "1+2").await.unwrap();

        assert_matches!(
            orch.submit_as("fixed".into(), "3*4").await,
            Err(CoreError::Conflict(_))
        );
        let task = orch.dequeue_task().await.unwrap();
        assert_eq!((task.arg1, task.operation, task.arg2), (1.0, Operator::Add, 2.0));
        assert_eq!(orch.dequeue_task().await, None);
    }

    #[tokio::test]
    async fn result_for_unscheduled_operation_is_not_found() {
        let orch = orchestrator();
        let id = orch.submit("(1+2*3)*4").await.unwrap();
        // Preorder: -1 `*`, -2 `+`, -3 literal 1, -4 `*`. Only -4 is queued.
        let waiting = format!("{id}-2");

        assert_matches!(
            orch.report_result(TaskResult::success(waiting.clone(), 99.0)).await,
            Err(CoreError::NotFound { entity: "Task", .. })
        );
        assert_matches!(
            orch.report_result(TaskResult::failure(waiting, "boom")).await,
            Err(CoreError::NotFound { .. })
        );
        assert_eq!(
            orch.get_expression(&id).await.unwrap().status,
            ExpressionStatus::Pending
        );

        let tasks = drain(&orch).await;
        let ids: Vec<_> = tasks.iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids, [format!("{id}-4"), format!("{id}-2"), format!("{id}-1")]);
        assert_eq!(orch.get_expression(&id).await.unwrap().result, Some(28.0));
    }

    #[tokio::test]
    async fn duplicate_result_is_a_conflict() {
        let orch = orchestrator();
        orch.submit("(1+2)*(3+4)").await.unwrap();
        let task = orch.dequeue_task().await.unwrap();

        orch.report_result(TaskResult::success(task.id.clone(), 3.0))
            .await
            .unwrap();
        assert_matches!(
            orch.report_result(TaskResult::success(task.id, 3.0)).await,
            Err(CoreError::Conflict(_))
        );
    }

    #[tokio::test]
    async fn syntax_error_registers_nothing() {
        let orch = orchestrator();
        assert_matches!(orch.submit("1 + x").await, Err(CoreError::Syntax(_)));
        assert!(orch.list_expressions().await.is_empty());
        assert_eq!(orch.queued_tasks().await, 0);
    }

    #[tokio::test]
    async fn bare_literal_completes_immediately() {
        let orch = orchestrator();
        let id = orch.submit("(42)").await.unwrap();
        let expr = orch.get_expression(&id).await.unwrap();
        assert_eq!(expr.status, ExpressionStatus::Completed);
        assert_eq!(expr.result, Some(42.0));
        assert_eq!(orch.dequeue_task().await, None);
    }

    #[tokio::test]
    async fn draining_evaluates_like_the_parse() {
        let cases = [
            "1+2*3",
            "(1+2)*3",
            "10-4-3",
            "64/4/2",
            "2*(3+4)*(5-1)/7",
            "1.5+2.25*4-0.5/0.25",
            "((1+2)+(3+4))*((5+6)-(7+8))",
        ];
        let orch = orchestrator();

        for text in cases {
            let expected = parser::parse(text).unwrap().evaluate().unwrap();
            let id = orch.submit(text).await.unwrap();
            drain(&orch).await;

            let expr = orch.get_expression(&id).await.unwrap();
            assert_eq!(expr.status, ExpressionStatus::Completed, "{text}");
            assert_eq!(expr.result, Some(expected), "{text}");
        }
        assert_eq!(orch.list_expressions().await.len(), cases.len());
    }

    #[tokio::test]
    async fn multiplicative_work_is_dispatched_first() {
        let orch = orchestrator();
        orch.submit("(1+2)+(3*4)").await.unwrap();
        let first = orch.dequeue_task().await.unwrap();
        let second = orch.dequeue_task().await.unwrap();
        assert_eq!(first.operation, Operator::Multiply);
        assert_eq!(second.operation, Operator::Add);
    }

    #[tokio::test]
    async fn each_node_is_dispatched_once() {
        let orch = orchestrator();
        orch.submit("((1+2)*(3+4))-((5+6)/(7+8))").await.unwrap();

        let tasks = drain(&orch).await;
        let mut ids: Vec<_> = tasks.iter().map(|t| t.id.clone()).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
        assert_eq!(total, 7);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_sibling_reports_schedule_parent_once() {
        for _ in 0..50 {
            let orch = Arc::new(orchestrator());
            let id = orch.submit("(1+2)*(3+4)").await.unwrap();

            let left = orch.dequeue_task().await.unwrap();
            let right = orch.dequeue_task().await.unwrap();

            let a = {
                let orch = Arc::clone(&orch);
                tokio::spawn(async move {
                    orch.report_result(TaskResult::success(left.id, 3.0)).await
                })
            };
            let b = {
                let orch = Arc::clone(&orch);
                tokio::spawn(async move {
                    orch.report_result(TaskResult::success(right.id, 7.0)).await
                })
            };
            let outcomes = [a.await.unwrap().unwrap(), b.await.unwrap().unwrap()];
            let scheduled = outcomes
                .iter()
                .filter(|o| matches!(o, ReportOutcome::ParentScheduled { .. }))
                .count();
            assert_eq!(scheduled, 1);

            let root = orch.dequeue_task().await.unwrap();
            assert_eq!(root.id, format!("{id}-1"));
            assert_eq!((root.arg1, root.arg2), (3.0, 7.0));
            assert_eq!(orch.dequeue_task().await, None);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_workers_complete_many_expressions() {
        let orch = Arc::new(orchestrator());
        let mut ids = Vec::new();
        for i in 0..20 {
            ids.push(orch.submit(&format!("({i}+1)*(2+3)-4/2")).await.unwrap());
        }

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let orch = Arc::clone(&orch);
                tokio::spawn(async move {
                    let mut idle = 0;
                    while idle < 50 {
                        match orch.dequeue_task().await {
                            Some(task) => {
                                idle = 0;
                                let v = task.operation.apply(task.arg1, task.arg2).unwrap();
                                orch.report_result(TaskResult::success(task.id, v))
                                    .await
                                    .unwrap();
                            }
                            None => {
                                idle += 1;
                                tokio::task::yield_now().await;
                            }
                        }
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.await.unwrap();
        }

        for (i, id) in ids.iter().enumerate() {
            let expr = orch.get_expression(id).await.unwrap();
            assert_eq!(expr.status, ExpressionStatus::Completed);
            assert_eq!(expr.result, Some((i as f64 + 1.0) * 5.0 - 2.0));
        }
    }
}
