//! Scheduling core of the distributed calculator.
//!
//! Compiles arithmetic expressions into dependency graphs, tracks which
//! operations are ready, and hands them out to polling workers through a
//! priority queue. Shared by the HTTP API, the worker and tests.

pub mod error;
pub mod graph;
pub mod operator;
pub mod orchestrator;
pub mod parser;
pub mod queue;
pub mod shutdown;
pub mod store;
pub mod task;
pub mod types;

pub use error::CoreError;
pub use operator::{OperationTimes, Operator};
pub use orchestrator::{Orchestrator, ReportOutcome};
pub use task::{Expression, ExpressionStatus, Task, TaskResult};
