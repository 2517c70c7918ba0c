//! Local evaluation of a dequeued task.

use calc_core::operator::ArithmeticError;
use calc_core::Task;

/// Reasons a worker refuses to report a numeric result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComputeError {
    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),

    /// The operation overflowed to infinity or produced NaN.
    #[error("result of {arg1} {operation} {arg2} is not a finite number")]
    NonFinite {
        arg1: f64,
        operation: char,
        arg2: f64,
    },
}

/// Apply the task's operator to its operands.
pub fn compute(task: &Task) -> Result<f64, ComputeError> {
    let value = task.operation.apply(task.arg1, task.arg2)?;
    if !value.is_finite() {
        return Err(ComputeError::NonFinite {
            arg1: task.arg1,
            operation: task.operation.symbol(),
            arg2: task.arg2,
        });
    }
    Ok(value)
}
