//! Binary operators, their dispatch priority and simulated execution cost.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Priority constants
// ---------------------------------------------------------------------------

/// Dispatch priority for `*` and `/`. Popped before additive work.
pub const PRIORITY_MULTIPLICATIVE: i32 = 2;

/// Dispatch priority for `+` and `-`.
pub const PRIORITY_ADDITIVE: i32 = 1;

// ---------------------------------------------------------------------------
// Operator
// ---------------------------------------------------------------------------

/// One of the four supported binary operators.
///
/// Serialized as its symbol (`"+"`, `"-"`, `"*"`, `"/"`) on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
}

/// Failure while applying an operator to its operands.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArithmeticError {
    #[error("division by zero")]
    DivisionByZero,
}

impl Operator {
    /// Map a source character to an operator, if it is one.
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Add),
            '-' => Some(Self::Subtract),
            '*' => Some(Self::Multiply),
            '/' => Some(Self::Divide),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => '*',
            Self::Divide => '/',
        }
    }

    /// Dispatch priority; higher values are dequeued first.
    pub fn priority(self) -> i32 {
        match self {
            Self::Multiply | Self::Divide => PRIORITY_MULTIPLICATIVE,
            Self::Add | Self::Subtract => PRIORITY_ADDITIVE,
        }
    }

    /// Binding strength used by the compiler. Mirrors dispatch priority.
    pub(crate) fn binding_power(self) -> u8 {
        match self {
            Self::Multiply | Self::Divide => 2,
            Self::Add | Self::Subtract => 1,
        }
    }

    /// Evaluate `lhs <op> rhs`.
    pub fn apply(self, lhs: f64, rhs: f64) -> Result<f64, ArithmeticError> {
        match self {
            Self::Add => Ok(lhs + rhs),
            Self::Subtract => Ok(lhs - rhs),
            Self::Multiply => Ok(lhs * rhs),
            Self::Divide if rhs == 0.0 => Err(ArithmeticError::DivisionByZero),
            Self::Divide => Ok(lhs / rhs),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

// ---------------------------------------------------------------------------
// Simulated durations
// ---------------------------------------------------------------------------

/// Simulated execution cost attached to each task, per operator.
///
/// The queue never interprets these; workers sleep for the duration before
/// computing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationTimes {
    pub addition: Duration,
    pub subtraction: Duration,
    pub multiplication: Duration,
    pub division: Duration,
}

impl OperationTimes {
    /// Every operation completes instantly. Handy for tests.
    pub const fn zero() -> Self {
        Self {
            addition: Duration::ZERO,
            subtraction: Duration::ZERO,
            multiplication: Duration::ZERO,
            division: Duration::ZERO,
        }
    }

    pub fn for_operator(&self, op: Operator) -> Duration {
        match op {
            Operator::Add => self.addition,
            Operator::Subtract => self.subtraction,
            Operator::Multiply => self.multiplication,
            Operator::Divide => self.division,
        }
    }
}

impl Default for OperationTimes {
    fn default() -> Self {
        Self {
            addition: Duration::from_millis(2000),
            subtraction: Duration::from_millis(2000),
            multiplication: Duration::from_millis(3000),
            division: Duration::from_millis(4000),
        }
    }
}
