//! Event loop error types.

use core::fmt;

/// Result type for event loop operations.
pub type LoopResult<T> = Result<T, LoopError>;

/// Failures surfaced by `run` and `block_on`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopError {
    /// `block_on` ran out of work while the future was still pending:
    /// no queued jobs, no live timers, nothing left that could wake it.
    Stalled,
    /// A turn or job budget was exceeded (see `config`), which indicates
    /// runaway self-requeuing work.
    BudgetExceeded,
}

impl fmt::Display for LoopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopError::Stalled => {
                write!(f, "event loop is idle but the awaited operation never settled")
            }
            LoopError::BudgetExceeded => {
                write!(f, "event loop turn or job budget exceeded")
            }
        }
    }
}
