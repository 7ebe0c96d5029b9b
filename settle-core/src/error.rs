//! Error types for synchronous deferred queries.

use core::fmt;

/// Result type for synchronous deferred operations.
pub type SettleResult<T> = Result<T, SettleError>;

/// Errors reported by synchronous queries on a deferred operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettleError {
    /// The operation has not settled yet.
    NotSettled,
}

impl fmt::Display for SettleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettleError::NotSettled => write!(f, "deferred operation has not settled"),
        }
    }
}
