//! Settlement phase of a deferred operation.

use core::fmt;

/// The externally observable state of a deferred operation.
///
/// Transitions are monotonic and one-way: `Pending` moves exactly once to
/// `Fulfilled` or `Rejected` and never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Not yet settled.
    Pending,
    /// Settled with a value.
    Fulfilled,
    /// Settled with a reason.
    Rejected,
}

impl Phase {
    /// Returns true while the operation has not settled.
    pub fn is_pending(&self) -> bool {
        matches!(self, Phase::Pending)
    }

    /// Returns true once the operation has settled either way.
    pub fn is_settled(&self) -> bool {
        !self.is_pending()
    }

    /// Returns true if settled with a value.
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Phase::Fulfilled)
    }

    /// Returns true if settled with a reason.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Phase::Rejected)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Pending => write!(f, "pending"),
            Phase::Fulfilled => write!(f, "fulfilled"),
            Phase::Rejected => write!(f, "rejected"),
        }
    }
}
