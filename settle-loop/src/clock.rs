//! Virtual-time clock.
//!
//! The loop does not sleep; when no jobs remain it advances this clock
//! straight to the next timer deadline. Timers therefore fire after at
//! least their requested delay in virtual time, and two independently
//! scheduled delays order only by their fire times.

use core::sync::atomic::{AtomicU64, Ordering};

/// A monotonically nondecreasing virtual clock, in milliseconds.
#[derive(Debug)]
pub struct VirtualClock {
    now_ms: AtomicU64,
}

impl VirtualClock {
    /// Create a clock at time zero.
    pub const fn new() -> Self {
        Self {
            now_ms: AtomicU64::new(0),
        }
    }

    /// Current virtual time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::Acquire)
    }

    /// Advance to `deadline_ms`. Attempts to move backwards are ignored.
    pub fn advance_to(&self, deadline_ms: u64) {
        self.now_ms.fetch_max(deadline_ms, Ordering::AcqRel);
    }
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_advance() {
        let clock = VirtualClock::new();
        assert_eq!(clock.now_ms(), 0);

        clock.advance_to(100);
        assert_eq!(clock.now_ms(), 100);

        // Moving backwards is a no-op.
        clock.advance_to(50);
        assert_eq!(clock.now_ms(), 100);

        clock.advance_to(100);
        assert_eq!(clock.now_ms(), 100);
    }
}
