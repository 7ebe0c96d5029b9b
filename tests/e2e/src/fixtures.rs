//! Test fixtures: simulated remote operations.
//!
//! `mock_fetch` stands in for a network request: it settles after a
//! configured virtual delay, succeeding with a payload derived from the
//! URL or failing with a network-style reason. Tests decide the outcome
//! up front, so scenarios stay deterministic.

use alloc::format;
use alloc::string::String;

use settle_core::Deferred;
use settle_loop::EventLoop;

/// What a simulated fetch should do.
#[derive(Debug, Clone)]
pub struct FetchPlan {
    pub url: &'static str,
    pub delay_ms: u64,
    pub succeed: bool,
}

impl FetchPlan {
    /// A fetch that succeeds after `delay_ms`.
    pub fn ok(url: &'static str, delay_ms: u64) -> Self {
        Self {
            url,
            delay_ms,
            succeed: true,
        }
    }

    /// A fetch that fails after `delay_ms`.
    pub fn fail(url: &'static str, delay_ms: u64) -> Self {
        Self {
            url,
            delay_ms,
            succeed: false,
        }
    }
}

/// Simulate a fetch against `plan`, settling after its virtual delay.
pub fn mock_fetch(el: &EventLoop, plan: FetchPlan) -> Deferred<String, String> {
    let outcome = if plan.succeed {
        Ok(format!("payload:{}", plan.url))
    } else {
        Err(format!("network error:{}", plan.url))
    };
    el.settle_after(plan.delay_ms, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use settle_core::Phase;

    #[test]
    fn test_mock_fetch_settles_after_delay() {
        let el = EventLoop::new();
        let op = mock_fetch(&el, FetchPlan::ok("https://example.com", 40));

        assert_eq!(op.phase(), Phase::Pending);
        el.run().unwrap();
        assert_eq!(op.phase(), Phase::Fulfilled);
        assert_eq!(el.now_ms(), 40);
    }

    #[test]
    fn test_mock_fetch_failure_reason() {
        let el = EventLoop::new();
        let op = mock_fetch(&el, FetchPlan::fail("https://example.com", 5));

        el.run().unwrap();
        assert_eq!(
            op.try_outcome().unwrap(),
            Err("network error:https://example.com".into())
        );
    }
}
