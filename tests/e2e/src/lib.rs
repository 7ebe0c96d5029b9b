//! End-to-end tests for the Settle runtime.
//!
//! Drives complete producer/consumer scenarios through a real event loop:
//! simulated fetches settling after a delay, continuation chains with
//! flattening and fault recovery, timer ordering across independent
//! operations, and await-style consumption with structured error handling.

#![no_std]

extern crate alloc;

pub mod fixtures;

#[cfg(test)]
mod scenarios {
    use alloc::string::{String, ToString};
    use alloc::sync::Arc;
    use alloc::vec::Vec;
    use spin::Mutex;

    use settle_core::{Completion, Phase};
    use settle_loop::{EventLoop, LoopError};

    use crate::fixtures::{mock_fetch, FetchPlan};

    /// Every success continuation sees the value exactly once, whether
    /// registered before or after settlement.
    #[test]
    fn test_fulfillment_delivery_exactly_once() {
        let el = EventLoop::new();
        let deliveries = Arc::new(Mutex::new(Vec::new()));

        let (op, resolver) = el.pending::<i32, String>();
        for tag in ["before-1", "before-2"] {
            let deliveries = deliveries.clone();
            op.then(move |v| {
                deliveries.lock().push((tag, v));
                Completion::value(v)
            });
        }
        resolver.fulfill(11);
        resolver.fulfill(99);
        {
            let deliveries = deliveries.clone();
            op.then(move |v| {
                deliveries.lock().push(("after", v));
                Completion::value(v)
            });
        }

        el.run().unwrap();
        assert_eq!(
            *deliveries.lock(),
            [("before-1", 11), ("before-2", 11), ("after", 11)]
        );
    }

    /// A rejection reaches every failure continuation and propagates
    /// unchanged through links without one.
    #[test]
    fn test_rejection_delivery_and_propagation() {
        let el = EventLoop::new();
        let tail = el
            .deferred::<i32, String, _>(|r| r.reject("boom".to_string()))
            .then(|v| Completion::value(v + 1))
            .settle(
                |v| Completion::value(v),
                |e| Completion::value(-1).and_log(&e),
            );

        el.run().unwrap();
        assert_eq!(tail.try_outcome().unwrap(), Ok(-1));
    }

    /// A failure handler converts the reason into an ordinary value.
    #[test]
    fn test_rejection_caught_and_converted() {
        let el = EventLoop::new();
        let caught = el
            .deferred::<String, String, _>(|r| r.reject("boom".to_string()))
            .settle(
                |v| Completion::value(v),
                |e| Completion::value(alloc::format!("caught:{e}")),
            );

        el.run().unwrap();
        assert_eq!(caught.try_outcome().unwrap(), Ok("caught:boom".to_string()));
    }

    /// Three-link chain: first succeeds, second faults, third has only a
    /// success handler. The third handler never runs and the final
    /// deferred rejects with the fault.
    #[test]
    fn test_fault_in_chain_skips_success_only_links() {
        let el = EventLoop::new();
        let third_ran = Arc::new(Mutex::new(false));

        let flag = third_ran.clone();
        let tail = el
            .deferred::<i32, String, _>(|r| r.fulfill(1))
            .then(|_| Completion::<i32, String>::fault("thrown".to_string()))
            .then(move |v| {
                *flag.lock() = true;
                Completion::value(v)
            });

        // Keep the tail observed so the run stays quiet, then check it.
        let observed = tail.catch(Completion::fault);
        el.run().unwrap();

        assert!(!*third_ran.lock());
        assert_eq!(tail.phase(), Phase::Rejected);
        assert_eq!(observed.try_outcome().unwrap(), Err("thrown".to_string()));
    }

    /// A continuation returning a deferred flattens: the child adopts the
    /// inner operation's eventual state, including across a timer delay.
    #[test]
    fn test_chained_fetches_flatten() {
        let el = EventLoop::new();
        let chain_loop = el.clone();
        let result = mock_fetch(&el, FetchPlan::ok("https://example.com", 20))
            .then(move |first| {
                Completion::chain(
                    mock_fetch(&chain_loop, FetchPlan::ok("https://example2.com", 20))
                        .then(move |second| Completion::value(alloc::format!("{first}+{second}"))),
                )
            });

        el.run().unwrap();
        assert_eq!(
            result.try_outcome().unwrap(),
            Ok("payload:https://example.com+payload:https://example2.com".to_string())
        );
        assert_eq!(el.now_ms(), 40);
    }

    /// Timer-settled operations order by fire time: the shorter delay's
    /// continuation observably runs first.
    #[test]
    fn test_independent_delays_order_by_fire_time() {
        let el = EventLoop::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let slow = mock_fetch(&el, FetchPlan::ok("slow", 300));
        let fast = mock_fetch(&el, FetchPlan::ok("fast", 30));

        for op in [slow, fast] {
            let order = order.clone();
            op.then(move |v| {
                order.lock().push(v);
                Completion::value(())
            });
        }

        el.run().unwrap();
        assert_eq!(*order.lock(), ["payload:fast", "payload:slow"]);
    }

    /// Await-style consumption: try/catch becomes match/`?` at the await
    /// point, and a failed fetch can be retried on the failure path.
    #[test]
    fn test_await_with_structured_error_handling() {
        let el = EventLoop::new();
        let retry_loop = el.clone();

        let out = el.block_on(async move {
            let first = mock_fetch(&retry_loop, FetchPlan::fail("https://flaky", 10)).await;
            match first {
                Ok(payload) => payload,
                Err(_) => mock_fetch(&retry_loop, FetchPlan::ok("https://backup", 10))
                    .await
                    .unwrap_or_else(|e| e),
            }
        });

        assert_eq!(out.unwrap(), "payload:https://backup".to_string());
    }

    /// Settlement is single-assignment even when producer and chained
    /// predecessor race to settle the same child.
    #[test]
    fn test_first_settlement_wins_through_chain() {
        let el = EventLoop::new();
        let (child, resolver) = el.pending::<&'static str, String>();

        // Producer settles directly...
        resolver.fulfill("direct");
        // ...and a timer tries again later.
        let late = resolver.clone();
        el.set_timeout(50, move || late.fulfill("late"));

        el.run().unwrap();
        assert_eq!(child.try_outcome().unwrap(), Ok("direct"));
    }

    /// An operation nothing can ever settle is reported, not hung.
    #[test]
    fn test_unsettleable_await_is_reported() {
        let el = EventLoop::new();
        let (orphan, _resolver) = el.pending::<i32, String>();
        assert_eq!(el.block_on(orphan), Err(LoopError::Stalled));
    }

    /// Callback-style producer: a plain timer job settles the operation,
    /// the way the callback pattern wraps a timed operation.
    #[test]
    fn test_callback_style_producer() {
        let el = EventLoop::new();
        let (op, resolver) = el.pending::<&'static str, String>();
        el.set_timeout(15, move || resolver.fulfill("operation complete"));

        let done = op.then(|msg| Completion::value(msg.len()));
        el.run().unwrap();
        assert_eq!(done.try_outcome().unwrap(), Ok(18));
    }

    trait AndLog {
        fn and_log(self, reason: &str) -> Self;
    }

    impl<T, E> AndLog for Completion<T, E> {
        fn and_log(self, reason: &str) -> Self {
            log::debug!("[Settle e2e] absorbed rejection: {}", reason);
            self
        }
    }
}
