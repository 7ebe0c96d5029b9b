//! `Future` integration for await-style consumers.
//!
//! Awaiting a `Deferred<T, E>` yields `Result<T, E>`: fulfillment resumes
//! the task with `Ok(value)`, rejection resumes it with `Err(reason)` so
//! the usual `?`/`match` error handling observes it at the await point.
//! A pending poll registers the task's waker as a continuation on both
//! sides; whichever side settles wakes the task exactly once per poll.

use core::future::Future;
use core::pin::Pin;
use core::sync::atomic::Ordering;
use core::task::{Context, Poll};

use alloc::boxed::Box;

use crate::deferred::Deferred;
use crate::error::SettleError;

impl<T, E> Future for Deferred<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    type Output = Result<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.try_outcome() {
            Ok(outcome) => Poll::Ready(outcome),
            Err(SettleError::NotSettled) => {
                let wake_ok = cx.waker().clone();
                let wake_err = cx.waker().clone();
                self.register(
                    Some(Box::new(move |_value| wake_ok.wake())),
                    Some(Box::new(move |_reason| wake_err.wake())),
                );
                Poll::Pending
            }
        }
    }
}
