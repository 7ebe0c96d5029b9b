//! Settle Core - Deferred Operation Primitive
//!
//! A single-assignment settlement primitive for cooperative, single-threaded
//! execution. A `Deferred<T, E>` represents the eventual result of an
//! operation that completes at an unknown future time. It starts pending,
//! settles exactly once to either a fulfillment value or a rejection reason,
//! and delivers that outcome to every registered continuation through a
//! shared FIFO job queue.
//!
//! # Architecture
//!
//! The crate is organized into:
//!
//! - `phase`: the public Pending/Fulfilled/Rejected state enum
//! - `queue`: the shared FIFO job queue continuations are dispatched through
//! - `deferred`: the settlement primitive, resolver, and chaining
//! - `completion`: the outcome a continuation produces (value, chain, fault)
//! - `future`: `core::future::Future` integration for await-style consumers
//! - `error`: error types for synchronous state queries
//!
//! # Usage
//!
//! ```ignore
//! use settle_core::{Completion, Deferred, JobQueue};
//!
//! let queue = JobQueue::new();
//! let sum = Deferred::<i64, &str>::new(&queue, |resolver| {
//!     resolver.fulfill(42);
//! })
//! .then(|v| Completion::value(v + 1));
//!
//! while let Some(job) = queue.pop() {
//!     job();
//! }
//! assert_eq!(sum.try_outcome().unwrap(), Ok(43));
//! ```

#![no_std]

extern crate alloc;

pub mod completion;
pub mod deferred;
pub mod error;
pub mod future;
pub mod phase;
pub mod queue;

pub use completion::Completion;
pub use deferred::{Deferred, Resolver};
pub use error::{SettleError, SettleResult};
pub use phase::Phase;
pub use queue::{Job, JobQueue};

/// Crate version.
pub const VERSION: &str = "0.1.0";
