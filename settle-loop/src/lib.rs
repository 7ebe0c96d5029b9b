//! Settle Loop - Cooperative Event Loop
//!
//! A deterministic, single-threaded driver for deferred operations: a FIFO
//! job queue for continuations, a virtual-time timer queue for delayed and
//! repeating work, and a `block_on` entry point for await-style consumers.
//!
//! At most one continuation body executes at a time and every body runs to
//! completion before the next begins. Time is virtual: the loop advances
//! the clock straight to the next timer deadline once all queued jobs have
//! drained, so runs are reproducible and never sleep.
//!
//! # Architecture
//!
//! - `clock`: monotonic virtual-millisecond clock
//! - `timer`: deadline-ordered timer queue with cancellation
//! - `event_loop`: the turn loop, producer conveniences, and `block_on`
//! - `config`: compile-time limits
//! - `error`: loop failure types
//!
//! # Usage
//!
//! ```ignore
//! use settle_loop::EventLoop;
//!
//! let el = EventLoop::new();
//! let data = el.settle_after(200, Ok::<_, &str>("payload"));
//! let out = el.block_on(async move { data.await })?;
//! assert_eq!(out, Ok("payload"));
//! ```

#![no_std]

extern crate alloc;

pub mod clock;
pub mod config;
pub mod error;
pub mod event_loop;
pub mod timer;

pub use clock::VirtualClock;
pub use error::{LoopError, LoopResult};
pub use event_loop::{EventLoop, LoopStats, StatsSnapshot};
pub use timer::TimerId;

/// Crate version.
pub const VERSION: &str = "0.1.0";
