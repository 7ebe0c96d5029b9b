//! The cooperative event loop.
//!
//! One turn = drain all queued jobs, then advance the virtual clock to the
//! earliest timer deadline and fire the due timers, draining jobs after
//! each so that continuations queued by a timer run before the next timer
//! fires. `run` repeats turns until no jobs and no live timers remain;
//! `block_on` interleaves turns with polls of a future.

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::task::Wake;
use core::future::Future;
use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use core::task::{Context, Poll, Waker};
use spin::Mutex;

use settle_core::{Deferred, JobQueue, Resolver};

use crate::clock::VirtualClock;
use crate::config;
use crate::error::{LoopError, LoopResult};
use crate::timer::{TimerId, TimerQueue, TimerTask};

/// Event loop counters.
#[derive(Debug)]
pub struct LoopStats {
    /// Total jobs executed.
    pub jobs_run: AtomicU64,
    /// Total timers fired.
    pub timers_fired: AtomicU64,
    /// Total timers cancelled before firing.
    pub timers_cancelled: AtomicU64,
    /// Total turns taken.
    pub turns: AtomicU64,
}

impl LoopStats {
    pub const fn new() -> Self {
        Self {
            jobs_run: AtomicU64::new(0),
            timers_fired: AtomicU64::new(0),
            timers_cancelled: AtomicU64::new(0),
            turns: AtomicU64::new(0),
        }
    }

    /// Copy the current counter values.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            jobs_run: self.jobs_run.load(Ordering::Relaxed),
            timers_fired: self.timers_fired.load(Ordering::Relaxed),
            timers_cancelled: self.timers_cancelled.load(Ordering::Relaxed),
            turns: self.turns.load(Ordering::Relaxed),
        }
    }
}

/// Plain-value copy of [`LoopStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub jobs_run: u64,
    pub timers_fired: u64,
    pub timers_cancelled: u64,
    pub turns: u64,
}

struct LoopInner {
    jobs: JobQueue,
    timers: Mutex<TimerQueue>,
    clock: VirtualClock,
    stats: LoopStats,
}

/// A cloneable handle to a cooperative single-threaded event loop.
///
/// Producers clone the handle into their closures to schedule jobs and
/// timers; one call site drives everything with [`EventLoop::run`] or
/// [`EventLoop::block_on`].
#[derive(Clone)]
pub struct EventLoop {
    inner: Arc<LoopInner>,
}

impl EventLoop {
    /// Create an idle event loop at virtual time zero.
    pub fn new() -> Self {
        log::debug!("[Settle] event loop created");
        Self {
            inner: Arc::new(LoopInner {
                jobs: JobQueue::with_capacity(config::INITIAL_JOB_CAPACITY),
                timers: Mutex::new(TimerQueue::new()),
                clock: VirtualClock::new(),
                stats: LoopStats::new(),
            }),
        }
    }

    /// The job queue this loop drains.
    pub fn jobs(&self) -> &JobQueue {
        &self.inner.jobs
    }

    /// Current virtual time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.inner.clock.now_ms()
    }

    /// Counters for this loop.
    pub fn stats(&self) -> StatsSnapshot {
        self.inner.stats.snapshot()
    }

    /// Create a pending deferred and immediately run `executor` with its
    /// resolver.
    pub fn deferred<T, E, F>(&self, executor: F) -> Deferred<T, E>
    where
        T: Clone + Send + 'static,
        E: Clone + Send + 'static,
        F: FnOnce(Resolver<T, E>),
    {
        Deferred::new(&self.inner.jobs, executor)
    }

    /// Create a pending deferred along with its resolver.
    pub fn pending<T, E>(&self) -> (Deferred<T, E>, Resolver<T, E>)
    where
        T: Clone + Send + 'static,
        E: Clone + Send + 'static,
    {
        Deferred::pending(&self.inner.jobs)
    }

    /// Queue a plain job for the next turn.
    pub fn schedule<F: FnOnce() + Send + 'static>(&self, f: F) {
        self.inner.jobs.schedule(f);
    }

    /// Run `f` once, at least `delay_ms` of virtual time from now.
    pub fn set_timeout<F: FnOnce() + Send + 'static>(&self, delay_ms: u64, f: F) -> TimerId {
        let deadline = self.inner.clock.now_ms().saturating_add(delay_ms);
        let id = self
            .inner
            .timers
            .lock()
            .schedule_once(deadline, Box::new(f));
        log::trace!("[Settle] timer {:?} set for t={}ms", id, deadline);
        id
    }

    /// Run `f` every `period_ms` of virtual time until cancelled.
    ///
    /// A zero period is bumped to one millisecond so the timer cannot
    /// starve the rest of the loop.
    pub fn set_interval<F: FnMut() + Send + 'static>(&self, period_ms: u64, f: F) -> TimerId {
        let period_ms = period_ms.max(1);
        let deadline = self.inner.clock.now_ms().saturating_add(period_ms);
        let id = self
            .inner
            .timers
            .lock()
            .schedule_repeating(deadline, period_ms, Box::new(f));
        log::trace!("[Settle] interval {:?} set, period {}ms", id, period_ms);
        id
    }

    /// Cancel a timer or interval. Returns true if it was still live.
    /// Cancellation is idempotent; first to settle (fire out or cancel)
    /// wins.
    pub fn clear_timer(&self, id: TimerId) -> bool {
        let cancelled = self.inner.timers.lock().cancel(id);
        if cancelled {
            self.inner
                .stats
                .timers_cancelled
                .fetch_add(1, Ordering::Relaxed);
            log::trace!("[Settle] timer {:?} cancelled", id);
        }
        cancelled
    }

    /// A deferred that fulfills with `()` after `delay_ms`.
    pub fn delay<E>(&self, delay_ms: u64) -> Deferred<(), E>
    where
        E: Clone + Send + 'static,
    {
        self.settle_after(delay_ms, Ok(()))
    }

    /// A deferred that settles with `outcome` after `delay_ms`, the shape
    /// of a simulated fetch: the producer decides success or failure, the
    /// consumer chains on the result.
    pub fn settle_after<T, E>(&self, delay_ms: u64, outcome: Result<T, E>) -> Deferred<T, E>
    where
        T: Clone + Send + 'static,
        E: Clone + Send + 'static,
    {
        let (deferred, resolver) = self.pending();
        self.set_timeout(delay_ms, move || match outcome {
            Ok(value) => resolver.fulfill(value),
            Err(reason) => resolver.reject(reason),
        });
        deferred
    }

    /// Execute queued jobs until the queue is empty.
    fn drain_jobs(&self) -> LoopResult<bool> {
        let mut ran: u64 = 0;
        while let Some(job) = self.inner.jobs.pop() {
            job();
            ran += 1;
            if ran > config::MAX_JOBS_PER_DRAIN {
                log::warn!("[Settle] job budget exceeded, aborting run");
                return Err(LoopError::BudgetExceeded);
            }
        }
        if ran > 0 {
            self.inner.stats.jobs_run.fetch_add(ran, Ordering::Relaxed);
        }
        Ok(ran > 0)
    }

    /// Fire every timer due once the clock reaches the earliest deadline,
    /// draining jobs after each so continuations run between timers.
    fn fire_due_timers(&self) -> LoopResult<bool> {
        let next = self.inner.timers.lock().next_deadline();
        let deadline = match next {
            Some(deadline) => deadline,
            None => return Ok(false),
        };
        self.inner.clock.advance_to(deadline);
        let now = self.inner.clock.now_ms();
        log::trace!("[Settle] advancing to t={}ms", now);

        let mut fired = false;
        loop {
            let due = self.inner.timers.lock().pop_due(now);
            let due = match due {
                Some(due) => due,
                None => break,
            };
            fired = true;
            self.inner
                .stats
                .timers_fired
                .fetch_add(1, Ordering::Relaxed);
            match due.task {
                TimerTask::Once(job) => job(),
                TimerTask::Repeating {
                    mut callback,
                    period_ms,
                } => {
                    callback();
                    let next_deadline = due.deadline_ms.saturating_add(period_ms);
                    self.inner.timers.lock().reschedule_if_live(
                        due.id,
                        next_deadline,
                        TimerTask::Repeating {
                            callback,
                            period_ms,
                        },
                    );
                }
            }
            self.drain_jobs()?;
        }
        Ok(fired)
    }

    /// One turn: drain jobs, then fire the next timer batch.
    ///
    /// Returns true if any work was done.
    fn turn(&self) -> LoopResult<bool> {
        self.inner.stats.turns.fetch_add(1, Ordering::Relaxed);
        let drained = self.drain_jobs()?;
        let fired = self.fire_due_timers()?;
        Ok(drained || fired)
    }

    /// Returns true when no jobs are queued and no live timers remain.
    pub fn is_idle(&self) -> bool {
        self.inner.jobs.is_empty() && self.inner.timers.lock().is_empty()
    }

    /// Run turns until the loop is idle, then return the counters.
    pub fn run(&self) -> LoopResult<StatsSnapshot> {
        let mut turns: u64 = 0;
        loop {
            turns += 1;
            if turns > config::MAX_TURNS {
                log::warn!("[Settle] turn budget exceeded, aborting run");
                return Err(LoopError::BudgetExceeded);
            }
            if !self.turn()? {
                break;
            }
        }
        let stats = self.stats();
        log::debug!(
            "[Settle] run complete: {} job(s), {} timer(s), t={}ms",
            stats.jobs_run,
            stats.timers_fired,
            self.now_ms()
        );
        Ok(stats)
    }

    /// Drive `future` to completion, interleaving polls with turns.
    ///
    /// Returns `Err(LoopError::Stalled)` if the loop goes idle while the
    /// future is still pending, meaning the awaited operation can never
    /// settle.
    pub fn block_on<F: Future>(&self, future: F) -> LoopResult<F::Output> {
        let signal = Arc::new(WakeSignal(AtomicBool::new(true)));
        let waker = Waker::from(signal.clone());
        let mut cx = Context::from_waker(&waker);
        let mut future = Box::pin(future);

        let mut turns: u64 = 0;
        loop {
            if signal.0.swap(false, Ordering::AcqRel) {
                if let Poll::Ready(output) = future.as_mut().poll(&mut cx) {
                    return Ok(output);
                }
            }

            turns += 1;
            if turns > config::MAX_TURNS {
                log::warn!("[Settle] turn budget exceeded, aborting block_on");
                return Err(LoopError::BudgetExceeded);
            }
            let progressed = self.turn()?;
            if !progressed && !signal.0.load(Ordering::Acquire) {
                log::warn!("[Settle] block_on stalled: loop idle, future pending");
                return Err(LoopError::Stalled);
            }
        }
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

/// Waker that flags the driving loop to re-poll.
struct WakeSignal(AtomicBool);

impl Wake for WakeSignal {
    fn wake(self: Arc<Self>) {
        self.0.store(true, Ordering::Release);
    }
}
