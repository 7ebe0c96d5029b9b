//! The deferred operation primitive.
//!
//! A `Deferred<T, E>` is a shared handle to a single-assignment settlement
//! slot. The producer side settles it exactly once through a [`Resolver`];
//! the consumer side chains continuations with [`Deferred::then`],
//! [`Deferred::catch`] and [`Deferred::settle`], or awaits it as a
//! `Future`. Continuations never run inline: settlement and late
//! registration both dispatch them through the shared [`JobQueue`], so
//! every continuation body runs on its own scheduling turn.

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};
use spin::Mutex;

use crate::completion::Completion;
use crate::error::{SettleError, SettleResult};
use crate::phase::Phase;
use crate::queue::JobQueue;

type SuccessFn<T> = Box<dyn FnOnce(T) + Send + 'static>;
type FailureFn<E> = Box<dyn FnOnce(E) + Send + 'static>;

/// Settlement slot plus the continuations waiting on it.
enum Slot<T, E> {
    /// Not yet settled; continuations queue here in registration order.
    Pending {
        on_fulfilled: Vec<SuccessFn<T>>,
        on_rejected: Vec<FailureFn<E>>,
    },
    /// Settled with a value.
    Fulfilled(T),
    /// Settled with a reason.
    Rejected(E),
}

struct Inner<T, E> {
    slot: Mutex<Slot<T, E>>,
    queue: JobQueue,
    /// Set once a failure handler, adopter, or awaiter has taken
    /// responsibility for the rejection side.
    rejection_observed: AtomicBool,
}

impl<T, E> Drop for Inner<T, E> {
    fn drop(&mut self) {
        if let Slot::Rejected(_) = &*self.slot.lock() {
            if !self.rejection_observed.load(Ordering::Relaxed) {
                log::warn!(
                    "[Settle] unhandled rejection dropped (reason type: {})",
                    core::any::type_name::<E>()
                );
            }
        }
    }
}

/// A shared handle to the eventual result of an operation.
pub struct Deferred<T, E> {
    inner: Arc<Inner<T, E>>,
}

impl<T, E> Clone for Deferred<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// The producer-side settlement capability of a deferred operation.
///
/// Both `fulfill` and `reject` are effectively callable once: the first
/// call to either fixes the terminal state, and every later call to either
/// is silently ignored.
pub struct Resolver<T, E> {
    inner: Arc<Inner<T, E>>,
}

impl<T, E> Clone for Resolver<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, E> Deferred<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Create a pending deferred and immediately run `executor` with its
    /// resolver.
    pub fn new<F>(queue: &JobQueue, executor: F) -> Self
    where
        F: FnOnce(Resolver<T, E>),
    {
        let (deferred, resolver) = Self::pending(queue);
        executor(resolver);
        deferred
    }

    /// Create a pending deferred along with its resolver, for producers
    /// that settle from elsewhere (timer callbacks, chained operations).
    pub fn pending(queue: &JobQueue) -> (Self, Resolver<T, E>) {
        let inner = Arc::new(Inner {
            slot: Mutex::new(Slot::Pending {
                on_fulfilled: Vec::new(),
                on_rejected: Vec::new(),
            }),
            queue: queue.clone(),
            rejection_observed: AtomicBool::new(false),
        });
        (
            Self {
                inner: inner.clone(),
            },
            Resolver { inner },
        )
    }

    /// Create a deferred already settled with a value.
    pub fn fulfilled(queue: &JobQueue, value: T) -> Self {
        let (deferred, resolver) = Self::pending(queue);
        resolver.fulfill(value);
        deferred
    }

    /// Create a deferred already settled with a reason.
    pub fn rejected(queue: &JobQueue, reason: E) -> Self {
        let (deferred, resolver) = Self::pending(queue);
        resolver.reject(reason);
        deferred
    }

    /// Current settlement phase.
    pub fn phase(&self) -> Phase {
        match &*self.inner.slot.lock() {
            Slot::Pending { .. } => Phase::Pending,
            Slot::Fulfilled(_) => Phase::Fulfilled,
            Slot::Rejected(_) => Phase::Rejected,
        }
    }

    /// Returns true once the operation has settled either way.
    pub fn is_settled(&self) -> bool {
        self.phase().is_settled()
    }

    /// The queue this deferred dispatches continuations through.
    pub fn queue(&self) -> &JobQueue {
        &self.inner.queue
    }

    /// Synchronously read the settled outcome.
    ///
    /// Returns `Err(SettleError::NotSettled)` while pending. Reading a
    /// rejection this way counts as observing it.
    pub fn try_outcome(&self) -> SettleResult<Result<T, E>> {
        match &*self.inner.slot.lock() {
            Slot::Pending { .. } => Err(SettleError::NotSettled),
            Slot::Fulfilled(value) => Ok(Ok(value.clone())),
            Slot::Rejected(reason) => {
                self.inner.rejection_observed.store(true, Ordering::Relaxed);
                Ok(Err(reason.clone()))
            }
        }
    }

    /// Chain a success continuation; rejection propagates unchanged.
    ///
    /// The returned deferred fulfills with the continuation's `Value`,
    /// adopts its `Chain`, or rejects with its `Fault`. If the receiver
    /// rejects, the returned deferred rejects with the same reason and the
    /// continuation never runs.
    pub fn then<U, F>(&self, on_fulfilled: F) -> Deferred<U, E>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Completion<U, E> + Send + 'static,
    {
        // Propagation hands the rejection to the child.
        self.mark_rejection_observed();
        let (child, resolver) = Deferred::pending(&self.inner.queue);
        let reject = resolver.clone();
        self.register(
            Some(Box::new(move |value| resolver.complete(on_fulfilled(value)))),
            Some(Box::new(move |reason| reject.reject(reason))),
        );
        child
    }

    /// Chain a failure continuation; fulfillment passes through unchanged.
    ///
    /// A continuation that returns `Value` absorbs the rejection and puts
    /// the chain back on the success path.
    pub fn catch<G>(&self, on_rejected: G) -> Deferred<T, E>
    where
        G: FnOnce(E) -> Completion<T, E> + Send + 'static,
    {
        self.mark_rejection_observed();
        let (child, resolver) = Deferred::pending(&self.inner.queue);
        let fulfill = resolver.clone();
        self.register(
            Some(Box::new(move |value| fulfill.fulfill(value))),
            Some(Box::new(move |reason| resolver.complete(on_rejected(reason)))),
        );
        child
    }

    /// Chain both continuations at once.
    ///
    /// Exactly one of the two runs, on the scheduling turn after
    /// settlement, and its completion settles the returned deferred.
    pub fn settle<U, F, G>(&self, on_fulfilled: F, on_rejected: G) -> Deferred<U, E>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Completion<U, E> + Send + 'static,
        G: FnOnce(E) -> Completion<U, E> + Send + 'static,
    {
        self.mark_rejection_observed();
        let (child, resolver) = Deferred::pending(&self.inner.queue);
        let reject = resolver.clone();
        self.register(
            Some(Box::new(move |value| resolver.complete(on_fulfilled(value)))),
            Some(Box::new(move |reason| reject.complete(on_rejected(reason)))),
        );
        child
    }

    /// Forward this deferred's eventual outcome into `resolver`.
    ///
    /// This is the flattening primitive: a child adopting `Chain(inner)`
    /// pipes `inner` into its own resolver.
    pub(crate) fn pipe(&self, resolver: Resolver<T, E>) {
        // The adopter takes responsibility for the rejection side.
        self.mark_rejection_observed();
        let reject = resolver.clone();
        self.register(
            Some(Box::new(move |value| resolver.fulfill(value))),
            Some(Box::new(move |reason| reject.reject(reason))),
        );
    }

    pub(crate) fn mark_rejection_observed(&self) {
        self.inner.rejection_observed.store(true, Ordering::Relaxed);
    }

    /// Register raw continuations.
    ///
    /// While pending both sides are stored in registration order. After
    /// settlement only the matching side is scheduled, immediately, with
    /// the stored value or reason. Each registered continuation runs at
    /// most once.
    pub(crate) fn register(
        &self,
        on_ok: Option<SuccessFn<T>>,
        on_err: Option<FailureFn<E>>,
    ) {
        let mut slot = self.inner.slot.lock();
        match &mut *slot {
            Slot::Pending {
                on_fulfilled,
                on_rejected,
            } => {
                if let Some(f) = on_ok {
                    on_fulfilled.push(f);
                }
                if let Some(g) = on_err {
                    on_rejected.push(g);
                }
            }
            Slot::Fulfilled(value) => {
                if let Some(f) = on_ok {
                    let value = value.clone();
                    drop(slot);
                    self.inner.queue.schedule(move || f(value));
                }
            }
            Slot::Rejected(reason) => {
                if let Some(g) = on_err {
                    let reason = reason.clone();
                    drop(slot);
                    self.inner.queue.schedule(move || g(reason));
                }
            }
        }
    }
}

impl<T, E> fmt::Debug for Deferred<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("phase", &self.phase())
            .finish()
    }
}

impl<T, E> Resolver<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Settle with a value.
    ///
    /// No-op if the deferred has already settled. Queued success
    /// continuations are scheduled in registration order; queued failure
    /// continuations are discarded.
    pub fn fulfill(&self, value: T) {
        let ready = {
            let mut slot = self.inner.slot.lock();
            match &mut *slot {
                Slot::Pending { on_fulfilled, .. } => {
                    let ready = core::mem::take(on_fulfilled);
                    *slot = Slot::Fulfilled(value.clone());
                    Some(ready)
                }
                _ => None,
            }
        };
        if let Some(ready) = ready {
            log::trace!("[Settle] fulfilled, scheduling {} continuation(s)", ready.len());
            for f in ready {
                let value = value.clone();
                self.inner.queue.schedule(move || f(value));
            }
        }
    }

    /// Settle with a reason.
    ///
    /// No-op if the deferred has already settled. Queued failure
    /// continuations are scheduled in registration order; queued success
    /// continuations are discarded.
    pub fn reject(&self, reason: E) {
        let ready = {
            let mut slot = self.inner.slot.lock();
            match &mut *slot {
                Slot::Pending { on_rejected, .. } => {
                    let ready = core::mem::take(on_rejected);
                    *slot = Slot::Rejected(reason.clone());
                    Some(ready)
                }
                _ => None,
            }
        };
        if let Some(ready) = ready {
            log::trace!("[Settle] rejected, scheduling {} continuation(s)", ready.len());
            for g in ready {
                let reason = reason.clone();
                self.inner.queue.schedule(move || g(reason));
            }
        }
    }

    /// Settle from a continuation outcome, flattening chains.
    pub fn complete(&self, completion: Completion<T, E>) {
        match completion {
            Completion::Value(value) => self.fulfill(value),
            Completion::Fault(reason) => self.reject(reason),
            Completion::Chain(deferred) => deferred.pipe(self.clone()),
        }
    }
}
