//! Shared FIFO job queue.
//!
//! Every continuation body runs as a queued job: settlement pushes the
//! matching continuations in registration order, and the event loop drains
//! the queue one job at a time. Each job runs to completion before the next
//! begins; the queue itself is the only scheduling structure the core needs.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::sync::Arc;
use spin::Mutex;

/// A queued unit of work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// A cloneable handle to a shared FIFO of jobs.
///
/// Producers (settling deferreds, timers) push; the event loop pops.
/// Jobs queued while another job is running are appended behind all
/// currently queued jobs.
#[derive(Clone)]
pub struct JobQueue {
    jobs: Arc<Mutex<VecDeque<Job>>>,
}

impl JobQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            jobs: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Create an empty queue with room for `capacity` jobs.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            jobs: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
        }
    }

    /// Append a boxed job.
    pub fn push(&self, job: Job) {
        self.jobs.lock().push_back(job);
    }

    /// Append a closure as a job.
    pub fn schedule<F: FnOnce() + Send + 'static>(&self, f: F) {
        self.push(Box::new(f));
    }

    /// Remove and return the oldest queued job.
    pub fn pop(&self) -> Option<Job> {
        self.jobs.lock().pop_front()
    }

    /// Number of queued jobs.
    pub fn len(&self) -> usize {
        self.jobs.lock().len()
    }

    /// Returns true when no jobs are queued.
    pub fn is_empty(&self) -> bool {
        self.jobs.lock().is_empty()
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}
