//! Deadline-ordered timer queue.
//!
//! Timers are ordered by (deadline, submission sequence): equal deadlines
//! fire in submission order. Cancellation is lazy: cancelled ids keep
//! their heap entry until it surfaces, at which point it is dropped.
//! A cancelled timer never fires, and cancelling twice is a no-op.

use alloc::collections::BinaryHeap;
use alloc::boxed::Box;
use core::cmp::Ordering;
use hashbrown::HashSet;

use settle_core::Job;

/// Handle to a scheduled timer, used for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub(crate) u64);

/// Work attached to a timer.
pub(crate) enum TimerTask {
    /// Fires once and is forgotten.
    Once(Job),
    /// Fires every `period_ms` until cancelled.
    Repeating {
        callback: Box<dyn FnMut() + Send + 'static>,
        period_ms: u64,
    },
}

/// A timer that has reached its deadline.
pub(crate) struct DueTimer {
    pub id: TimerId,
    pub deadline_ms: u64,
    pub task: TimerTask,
}

struct TimerEntry {
    deadline_ms: u64,
    seq: u64,
    id: TimerId,
    task: TimerTask,
}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline_ms == other.deadline_ms && self.seq == other.seq
    }
}

impl Eq for TimerEntry {}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerEntry {
    // Reversed so the earliest (deadline, seq) sits on top of the max-heap.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline_ms
            .cmp(&self.deadline_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// The set of scheduled timers.
pub(crate) struct TimerQueue {
    heap: BinaryHeap<TimerEntry>,
    /// Ids scheduled and neither fired out nor cancelled.
    live: HashSet<u64>,
    /// Ids cancelled whose heap entry has not surfaced yet.
    cancelled: HashSet<u64>,
    next_id: u64,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            live: HashSet::new(),
            cancelled: HashSet::new(),
            next_id: 0,
            next_seq: 0,
        }
    }

    fn push(&mut self, deadline_ms: u64, id: TimerId, task: TimerTask) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(TimerEntry {
            deadline_ms,
            seq,
            id,
            task,
        });
    }

    fn allocate_id(&mut self) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.live.insert(id.0);
        id
    }

    /// Schedule a one-shot timer.
    pub fn schedule_once(&mut self, deadline_ms: u64, job: Job) -> TimerId {
        let id = self.allocate_id();
        self.push(deadline_ms, id, TimerTask::Once(job));
        id
    }

    /// Schedule a repeating timer with its first deadline and period.
    pub fn schedule_repeating(
        &mut self,
        deadline_ms: u64,
        period_ms: u64,
        callback: Box<dyn FnMut() + Send + 'static>,
    ) -> TimerId {
        let id = self.allocate_id();
        self.push(
            deadline_ms,
            id,
            TimerTask::Repeating {
                callback,
                period_ms,
            },
        );
        id
    }

    /// Cancel a timer. Returns true if it was live; a second cancel or a
    /// cancel after the last firing returns false.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        if self.live.remove(&id.0) {
            self.cancelled.insert(id.0);
            true
        } else {
            false
        }
    }

    /// Earliest deadline among live timers.
    pub fn next_deadline(&self) -> Option<u64> {
        self.heap
            .iter()
            .filter(|e| !self.cancelled.contains(&e.id.0))
            .map(|e| e.deadline_ms)
            .min()
    }

    /// Pop the next timer due at or before `now_ms`, dropping cancelled
    /// entries along the way.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<DueTimer> {
        loop {
            let (is_cancelled, is_due) = match self.heap.peek() {
                None => return None,
                Some(top) => (
                    self.cancelled.contains(&top.id.0),
                    top.deadline_ms <= now_ms,
                ),
            };
            if is_cancelled {
                if let Some(entry) = self.heap.pop() {
                    self.cancelled.remove(&entry.id.0);
                }
                continue;
            }
            if !is_due {
                return None;
            }
            let entry = self.heap.pop()?;
            if matches!(entry.task, TimerTask::Once(_)) {
                self.live.remove(&entry.id.0);
            }
            return Some(DueTimer {
                id: entry.id,
                deadline_ms: entry.deadline_ms,
                task: entry.task,
            });
        }
    }

    /// Re-queue a repeating timer after it fired, unless it was cancelled
    /// from inside its own callback.
    pub fn reschedule_if_live(&mut self, id: TimerId, deadline_ms: u64, task: TimerTask) -> bool {
        if self.live.contains(&id.0) {
            self.push(deadline_ms, id, task);
            true
        } else {
            self.cancelled.remove(&id.0);
            false
        }
    }

    /// Number of live timers.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Returns true when no live timers remain.
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}
