//! Event loop configuration constants.
//!
//! Compile-time limits that bound a single `run` or `block_on` call.
//! The limits exist to turn runaway self-requeuing work into an error
//! instead of a hang; well-behaved workloads never approach them.

/// Maximum number of turns (job drain + timer batch) per run.
pub const MAX_TURNS: u64 = 1 << 16;

/// Maximum number of jobs executed in a single drain.
pub const MAX_JOBS_PER_DRAIN: u64 = 1 << 20;

/// Initial capacity of the job queue.
pub const INITIAL_JOB_CAPACITY: usize = 32;
