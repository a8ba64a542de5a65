//! Core types for the deferred-task queue
//!
//! This module defines the types shared by the queue and its users:
//! - Task identifiers (returned at scheduling time, used for cancellation)
//! - Deferred task entries (poll schedule plus message)
//! - Scheduler errors

/// Identifier of a scheduled task
///
/// Identifiers are never reused within one queue, so a stale id cannot
/// cancel a newer task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u32);

/// A task waiting in the deferred queue
///
/// The task does not carry a closure: it carries a plain message that the
/// host event loop interprets when the task comes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeferredTask<M> {
    /// Identifier assigned at scheduling time
    pub id: TaskId,

    /// Monotonic time (ms) of the next poll
    pub next_poll_ms: u64,

    /// Re-poll interval in milliseconds
    ///
    /// A due task is re-armed by this interval until the handler cancels
    /// it. Polling rather than one-shot firing lets the handler re-check
    /// conditions that depend on the wall clock.
    pub interval_ms: u32,

    /// Message handed back when the task comes due
    pub message: M,
}

impl<M> DeferredTask<M> {
    /// Check if the task is due at `now_ms`
    #[inline]
    pub fn is_due(&self, now_ms: u64) -> bool {
        now_ms >= self.next_poll_ms
    }
}

/// Scheduler errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    /// No free slot for another task
    QueueFull,
}

impl core::fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SchedulerError::QueueFull => write!(f, "deferred task queue full"),
        }
    }
}
