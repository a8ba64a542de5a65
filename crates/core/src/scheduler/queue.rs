//! Fixed-capacity deferred-task queue
//!
//! Tasks are polled by the host event loop once per tick. A due task is
//! handed back to the caller and re-armed by its interval; it stays in the
//! queue until cancelled.

use heapless::Vec;

use super::types::{DeferredTask, SchedulerError, TaskId};

/// Deferred-task queue holding up to `N` tasks
#[derive(Debug)]
pub struct DeferredQueue<M: Copy, const N: usize> {
    tasks: Vec<DeferredTask<M>, N>,
    next_id: u32,
}

impl<M: Copy, const N: usize> DeferredQueue<M, N> {
    /// Create an empty queue
    pub const fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 0,
        }
    }

    /// Schedule `message` to be polled every `interval_ms`, first at
    /// `now_ms + interval_ms`
    pub fn schedule(&mut self, message: M, now_ms: u64, interval_ms: u32) -> Result<TaskId, SchedulerError> {
        let id = TaskId(self.next_id);
        let task = DeferredTask {
            id,
            next_poll_ms: now_ms.saturating_add(u64::from(interval_ms)),
            interval_ms,
            message,
        };

        self.tasks.push(task).map_err(|_| SchedulerError::QueueFull)?;
        self.next_id = self.next_id.wrapping_add(1);
        Ok(id)
    }

    /// Remove a task; returns `false` if it was not queued
    pub fn cancel(&mut self, id: TaskId) -> bool {
        match self.tasks.iter().position(|t| t.id == id) {
            Some(index) => {
                self.tasks.swap_remove(index);
                true
            }
            None => false,
        }
    }

    /// Return the first task due at `now_ms` and re-arm it
    pub fn poll_due(&mut self, now_ms: u64) -> Option<(TaskId, M)> {
        let task = self.tasks.iter_mut().find(|t| t.is_due(now_ms))?;
        task.next_poll_ms = now_ms.saturating_add(u64::from(task.interval_ms));
        Some((task.id, task.message))
    }

    /// Check if a task is queued
    pub fn contains(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|t| t.id == id)
    }

    /// Look up a queued task
    pub fn get(&self, id: TaskId) -> Option<&DeferredTask<M>> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<M: Copy, const N: usize> Default for DeferredQueue<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Msg {
        Flush,
        Ping(u8),
    }

    #[test]
    fn test_schedule_and_poll() {
        let mut queue: DeferredQueue<Msg, 2> = DeferredQueue::new();
        let id = queue.schedule(Msg::Flush, 1_000, 60_000).unwrap();

        // Not due before the interval elapses
        assert_eq!(queue.poll_due(1_000), None);
        assert_eq!(queue.poll_due(60_999), None);

        assert_eq!(queue.poll_due(61_000), Some((id, Msg::Flush)));
        // Re-armed, not due again right away
        assert_eq!(queue.poll_due(61_000), None);
        assert_eq!(queue.poll_due(121_000), Some((id, Msg::Flush)));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_cancel() {
        let mut queue: DeferredQueue<Msg, 2> = DeferredQueue::new();
        let a = queue.schedule(Msg::Ping(1), 0, 10).unwrap();
        let b = queue.schedule(Msg::Ping(2), 0, 20).unwrap();

        assert!(queue.cancel(a));
        assert!(!queue.cancel(a));
        assert!(!queue.contains(a));
        assert!(queue.contains(b));

        assert_eq!(queue.poll_due(20), Some((b, Msg::Ping(2))));
        assert!(queue.cancel(b));
        assert!(queue.is_empty());
        assert_eq!(queue.poll_due(1_000), None);
    }

    #[test]
    fn test_queue_full() {
        let mut queue: DeferredQueue<Msg, 1> = DeferredQueue::new();
        queue.schedule(Msg::Flush, 0, 10).unwrap();

        assert_eq!(queue.schedule(Msg::Flush, 0, 10), Err(SchedulerError::QueueFull));
    }

    #[test]
    fn test_ids_not_reused() {
        let mut queue: DeferredQueue<Msg, 1> = DeferredQueue::new();
        let a = queue.schedule(Msg::Flush, 0, 10).unwrap();
        queue.cancel(a);
        let b = queue.schedule(Msg::Flush, 0, 10).unwrap();

        assert_ne!(a, b);
        assert!(!queue.cancel(a));
        assert_eq!(queue.get(b).map(|t| t.interval_ms), Some(10));
    }
}
