//! Deferred-task scheduling without an async runtime
//!
//! Work that must wait for a wall-clock condition (such as a rate-limited
//! flash write) is queued as a message and polled from the host event loop.
//!
//! # Components
//!
//! - [`types`]: Core types (TaskId, DeferredTask, SchedulerError)
//! - [`queue`]: Fixed-capacity queue with poll and cancel
//!
//! # Example
//!
//! ```rust
//! use sprinkler_core::scheduler::DeferredQueue;
//!
//! let mut queue: DeferredQueue<u8, 4> = DeferredQueue::new();
//! let id = queue.schedule(7, 0, 60_000).unwrap();
//!
//! assert_eq!(queue.poll_due(60_000), Some((id, 7)));
//! assert!(queue.cancel(id));
//! ```

pub mod queue;
pub mod types;

pub use queue::*;
pub use types::*;
