//! # ChatRelay Scheduler
//!
//! Cooperative periodic task scheduler. Drives every time-based job of the
//! relay daemon from a single thread.
//!
//! ## Design Principles
//! - No timers of its own; the main loop calls `tick()` once per iteration
//! - Intervals are lower bounds: a busy loop fires late, never early
//! - Tasks may remove themselves (or others) from inside their callback
//! - Removal mid-walk resumes at the follower, never skips, never revisits
//!
//! ## Architecture
//! ```text
//! main loop ──tick()──▶ Scheduler
//!                         ├── "history_retention"  every 60s, forever
//!                         ├── "heartbeat"          every 1s, forever
//!                         └── "one_shot"           every 5s, count = 1
//!                                 │
//!                                 └── callback(ctx) ──▶ payload, mark_for_removal()
//! ```

pub mod engine;
pub mod owner;
pub mod tasks;

pub use engine::{Scheduler, TickReport};
pub use owner::{OwnerId, OwnerStatus};
pub use tasks::{
    MIN_INTERVAL_MS, Payload, Remaining, ScheduledTask, TaskCallback, TaskContext, TaskId,
    TaskUpdate,
};
