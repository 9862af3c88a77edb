//! Task definitions: the core data model for scheduled work.

use std::any::Any;
use std::fmt;

use chatrelay_core::error::{RelayError, Result};
use chrono::{DateTime, Utc};

use crate::owner::OwnerId;

/// Smallest interval `add` accepts without clamping, in milliseconds.
pub const MIN_INTERVAL_MS: u64 = 100;

/// Handle to a task owned by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// How many more times a task will fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remaining {
    /// Unlinked on the next tick.
    PendingRemoval,
    /// Fires until removed.
    Forever,
    /// Fires this many more times, then is removed.
    Times(u32),
}

impl Remaining {
    /// Decode the classic count convention: -1 pending removal, 0 forever,
    /// n > 0 exactly n times.
    pub fn from_count(count: i64) -> Result<Self> {
        match count {
            -1 => Ok(Remaining::PendingRemoval),
            0 => Ok(Remaining::Forever),
            n if n > 0 => u32::try_from(n)
                .map(Remaining::Times)
                .map_err(|_| RelayError::InvalidArgument(format!("count {n} is too large"))),
            n => Err(RelayError::InvalidArgument(format!("count {n} is negative"))),
        }
    }

    pub fn as_count(&self) -> i64 {
        match self {
            Remaining::PendingRemoval => -1,
            Remaining::Forever => 0,
            Remaining::Times(n) => i64::from(*n),
        }
    }
}

/// Opaque data handed to the callback on every fire.
pub type Payload = Box<dyn Any>;

/// Work run when a task fires.
pub type TaskCallback = Box<dyn FnMut(&mut TaskContext<'_>)>;

/// What a callback sees while it runs.
///
/// Callbacks cannot touch the scheduler directly; removals requested here
/// are applied as soon as the callback returns.
pub struct TaskContext<'a> {
    pub(crate) id: TaskId,
    pub(crate) name: &'a str,
    pub(crate) now: DateTime<Utc>,
    pub(crate) payload: &'a mut (dyn Any + 'static),
    pub(crate) removals: &'a mut Vec<TaskId>,
}

impl TaskContext<'_> {
    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.name
    }

    /// Time of the tick that fired this task.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// The task's payload, if it has type `T`.
    pub fn payload<T: Any>(&mut self) -> Option<&mut T> {
        self.payload.downcast_mut::<T>()
    }

    /// Ask for this task to be dropped on the next tick.
    pub fn mark_for_removal(&mut self) {
        self.removals.push(self.id);
    }

    /// Ask for another task to be dropped. A task later in the list goes
    /// away during the current pass, an earlier one on the next tick.
    pub fn mark_task_for_removal(&mut self, id: TaskId) {
        self.removals.push(id);
    }
}

/// A scheduled task.
pub struct ScheduledTask {
    pub(crate) id: TaskId,
    pub(crate) name: String,
    pub(crate) interval_ms: u64,
    pub(crate) remaining: Remaining,
    pub(crate) last_fired_at: DateTime<Utc>,
    pub(crate) callback: TaskCallback,
    pub(crate) payload: Payload,
    pub(crate) owner: Option<OwnerId>,
    pub(crate) fire_count: u64,
}

impl ScheduledTask {
    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Interval in milliseconds; 0 fires on every tick.
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn remaining(&self) -> Remaining {
        self.remaining
    }

    pub fn last_fired_at(&self) -> DateTime<Utc> {
        self.last_fired_at
    }

    pub fn owner(&self) -> Option<OwnerId> {
        self.owner
    }

    /// How many times the callback has run.
    pub fn fire_count(&self) -> u64 {
        self.fire_count
    }

    pub fn is_pending_removal(&self) -> bool {
        self.remaining == Remaining::PendingRemoval
    }
}

impl fmt::Debug for ScheduledTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledTask")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("interval_ms", &self.interval_ms)
            .field("remaining", &self.remaining)
            .field("last_fired_at", &self.last_fired_at)
            .field("owner", &self.owner)
            .field("fire_count", &self.fire_count)
            .finish_non_exhaustive()
    }
}

/// Partial update for [`crate::Scheduler::modify`]. Only fields that were set
/// are applied.
#[derive(Default)]
pub struct TaskUpdate {
    pub(crate) interval_ms: Option<i64>,
    pub(crate) count: Option<i64>,
    pub(crate) name: Option<String>,
    pub(crate) callback: Option<TaskCallback>,
    pub(crate) payload: Option<Payload>,
}

impl TaskUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// New interval. 0 means every tick.
    pub fn interval_ms(mut self, interval_ms: i64) -> Self {
        self.interval_ms = Some(interval_ms);
        self
    }

    /// New remaining count, using the -1 / 0 / n convention.
    pub fn count(mut self, count: i64) -> Self {
        self.count = Some(count);
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&mut TaskContext<'_>) + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    pub fn payload<P: Any>(mut self, payload: P) -> Self {
        self.payload = Some(Box::new(payload));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.interval_ms.is_none()
            && self.count.is_none()
            && self.name.is_none()
            && self.callback.is_none()
            && self.payload.is_none()
    }
}
