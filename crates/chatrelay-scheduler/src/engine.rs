//! Scheduler engine: owns the task list and fires due tasks on every tick.
//!
//! The engine never sleeps; the daemon's main loop calls [`Scheduler::tick`]
//! once per iteration. Removal while a tick walks the list goes through a
//! [`Cursor`] that keeps pointing at the follower of the removed task, so the
//! walk neither skips nor revisits anything.

use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;

use chatrelay_core::error::{RelayError, Result};
use chatrelay_core::time::TimeGate;

use crate::owner::{OwnerId, OwnerRecord, OwnerStatus};
use crate::tasks::{
    MIN_INTERVAL_MS, Remaining, ScheduledTask, TaskContext, TaskId, TaskUpdate,
};

/// What one tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub fired: usize,
    pub removed: usize,
}

/// Index into the task list. Unlinking the task under the cursor leaves the
/// cursor on that task's follower.
#[derive(Debug, Clone, Copy)]
struct Cursor(usize);

impl Cursor {
    fn start() -> Self {
        Cursor(0)
    }

    fn advance(&mut self) {
        self.0 += 1;
    }
}

/// The scheduler. Owns the tasks and fires them.
pub struct Scheduler {
    tasks: Vec<ScheduledTask>,
    owners: HashMap<OwnerId, OwnerRecord>,
    clock: Rc<dyn TimeGate>,
    next_task_id: u64,
    next_owner_id: u32,
}

impl Scheduler {
    /// Create an empty scheduler driven by `clock`.
    pub fn new(clock: Rc<dyn TimeGate>) -> Self {
        Self {
            tasks: Vec::new(),
            owners: HashMap::new(),
            clock,
            next_task_id: 1,
            next_owner_id: 1,
        }
    }

    // ─── Owners ───────────────────────────────────────────────

    /// Register a task owner.
    pub fn register_owner(&mut self, name: &str) -> OwnerId {
        let id = OwnerId(self.next_owner_id);
        self.next_owner_id += 1;
        self.owners.insert(id, OwnerRecord::new(name));
        id
    }

    /// Outcome of the owner's last add/modify.
    pub fn owner_status(&self, owner: OwnerId) -> Option<&OwnerStatus> {
        self.owners.get(&owner).map(|o| &o.status)
    }

    /// Tasks currently registered by `owner`, oldest first.
    pub fn owner_tasks(&self, owner: OwnerId) -> &[TaskId] {
        self.owners
            .get(&owner)
            .map(|o| o.tasks.as_slice())
            .unwrap_or(&[])
    }

    /// Remove every task of `owner`, then forget the owner.
    /// Returns how many tasks were removed.
    pub fn release_owner(&mut self, owner: OwnerId) -> usize {
        let ids = self.owner_tasks(owner).to_vec();
        let mut removed = 0;
        for id in ids {
            if self.remove(id).is_ok() {
                removed += 1;
            }
        }
        if let Some(record) = self.owners.remove(&owner) {
            tracing::info!("👋 Owner released: '{}' ({} tasks)", record.name, removed);
        }
        removed
    }

    fn owner_name(&self, owner: Option<OwnerId>) -> &str {
        owner
            .and_then(|o| self.owners.get(&o))
            .map(|o| o.name.as_str())
            .unwrap_or("???")
    }

    fn set_owner_status(&mut self, owner: Option<OwnerId>, status: OwnerStatus) {
        if let Some(record) = owner.and_then(|o| self.owners.get_mut(&o)) {
            record.status = status;
        }
    }

    fn clamp_interval(&self, owner: Option<OwnerId>, requested: i64) -> (u64, OwnerStatus) {
        if requested < MIN_INTERVAL_MS as i64 {
            tracing::warn!(
                "⚠️ Task interval from {} is suspiciously low ({}ms), raised to {}ms",
                self.owner_name(owner),
                requested,
                MIN_INTERVAL_MS
            );
            (
                MIN_INTERVAL_MS,
                OwnerStatus::ClampedInput {
                    requested,
                    applied: MIN_INTERVAL_MS as i64,
                },
            )
        } else {
            (requested as u64, OwnerStatus::NoError)
        }
    }

    fn reject(&mut self, owner: Option<OwnerId>, reason: String) -> RelayError {
        tracing::warn!("⚠️ Task request from {} rejected: {}", self.owner_name(owner), reason);
        self.set_owner_status(owner, OwnerStatus::InvalidArgument);
        RelayError::InvalidArgument(reason)
    }

    // ─── Tasks ────────────────────────────────────────────────

    /// Add a task that runs `callback` with `payload` every `interval_ms`
    /// milliseconds, `count` times (0 = forever).
    ///
    /// Intervals under 100ms are raised to 100ms; the owner sees a
    /// [`OwnerStatus::ClampedInput`] status but the task is created.
    pub fn add<F, P>(
        &mut self,
        owner: Option<OwnerId>,
        name: &str,
        callback: F,
        payload: P,
        interval_ms: i64,
        count: i64,
    ) -> Result<TaskId>
    where
        F: FnMut(&mut TaskContext<'_>) + 'static,
        P: Any,
    {
        if let Some(o) = owner {
            if !self.owners.contains_key(&o) {
                return Err(RelayError::NotFound(format!("{o}")));
            }
        }
        if name.is_empty() {
            return Err(self.reject(owner, "task name is empty".into()));
        }
        if interval_ms < 0 {
            return Err(self.reject(owner, format!("interval {interval_ms}ms is negative")));
        }
        if count < 0 {
            return Err(self.reject(owner, format!("count {count} is negative")));
        }
        let remaining = match Remaining::from_count(count) {
            Ok(r) => r,
            Err(e) => return Err(self.reject(owner, e.to_string())),
        };
        let (interval_ms, status) = self.clamp_interval(owner, interval_ms);

        let id = TaskId(self.next_task_id);
        self.next_task_id += 1;
        self.tasks.push(ScheduledTask {
            id,
            name: name.to_string(),
            interval_ms,
            remaining,
            last_fired_at: self.clock.now(),
            callback: Box::new(callback),
            payload: Box::new(payload),
            owner,
            fire_count: 0,
        });
        if let Some(record) = owner.and_then(|o| self.owners.get_mut(&o)) {
            record.tasks.push(id);
            record.status = status;
        }
        tracing::info!("📅 Task added: '{}' ({}, every {}ms)", name, id, interval_ms);
        Ok(id)
    }

    /// Flag a task for removal on the next tick. Safe to use on the task
    /// whose callback is running.
    pub fn mark_for_removal(&mut self, id: TaskId) -> Result<()> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| RelayError::NotFound(format!("{id}")))?;
        task.remaining = Remaining::PendingRemoval;
        Ok(())
    }

    /// Remove a task now. Returns the task that followed it, so a caller
    /// walking the list can resume there.
    pub fn remove(&mut self, id: TaskId) -> Result<Option<TaskId>> {
        let idx = self
            .position(id)
            .ok_or_else(|| RelayError::NotFound(format!("{id}")))?;
        let cursor = self.unlink(Cursor(idx));
        Ok(self.tasks.get(cursor.0).map(|t| t.id))
    }

    /// First task called `name`, in list order. Tasks are appended, so this is
    /// the earliest registered of any duplicates.
    pub fn find(&self, name: &str) -> Option<TaskId> {
        self.tasks.iter().find(|t| t.name == name).map(|t| t.id)
    }

    /// Apply the fields set in `update`. Nothing changes if any field is
    /// invalid.
    pub fn modify(&mut self, id: TaskId, update: TaskUpdate) -> Result<()> {
        let idx = self
            .position(id)
            .ok_or_else(|| RelayError::NotFound(format!("{id}")))?;
        let owner = self.tasks[idx].owner;
        if update.is_empty() {
            return Err(self.reject(owner, "empty task update".into()));
        }

        let mut status = OwnerStatus::NoError;
        let interval_ms = match update.interval_ms {
            None => None,
            Some(ms) if ms < 0 => {
                return Err(self.reject(owner, format!("interval {ms}ms is negative")));
            }
            Some(0) => Some(0),
            Some(ms) => {
                let (applied, clamp_status) = self.clamp_interval(owner, ms);
                status = clamp_status;
                Some(applied)
            }
        };
        let remaining = match update.count.map(Remaining::from_count).transpose() {
            Ok(r) => r,
            Err(e) => return Err(self.reject(owner, e.to_string())),
        };
        if update.name.as_deref() == Some("") {
            return Err(self.reject(owner, "task name is empty".into()));
        }

        let task = &mut self.tasks[idx];
        if let Some(ms) = interval_ms {
            task.interval_ms = ms;
        }
        if let Some(r) = remaining {
            task.remaining = r;
        }
        if let Some(name) = update.name {
            task.name = name;
        }
        if let Some(callback) = update.callback {
            task.callback = callback;
        }
        if let Some(payload) = update.payload {
            task.payload = payload;
        }
        tracing::debug!("✏️ Task modified: '{}' ({})", task.name, task.id);
        self.set_owner_status(owner, status);
        Ok(())
    }

    /// Walk the list once, dropping tasks flagged for removal and
    /// firing the ones that are due.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();
        let mut removals: Vec<TaskId> = Vec::new();
        let now = self.clock.now();
        let mut cursor = Cursor::start();

        while cursor.0 < self.tasks.len() {
            if self.tasks[cursor.0].is_pending_removal() {
                cursor = self.unlink(cursor);
                report.removed += 1;
                continue;
            }

            let task = &mut self.tasks[cursor.0];
            let due = task.interval_ms == 0
                || self.clock.elapsed_at_least(task.last_fired_at, task.interval_ms);
            if !due {
                cursor.advance();
                continue;
            }

            tracing::trace!("🔔 Task fired: '{}' ({})", task.name, task.id);
            {
                let ScheduledTask {
                    id,
                    name,
                    callback,
                    payload,
                    ..
                } = &mut *task;
                let mut ctx = TaskContext {
                    id: *id,
                    name: name.as_str(),
                    now,
                    payload: &mut **payload,
                    removals: &mut removals,
                };
                callback(&mut ctx);
            }
            task.last_fired_at = now;
            task.fire_count += 1;
            report.fired += 1;

            for id in removals.drain(..) {
                if let Some(t) = self.tasks.iter_mut().find(|t| t.id == id) {
                    t.remaining = Remaining::PendingRemoval;
                }
            }

            let task = &mut self.tasks[cursor.0];
            if let Remaining::Times(n) = task.remaining {
                let left = n.saturating_sub(1);
                if left == 0 {
                    cursor = self.unlink(cursor);
                    report.removed += 1;
                    continue;
                }
                task.remaining = Remaining::Times(left);
            }
            cursor.advance();
        }

        report
    }

    /// Unlink the task under `cursor`; the returned cursor points at its
    /// follower.
    fn unlink(&mut self, cursor: Cursor) -> Cursor {
        let task = self.tasks.remove(cursor.0);
        if let Some(record) = task.owner.and_then(|o| self.owners.get_mut(&o)) {
            record.forget(task.id);
        }
        tracing::info!("🗑️ Task removed: '{}' ({})", task.name, task.id);
        cursor
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// Look up a task.
    pub fn get(&self, id: TaskId) -> Option<&ScheduledTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// All tasks, in list order.
    pub fn tasks(&self) -> impl Iterator<Item = &ScheduledTask> {
        self.tasks.iter()
    }

    /// Get task count.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatrelay_core::time::ManualClock;
    use std::cell::{Cell, RefCell};

    fn scheduler() -> (Scheduler, Rc<ManualClock>) {
        let clock = Rc::new(ManualClock::at_unix(1_000_000));
        (Scheduler::new(clock.clone()), clock)
    }

    fn counter() -> Rc<Cell<u32>> {
        Rc::new(Cell::new(0))
    }

    fn bump(c: &Rc<Cell<u32>>) -> impl FnMut(&mut TaskContext<'_>) + 'static {
        let c = c.clone();
        move |_| c.set(c.get() + 1)
    }

    /// Record firing order by task name.
    fn log_into(log: &Rc<RefCell<Vec<String>>>) -> impl FnMut(&mut TaskContext<'_>) + 'static {
        let log = log.clone();
        move |ctx| log.borrow_mut().push(ctx.name().to_string())
    }

    #[test]
    fn test_add_and_find() {
        let (mut sched, _) = scheduler();
        let id = sched.add(None, "check_pings", |_| {}, (), 1000, 0).unwrap();
        assert_eq!(sched.task_count(), 1);
        assert_eq!(sched.find("check_pings"), Some(id));
        assert_eq!(sched.find("missing"), None);
        let task = sched.get(id).unwrap();
        assert_eq!(task.interval_ms(), 1000);
        assert_eq!(task.remaining(), Remaining::Forever);
    }

    #[test]
    fn test_find_returns_first_match() {
        let (mut sched, _) = scheduler();
        let first = sched.add(None, "dup", |_| {}, (), 500, 0).unwrap();
        let _second = sched.add(None, "dup", |_| {}, (), 500, 0).unwrap();
        assert_eq!(sched.find("dup"), Some(first));
    }

    #[test]
    fn test_add_rejects_invalid_arguments() {
        let (mut sched, _) = scheduler();
        let owner = sched.register_owner("m_test");

        let err = sched.add(Some(owner), "", |_| {}, (), 1000, 0).unwrap_err();
        assert!(matches!(err, RelayError::InvalidArgument(_)));
        assert_eq!(sched.owner_status(owner), Some(&OwnerStatus::InvalidArgument));

        assert!(sched.add(Some(owner), "x", |_| {}, (), -1, 0).is_err());
        assert!(sched.add(Some(owner), "x", |_| {}, (), 1000, -1).is_err());

        assert!(sched.is_empty());
        assert!(sched.owner_tasks(owner).is_empty());
    }

    #[test]
    fn test_add_with_unknown_owner() {
        let (mut sched, _) = scheduler();
        let owner = sched.register_owner("gone");
        sched.release_owner(owner);
        let err = sched.add(Some(owner), "x", |_| {}, (), 1000, 0).unwrap_err();
        assert!(matches!(err, RelayError::NotFound(_)));
    }

    #[test]
    fn test_interval_clamped_to_minimum() {
        let (mut sched, _) = scheduler();
        let owner = sched.register_owner("m_fast");
        let id = sched.add(Some(owner), "fast", |_| {}, (), 50, 0).unwrap();
        assert_eq!(sched.get(id).unwrap().interval_ms(), 100);
        assert_eq!(
            sched.owner_status(owner),
            Some(&OwnerStatus::ClampedInput {
                requested: 50,
                applied: 100
            })
        );

        sched.add(Some(owner), "slow", |_| {}, (), 5000, 0).unwrap();
        assert_eq!(sched.owner_status(owner), Some(&OwnerStatus::NoError));
    }

    #[test]
    fn test_add_zero_interval_is_clamped() {
        let (mut sched, _) = scheduler();
        let owner = sched.register_owner("m_zero");
        let id = sched.add(Some(owner), "zero", |_| {}, (), 0, 0).unwrap();
        assert_eq!(sched.get(id).unwrap().interval_ms(), 100);
        assert_eq!(
            sched.owner_status(owner),
            Some(&OwnerStatus::ClampedInput {
                requested: 0,
                applied: 100
            })
        );
    }

    #[test]
    fn test_modify_clamps_low_interval_but_keeps_zero() {
        let (mut sched, _) = scheduler();
        let owner = sched.register_owner("m_tune");
        let id = sched.add(Some(owner), "tune", |_| {}, (), 1000, 0).unwrap();

        sched.modify(id, TaskUpdate::new().interval_ms(50)).unwrap();
        assert_eq!(sched.get(id).unwrap().interval_ms(), 100);
        assert_eq!(
            sched.owner_status(owner),
            Some(&OwnerStatus::ClampedInput {
                requested: 50,
                applied: 100
            })
        );

        sched.modify(id, TaskUpdate::new().interval_ms(0)).unwrap();
        assert_eq!(sched.get(id).unwrap().interval_ms(), 0);
        assert_eq!(sched.owner_status(owner), Some(&OwnerStatus::NoError));
    }

    #[test]
    fn test_find_returns_earliest_registered() {
        let (mut sched, _) = scheduler();
        let first = sched.add(None, "dup", |_| {}, (), 1000, 0).unwrap();
        let second = sched.add(None, "dup", |_| {}, (), 1000, 0).unwrap();
        assert_eq!(sched.find("dup"), Some(first));
        sched.remove(first).unwrap();
        assert_eq!(sched.find("dup"), Some(second));
    }

    #[test]
    fn test_interval_is_a_lower_bound() {
        let (mut sched, clock) = scheduler();
        let hits = counter();
        sched.add(None, "loop", bump(&hits), (), 1000, 0).unwrap();

        clock.advance_ms(999);
        assert_eq!(sched.tick().fired, 0);
        clock.advance_ms(1);
        assert_eq!(sched.tick().fired, 1);
        assert_eq!(sched.tick().fired, 0);
        clock.advance_ms(2500);
        assert_eq!(sched.tick().fired, 1);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_zero_interval_fires_every_tick() {
        let (mut sched, _) = scheduler();
        let hits = counter();
        let id = sched.add(None, "busy", bump(&hits), (), 1000, 0).unwrap();
        sched.modify(id, TaskUpdate::new().interval_ms(0)).unwrap();
        assert_eq!(sched.get(id).unwrap().interval_ms(), 0);

        for _ in 0..5 {
            sched.tick();
        }
        assert_eq!(hits.get(), 5);
    }

    #[test]
    fn test_count_task_removed_after_n_fires() {
        let (mut sched, clock) = scheduler();
        let hits = counter();
        let id = sched.add(None, "thrice", bump(&hits), (), 100, 3).unwrap();

        for _ in 0..6 {
            clock.advance_ms(100);
            sched.tick();
        }
        assert_eq!(hits.get(), 3);
        assert_eq!(sched.find("thrice"), None);
        assert!(sched.get(id).is_none());
        assert!(sched.is_empty());
    }

    #[test]
    fn test_count_expiry_does_not_skip_next_task() {
        let (mut sched, clock) = scheduler();
        let log = Rc::new(RefCell::new(Vec::new()));
        sched.add(None, "a", log_into(&log), (), 100, 1).unwrap();
        sched.add(None, "b", log_into(&log), (), 100, 0).unwrap();
        sched.add(None, "c", log_into(&log), (), 100, 0).unwrap();

        clock.advance_ms(100);
        let report = sched.tick();
        assert_eq!(report, TickReport { fired: 3, removed: 1 });
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        let names: Vec<_> = sched.tasks().map(|t| t.name().to_string()).collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn test_mark_for_removal_does_not_skip_next_task() {
        let (mut sched, clock) = scheduler();
        let log = Rc::new(RefCell::new(Vec::new()));
        sched.add(None, "a", log_into(&log), (), 100, 0).unwrap();
        let b = sched.add(None, "b", log_into(&log), (), 100, 0).unwrap();
        sched.add(None, "c", log_into(&log), (), 100, 0).unwrap();

        sched.mark_for_removal(b).unwrap();
        assert!(sched.get(b).unwrap().is_pending_removal());

        clock.advance_ms(100);
        let report = sched.tick();
        assert_eq!(report.removed, 1);
        assert_eq!(*log.borrow(), vec!["a", "c"]);
        assert!(sched.get(b).is_none());

        clock.advance_ms(100);
        assert_eq!(sched.tick(), TickReport { fired: 2, removed: 0 });
    }

    #[test]
    fn test_callback_can_remove_itself() {
        let (mut sched, clock) = scheduler();
        let hits = counter();
        let h = hits.clone();
        let id = sched
            .add(
                None,
                "once",
                move |ctx: &mut TaskContext<'_>| {
                    h.set(h.get() + 1);
                    ctx.mark_for_removal();
                },
                (),
                100,
                0,
            )
            .unwrap();

        clock.advance_ms(100);
        assert_eq!(sched.tick(), TickReport { fired: 1, removed: 0 });
        assert!(sched.get(id).unwrap().is_pending_removal());

        clock.advance_ms(100);
        assert_eq!(sched.tick(), TickReport { fired: 0, removed: 1 });
        assert_eq!(hits.get(), 1);
        assert!(sched.is_empty());
    }

    #[test]
    fn test_callback_marks_later_task() {
        let (mut sched, clock) = scheduler();
        let hits = counter();
        let victim = Rc::new(Cell::new(None));
        let v = victim.clone();
        sched
            .add(
                None,
                "killer",
                move |ctx: &mut TaskContext<'_>| {
                    if let Some(id) = v.get() {
                        ctx.mark_task_for_removal(id);
                    }
                },
                (),
                100,
                0,
            )
            .unwrap();
        let target = sched.add(None, "victim", bump(&hits), (), 100, 0).unwrap();
        victim.set(Some(target));

        clock.advance_ms(100);
        let report = sched.tick();
        assert_eq!(report, TickReport { fired: 1, removed: 1 });
        assert_eq!(hits.get(), 0);
        assert_eq!(sched.task_count(), 1);
    }

    #[test]
    fn test_remove_returns_follower() {
        let (mut sched, _) = scheduler();
        let a = sched.add(None, "a", |_| {}, (), 100, 0).unwrap();
        let b = sched.add(None, "b", |_| {}, (), 100, 0).unwrap();
        let c = sched.add(None, "c", |_| {}, (), 100, 0).unwrap();

        assert_eq!(sched.remove(b).unwrap(), Some(c));
        assert_eq!(sched.remove(c).unwrap(), None);
        assert!(matches!(sched.remove(b), Err(RelayError::NotFound(_))));
        assert_eq!(sched.tasks().map(|t| t.id()).collect::<Vec<_>>(), vec![a]);
    }

    #[test]
    fn test_modify_partial_update() {
        let (mut sched, _) = scheduler();
        let id = sched.add(None, "old", |_| {}, (), 2000, 0).unwrap();
        sched
            .modify(id, TaskUpdate::new().name("new").count(4))
            .unwrap();
        let task = sched.get(id).unwrap();
        assert_eq!(task.name(), "new");
        assert_eq!(task.remaining(), Remaining::Times(4));
        assert_eq!(task.interval_ms(), 2000);
        assert_eq!(sched.find("old"), None);
    }

    #[test]
    fn test_modify_rejects_bad_requests_without_partial_effect() {
        let (mut sched, _) = scheduler();
        let owner = sched.register_owner("m_mod");
        let id = sched.add(Some(owner), "t", |_| {}, (), 2000, 0).unwrap();

        let err = sched.modify(id, TaskUpdate::new()).unwrap_err();
        assert!(matches!(err, RelayError::InvalidArgument(_)));

        let err = sched
            .modify(id, TaskUpdate::new().name("renamed").interval_ms(-5))
            .unwrap_err();
        assert!(matches!(err, RelayError::InvalidArgument(_)));
        assert_eq!(sched.get(id).unwrap().name(), "t");
        assert_eq!(sched.owner_status(owner), Some(&OwnerStatus::InvalidArgument));

        sched.remove(id).unwrap();
        let err = sched.modify(id, TaskUpdate::new().count(1)).unwrap_err();
        assert!(matches!(err, RelayError::NotFound(_)));
    }

    #[test]
    fn test_modify_replaces_callback_and_payload() {
        let (mut sched, clock) = scheduler();
        let seen = Rc::new(Cell::new(0u32));
        let id = sched.add(None, "p", |_| {}, 1u32, 100, 0).unwrap();

        let s = seen.clone();
        sched
            .modify(
                id,
                TaskUpdate::new()
                    .payload(41u32)
                    .callback(move |ctx: &mut TaskContext<'_>| {
                        if let Some(v) = ctx.payload::<u32>() {
                            *v += 1;
                            s.set(*v);
                        }
                    }),
            )
            .unwrap();

        clock.advance_ms(100);
        sched.tick();
        assert_eq!(seen.get(), 42);
        clock.advance_ms(100);
        sched.tick();
        assert_eq!(seen.get(), 43);
    }

    #[test]
    fn test_payload_wrong_type_is_none() {
        let (mut sched, clock) = scheduler();
        let checked = Rc::new(Cell::new(false));
        let c = checked.clone();
        sched
            .add(
                None,
                "typed",
                move |ctx: &mut TaskContext<'_>| {
                    c.set(ctx.payload::<String>().is_none() && ctx.payload::<u8>().is_some());
                },
                7u8,
                100,
                0,
            )
            .unwrap();
        clock.advance_ms(100);
        sched.tick();
        assert!(checked.get());
    }

    #[test]
    fn test_owner_bookkeeping() {
        let (mut sched, _) = scheduler();
        let owner = sched.register_owner("m_history");
        let a = sched.add(Some(owner), "a", |_| {}, (), 1000, 0).unwrap();
        let b = sched.add(Some(owner), "b", |_| {}, (), 1000, 0).unwrap();
        sched.add(None, "core", |_| {}, (), 1000, 0).unwrap();
        assert_eq!(sched.owner_tasks(owner), &[a, b]);

        sched.remove(a).unwrap();
        assert_eq!(sched.owner_tasks(owner), &[b]);

        assert_eq!(sched.release_owner(owner), 1);
        assert_eq!(sched.task_count(), 1);
        assert!(sched.owner_status(owner).is_none());
        assert!(sched.owner_tasks(owner).is_empty());
    }

    #[test]
    fn test_last_fired_at_updates() {
        let (mut sched, clock) = scheduler();
        let id = sched.add(None, "t", |_| {}, (), 100, 0).unwrap();
        let created = sched.get(id).unwrap().last_fired_at();
        clock.advance_ms(150);
        sched.tick();
        let task = sched.get(id).unwrap();
        assert_eq!(task.last_fired_at(), clock.now());
        assert!(task.last_fired_at() > created);
        assert_eq!(task.fire_count(), 1);
    }
}
