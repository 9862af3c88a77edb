//! Daemon composition: one scheduler, one history backend, and the built-in
//! tasks that tie them together.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use chatrelay_core::config::ChatRelayConfig;
use chatrelay_core::error::Result;
use chatrelay_core::time::TimeGate;
use chatrelay_history::{BackendRegistry, HistoryBackend, MemoryBackend};
use chatrelay_scheduler::{OwnerId, Scheduler, TickReport};

/// History backend shared between the daemon and its task callbacks.
pub type SharedHistory = Rc<RefCell<Box<dyn HistoryBackend>>>;

const HEARTBEAT_MS: i64 = 1000;

pub struct Daemon {
    scheduler: Scheduler,
    history: SharedHistory,
    owner: OwnerId,
}

impl Daemon {
    /// Select the configured history backend and register the built-in tasks.
    pub fn new(config: &ChatRelayConfig, clock: Rc<dyn TimeGate>) -> Result<Self> {
        let mut registry = BackendRegistry::new();
        registry.register(Box::new(MemoryBackend::from_config(
            &config.history,
            &config.server_name,
            clock.clone(),
        )))?;
        let history: SharedHistory = Rc::new(RefCell::new(registry.take(&config.history.backend)?));

        let mut scheduler = Scheduler::new(clock);
        let owner = scheduler.register_owner("daemon");

        let mut daemon = Self {
            scheduler,
            history,
            owner,
        };
        daemon.register_default_tasks(config)?;
        Ok(daemon)
    }

    fn register_default_tasks(&mut self, config: &ChatRelayConfig) -> Result<()> {
        let history = self.history.clone();
        let max_lines = config.history.max_lines;
        let max_age = Duration::from_secs(config.history.max_age_secs);
        self.scheduler.add(
            Some(self.owner),
            "history_retention",
            move |_ctx| {
                let evicted = history.borrow_mut().enforce_retention_all(max_lines, max_age);
                if evicted > 0 {
                    tracing::info!("🧹 Retention sweep evicted {} lines", evicted);
                }
            },
            (),
            config.history.retention_every_ms,
            0,
        )?;

        let history = self.history.clone();
        self.scheduler.add(
            Some(self.owner),
            "heartbeat",
            move |ctx| {
                let Some(beats) = ctx.payload::<u64>() else {
                    return;
                };
                *beats += 1;
                let beats = *beats;
                let store = history.borrow();
                tracing::debug!(
                    "💓 Heartbeat #{} at {}: {} targets, {} lines",
                    beats,
                    ctx.now().format("%H:%M:%S"),
                    store.object_count(),
                    store.total_lines()
                );
            },
            0u64,
            HEARTBEAT_MS,
            0,
        )?;
        Ok(())
    }

    /// One main-loop iteration.
    pub fn tick(&mut self) -> TickReport {
        let report = self.scheduler.tick();
        if report.fired > 0 || report.removed > 0 {
            tracing::trace!(
                "⏱️ Tick: {} fired, {} removed, {} scheduled",
                report.fired,
                report.removed,
                self.scheduler.task_count()
            );
        }
        report
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn history(&self) -> SharedHistory {
        self.history.clone()
    }

    /// Drop the built-in tasks. Returns how many were removed.
    pub fn shutdown(&mut self) -> usize {
        let removed = self.scheduler.release_owner(self.owner);
        tracing::info!("🛑 Daemon stopped, {} tasks released", removed);
        removed
    }
}
