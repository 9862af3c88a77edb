//! In-memory history backend.
//!
//! Every log caches its line count and oldest timestamp, so the frequent
//! "drop anything older than T" and "keep only N lines" sweeps return
//! immediately when there is nothing to drop.

use std::rc::Rc;
use std::time::Duration;

use chatrelay_core::config::HistoryConfig;
use chatrelay_core::tags::MessageTagSet;
use chatrelay_core::time::{SystemClock, TimeGate};
use chrono::{DateTime, TimeDelta, Utc};

use crate::backend::HistoryBackend;
use crate::filter::HistoryFilter;
use crate::index::{DEFAULT_BUCKETS, HashIndex};
use crate::log::{HistoryLogLine, HistoryLogObject};
use crate::replay::{ReplayTransport, replay_lines};

/// In-memory history store.
pub struct MemoryBackend {
    index: HashIndex,
    clock: Rc<dyn TimeGate>,
    server_name: String,
}

impl MemoryBackend {
    pub const NAME: &'static str = "mem";

    /// Create an empty store. `server_name` is the source of BATCH lines.
    pub fn new(clock: Rc<dyn TimeGate>, server_name: &str, buckets: usize) -> Self {
        Self {
            index: HashIndex::new(buckets),
            clock,
            server_name: server_name.to_string(),
        }
    }

    pub fn from_config(config: &HistoryConfig, server_name: &str, clock: Rc<dyn TimeGate>) -> Self {
        Self::new(clock, server_name, config.hash_buckets)
    }

    /// Create with the wall clock and the default bucket count.
    pub fn with_defaults(server_name: &str) -> Self {
        Self::new(Rc::new(SystemClock), server_name, DEFAULT_BUCKETS)
    }

    /// Number of targets with a log.
    pub fn object_count(&self) -> usize {
        self.index.len()
    }

    /// Total lines across every target.
    pub fn total_lines(&self) -> usize {
        self.index.iter().map(|o| o.len()).sum()
    }

    pub fn get(&self, target: &str) -> Option<&HistoryLogObject> {
        self.index.get(target)
    }

    /// Lines held for `target`; 0 when it has no log.
    pub fn line_count(&self, target: &str) -> usize {
        self.index.get(target).map_or(0, |o| o.len())
    }

    pub fn oldest_time(&self, target: &str) -> Option<DateTime<Utc>> {
        self.index.get(target).and_then(|o| o.oldest_time())
    }

    /// Names of every target with a log, in no particular order.
    pub fn targets(&self) -> Vec<&str> {
        self.index.iter().map(|o| o.name()).collect()
    }

    fn cutoff(&self, max_age: Duration) -> Option<DateTime<Utc>> {
        let age = TimeDelta::from_std(max_age).ok()?;
        self.clock.now().checked_sub_signed(age)
    }

    fn enforce_on(obj: &mut HistoryLogObject, cutoff: Option<DateTime<Utc>>, max_lines: usize) -> usize {
        let mut evicted = 0;
        if let Some(cutoff) = cutoff {
            evicted += obj.evict_older_than(cutoff);
        }
        evicted + obj.truncate_to(max_lines)
    }
}

impl HistoryBackend for MemoryBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn add_line(&mut self, target: &str, tags: &MessageTagSet, text: &str) {
        let line = HistoryLogLine::new(tags, text, self.clock.now());
        self.index.get_or_create(target).append(line);
    }

    fn enforce_retention(&mut self, target: &str, max_lines: usize, max_age: Duration) -> bool {
        let cutoff = self.cutoff(max_age);
        let Some(obj) = self.index.get_mut(target) else {
            return false;
        };
        let evicted = Self::enforce_on(obj, cutoff, max_lines);
        if evicted > 0 {
            tracing::debug!("🧹 History {}: evicted {} lines, {} left", obj.name(), evicted, obj.len());
        }
        true
    }

    fn enforce_retention_all(&mut self, max_lines: usize, max_age: Duration) -> usize {
        let cutoff = self.cutoff(max_age);
        let evicted: usize = self
            .index
            .iter_mut()
            .map(|obj| Self::enforce_on(obj, cutoff, max_lines))
            .sum();
        if evicted > 0 {
            tracing::debug!("🧹 History sweep: evicted {} lines across {} targets", evicted, self.index.len());
        }
        evicted
    }

    fn replay(
        &self,
        recipient: &mut dyn ReplayTransport,
        target: &str,
        filter: &HistoryFilter,
    ) -> usize {
        let Some(obj) = self.index.get(target) else {
            return 0;
        };
        if !recipient.supports_server_time() {
            return 0;
        }
        let lines = filter.select(obj.lines(), self.clock.now());
        let sent = replay_lines(&self.server_name, recipient, target, &lines);
        tracing::debug!("📤 Replayed {} lines of {}", sent, target);
        sent
    }

    fn destroy(&mut self, target: &str) -> bool {
        match self.index.remove(target) {
            Some(obj) => {
                tracing::info!("🗑️ History destroyed: {} ({} lines)", obj.name(), obj.len());
                true
            }
            None => false,
        }
    }

    fn object_count(&self) -> usize {
        MemoryBackend::object_count(self)
    }

    fn line_count(&self, target: &str) -> usize {
        MemoryBackend::line_count(self, target)
    }

    fn total_lines(&self) -> usize {
        MemoryBackend::total_lines(self)
    }
}
