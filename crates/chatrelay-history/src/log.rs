//! Per-target history log: lines in arrival order plus the cached aggregate
//! fields (line count, oldest timestamp) that keep retention checks cheap.

use std::collections::VecDeque;

use chatrelay_core::tags::{MessageTag, MessageTagSet};
use chatrelay_core::time::{format_server_time, parse_server_time};
use chrono::{DateTime, Utc};

/// One stored message.
#[derive(Debug, Clone)]
pub struct HistoryLogLine {
    timestamp: DateTime<Utc>,
    tags: MessageTagSet,
    text: String,
}

impl HistoryLogLine {
    /// Build a line from caller-owned tags. The tags are copied; a `time` tag
    /// is added when the caller sent none.
    pub(crate) fn new(tags: &MessageTagSet, text: &str, now: DateTime<Utc>) -> Self {
        let mut tags = tags.clone();
        let timestamp = match tags.get("time") {
            Some(value) => parse_server_time(value).unwrap_or_else(|| {
                tracing::debug!("Unparseable time tag '{}', stamping with now", value);
                now
            }),
            None => {
                tags.prepend(MessageTag::new("time", &format_server_time(now)));
                now
            }
        };
        Self {
            timestamp,
            tags,
            text: text.to_string(),
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn tags(&self) -> &MessageTagSet {
        &self.tags
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// History of one target (channel or user).
#[derive(Debug)]
pub struct HistoryLogObject {
    name: String,
    lines: VecDeque<HistoryLogLine>,
    cached_count: usize,
    cached_oldest: Option<DateTime<Utc>>,
}

impl HistoryLogObject {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            lines: VecDeque::new(),
            cached_count: 0,
            cached_oldest: None,
        }
    }

    /// Name as first seen; lookups ignore ASCII case.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of lines held.
    pub fn len(&self) -> usize {
        self.cached_count
    }

    pub fn is_empty(&self) -> bool {
        self.cached_count == 0
    }

    /// Oldest timestamp among the lines held, `None` when empty.
    pub fn oldest_time(&self) -> Option<DateTime<Utc>> {
        self.cached_oldest
    }

    /// Lines, oldest first.
    pub fn lines(&self) -> impl DoubleEndedIterator<Item = &HistoryLogLine> + ExactSizeIterator {
        self.lines.iter()
    }

    pub(crate) fn append(&mut self, line: HistoryLogLine) {
        let t = line.timestamp;
        self.lines.push_back(line);
        self.cached_count += 1;
        if self.cached_oldest.is_none_or(|oldest| t < oldest) {
            self.cached_oldest = Some(t);
        }
    }

    /// Drop the oldest line.
    ///
    /// `cached_oldest` is left as is: the caller recomputes it once after its
    /// whole sweep.
    fn unlink_front(&mut self) -> Option<HistoryLogLine> {
        let line = self.lines.pop_front()?;
        self.cached_count -= 1;
        Some(line)
    }

    fn recompute_oldest(&mut self) {
        self.cached_oldest = self.lines.iter().map(|l| l.timestamp).min();
    }

    /// Evict every line stamped before `cutoff`. The cached oldest time is
    /// checked first, so nothing is scanned while no line is stale.
    pub(crate) fn evict_older_than(&mut self, cutoff: DateTime<Utc>) -> usize {
        if !self.cached_oldest.is_some_and(|oldest| oldest < cutoff) {
            return 0;
        }
        let before = self.lines.len();
        let mut oldest: Option<DateTime<Utc>> = None;
        self.lines.retain(|l| {
            if l.timestamp < cutoff {
                return false;
            }
            if oldest.is_none_or(|o| l.timestamp < o) {
                oldest = Some(l.timestamp);
            }
            true
        });
        self.cached_count = self.lines.len();
        self.cached_oldest = oldest;
        before - self.lines.len()
    }

    /// Evict from the oldest end until at most `max_lines` remain.
    pub(crate) fn truncate_to(&mut self, max_lines: usize) -> usize {
        let mut evicted = 0;
        while self.cached_count > max_lines {
            if self.unlink_front().is_none() {
                break;
            }
            evicted += 1;
        }
        if evicted > 0 {
            self.recompute_oldest();
        }
        evicted
    }
}
