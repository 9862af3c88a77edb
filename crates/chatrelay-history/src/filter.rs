//! Replay filter: which stored lines a recipient gets.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};

use crate::log::HistoryLogLine;

type LinePredicate = Box<dyn Fn(DateTime<Utc>, &str) -> bool>;

/// Selection applied before replay. The default selects everything.
///
/// `predicate` and `last_seconds` decide which lines qualify; `last_lines`
/// then keeps only the newest of those.
#[derive(Default)]
pub struct HistoryFilter {
    pub last_lines: Option<usize>,
    pub last_seconds: Option<u64>,
    predicate: Option<LinePredicate>,
}

impl HistoryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_lines(mut self, n: usize) -> Self {
        self.last_lines = Some(n);
        self
    }

    pub fn last_seconds(mut self, secs: u64) -> Self {
        self.last_seconds = Some(secs);
        self
    }

    /// Only lines for which `f(timestamp, text)` holds.
    pub fn matching<F>(mut self, f: F) -> Self
    where
        F: Fn(DateTime<Utc>, &str) -> bool + 'static,
    {
        self.predicate = Some(Box::new(f));
        self
    }

    fn accepts(&self, line: &HistoryLogLine, not_before: Option<DateTime<Utc>>) -> bool {
        if not_before.is_some_and(|nb| line.timestamp() < nb) {
            return false;
        }
        self.predicate
            .as_ref()
            .is_none_or(|p| p(line.timestamp(), line.text()))
    }

    /// Pick the lines to replay, oldest first.
    pub(crate) fn select<'a, I>(&self, lines: I, now: DateTime<Utc>) -> Vec<&'a HistoryLogLine>
    where
        I: Iterator<Item = &'a HistoryLogLine>,
    {
        let not_before = self
            .last_seconds
            .and_then(|s| i64::try_from(s).ok())
            .and_then(TimeDelta::try_seconds)
            .and_then(|d| now.checked_sub_signed(d));
        let mut picked: Vec<_> = lines.filter(|l| self.accepts(l, not_before)).collect();
        if let Some(n) = self.last_lines {
            let excess = picked.len().saturating_sub(n);
            picked.drain(..excess);
        }
        picked
    }
}

impl fmt::Debug for HistoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryFilter")
            .field("last_lines", &self.last_lines)
            .field("last_seconds", &self.last_seconds)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}
