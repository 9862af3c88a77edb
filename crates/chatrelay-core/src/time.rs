//! Time source used by the scheduler and the history store, plus the
//! `server-time` wire format (`YYYY-MM-DDTHH:MM:SS.mmmZ`).

use std::cell::Cell;

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};

/// Format of the `time` message tag.
pub const SERVER_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Supplies "now" and the elapsed-time predicate the scheduler ticks on.
pub trait TimeGate {
    /// Current time.
    fn now(&self) -> DateTime<Utc>;

    /// Whether at least `interval_ms` milliseconds have passed since `since`.
    fn elapsed_at_least(&self, since: DateTime<Utc>, interval_ms: u64) -> bool {
        let elapsed = self.now().signed_duration_since(since);
        elapsed.num_milliseconds() >= interval_ms as i64
    }
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl TimeGate for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock. Time only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Clock starting at `secs` seconds after the Unix epoch.
    pub fn at_unix(secs: i64) -> Self {
        Self::new(DateTime::from_timestamp(secs, 0).unwrap_or_default())
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }

    pub fn advance_ms(&self, ms: i64) {
        self.now.set(self.now.get() + TimeDelta::milliseconds(ms));
    }
}

impl TimeGate for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Render a timestamp as a `time` tag value.
pub fn format_server_time(t: DateTime<Utc>) -> String {
    t.format(SERVER_TIME_FORMAT).to_string()
}

/// Parse a `time` tag value. Accepts the exact wire shape and, failing that,
/// any RFC 3339 timestamp.
pub fn parse_server_time(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, SERVER_TIME_FORMAT) {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
