//! Test doubles shared by the unit tests of this crate.

use chatrelay_core::tags::MessageTagSet;

use crate::replay::ReplayTransport;

/// Transport that renders every line to a string and keeps it.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    pub server_time: bool,
    pub batch: bool,
    pub sent: Vec<String>,
}

impl RecordingTransport {
    pub fn new(server_time: bool, batch: bool) -> Self {
        Self {
            server_time,
            batch,
            sent: Vec::new(),
        }
    }
}

impl ReplayTransport for RecordingTransport {
    fn supports_server_time(&self) -> bool {
        self.server_time
    }

    fn supports_batch(&self) -> bool {
        self.batch
    }

    fn send(&mut self, tags: Option<&MessageTagSet>, line: &str) {
        let prefix = tags.map(|t| t.to_prefix()).unwrap_or_default();
        self.sent.push(format!("{prefix}{line}"));
    }
}
