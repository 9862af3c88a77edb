//! Replay of stored lines to a recipient, framed in an IRCv3 `chathistory`
//! batch when the recipient understands batches.
//!
//! ```text
//! :server BATCH +<id> chathistory <target>
//! @batch=<id>;time=... <line>        (one per stored line)
//! :server BATCH -<id>
//! ```

use chatrelay_core::tags::{MessageTag, MessageTagSet};
use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::log::HistoryLogLine;

/// Length of generated batch identifiers.
pub const BATCH_ID_LEN: usize = 22;

/// Connection a replay is written to.
pub trait ReplayTransport {
    /// Recipient negotiated `server-time`. Without it replay is skipped.
    fn supports_server_time(&self) -> bool;

    /// Recipient negotiated `batch`.
    fn supports_batch(&self) -> bool;

    /// Write one protocol line, carrying `tags` when given.
    fn send(&mut self, tags: Option<&MessageTagSet>, line: &str);
}

/// Random alphanumeric batch reference.
pub fn generate_batch_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(BATCH_ID_LEN)
        .map(char::from)
        .collect()
}

/// Write `lines` to `recipient`. Returns the number of payload lines sent.
pub(crate) fn replay_lines<T>(
    server_name: &str,
    recipient: &mut T,
    target: &str,
    lines: &[&HistoryLogLine],
) -> usize
where
    T: ReplayTransport + ?Sized,
{
    if !recipient.supports_batch() {
        for line in lines {
            recipient.send(Some(line.tags()), line.text());
        }
        return lines.len();
    }

    let batch = generate_batch_id();
    recipient.send(None, &format!(":{server_name} BATCH +{batch} chathistory {target}"));
    for line in lines {
        let mut tags = line.tags().clone();
        tags.prepend(MessageTag::new("batch", &batch));
        recipient.send(Some(&tags), line.text());
    }
    recipient.send(None, &format!(":{server_name} BATCH -{batch}"));
    lines.len()
}
