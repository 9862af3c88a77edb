//! History backend seam and the registry backends are looked up in.

use std::time::Duration;

use chatrelay_core::error::{RelayError, Result};
use chatrelay_core::tags::MessageTagSet;

use crate::filter::HistoryFilter;
use crate::replay::ReplayTransport;

/// Operations every history backend provides.
///
/// Unknown targets are never an error: "no history yet" is the normal state
/// of a fresh channel, so those calls report `false` / `0` instead.
pub trait HistoryBackend {
    /// Name configs refer to this backend by.
    fn name(&self) -> &str;

    /// Record a line for `target`, creating its log on first use.
    fn add_line(&mut self, target: &str, tags: &MessageTagSet, text: &str);

    /// Apply the age limit, then the line limit. `false` when `target` has no
    /// log.
    fn enforce_retention(&mut self, target: &str, max_lines: usize, max_age: Duration) -> bool;

    /// Apply the limits to every target. Returns the number of evicted lines.
    fn enforce_retention_all(&mut self, max_lines: usize, max_age: Duration) -> usize;

    /// Send the stored lines of `target` that pass `filter`. Returns the
    /// number of payload lines written.
    fn replay(
        &self,
        recipient: &mut dyn ReplayTransport,
        target: &str,
        filter: &HistoryFilter,
    ) -> usize;

    /// Drop the whole log of `target`. `false` when it had none.
    fn destroy(&mut self, target: &str) -> bool;

    /// Number of targets with a log.
    fn object_count(&self) -> usize;

    /// Lines held for `target`; 0 when it has no log.
    fn line_count(&self, target: &str) -> usize;

    /// Lines held across every target.
    fn total_lines(&self) -> usize;
}

/// Backends available to the daemon, by name.
#[derive(Default)]
pub struct BackendRegistry {
    backends: Vec<Box<dyn HistoryBackend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend. Names must be unique.
    pub fn register(&mut self, backend: Box<dyn HistoryBackend>) -> Result<()> {
        if self.get(backend.name()).is_some() {
            return Err(RelayError::InvalidArgument(format!(
                "history backend '{}' already registered",
                backend.name()
            )));
        }
        tracing::info!("📚 History backend registered: {}", backend.name());
        self.backends.push(backend);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn HistoryBackend> {
        self.backends
            .iter()
            .find(|b| b.name() == name)
            .map(|b| b.as_ref())
    }

    /// Hand ownership of a backend to the caller.
    pub fn take(&mut self, name: &str) -> Result<Box<dyn HistoryBackend>> {
        let idx = self
            .backends
            .iter()
            .position(|b| b.name() == name)
            .ok_or_else(|| RelayError::NotFound(format!("history backend '{name}'")))?;
        Ok(self.backends.remove(idx))
    }

    pub fn names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }
}
