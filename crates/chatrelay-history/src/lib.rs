//! # ChatRelay History
//! Per-target message history with retention and replay.
//!
//! ## Design Principles
//! - **Cheap retention**: every log caches its line count and oldest timestamp
//! - **Case-insensitive targets**: `#Chat` and `#chat` share one log
//! - **Pluggable**: backends sit behind the [`HistoryBackend`] trait
//!
//! ## Architecture
//! ```text
//! add_line ──▶ HashIndex ──▶ HistoryLogObject ──▶ VecDeque<HistoryLogLine>
//!                                  │
//!        enforce_retention ────────┤  (age pass, then line-count pass)
//!                                  │
//!        replay ── HistoryFilter ──┴──▶ ReplayTransport (BATCH framing)
//! ```

pub mod backend;
pub mod filter;
pub mod index;
pub mod log;
pub mod memory;
pub mod replay;

#[cfg(test)]
pub(crate) mod test_support;

pub use backend::{BackendRegistry, HistoryBackend};
pub use filter::HistoryFilter;
pub use index::{DEFAULT_BUCKETS, HashIndex};
pub use log::{HistoryLogLine, HistoryLogObject};
pub use memory::MemoryBackend;
pub use replay::{BATCH_ID_LEN, ReplayTransport, generate_batch_id};
