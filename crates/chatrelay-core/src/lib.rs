//! # ChatRelay Core
//!
//! Types shared by the scheduler and the history store: configuration,
//! the error taxonomy, the time source and message tags.

pub mod config;
pub mod error;
pub mod tags;
pub mod time;

pub use config::{ChatRelayConfig, HistoryConfig, SchedulerConfig};
pub use error::{RelayError, Result};
pub use tags::{MessageTag, MessageTagSet};
pub use time::{ManualClock, SystemClock, TimeGate};
