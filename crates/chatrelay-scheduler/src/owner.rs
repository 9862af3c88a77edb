//! Task owners: registrants (plugins, subsystems) that keep track of the
//! tasks they created and of the outcome of their last request.

use std::fmt;

use crate::tasks::TaskId;

/// Handle to a registered owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(pub(crate) u32);

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "owner-{}", self.0)
    }
}

/// Outcome of the owner's most recent add/modify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerStatus {
    NoError,
    InvalidArgument,
    NotFound,
    /// The request went through after its interval was raised.
    ClampedInput { requested: i64, applied: i64 },
}

#[derive(Debug)]
pub(crate) struct OwnerRecord {
    pub(crate) name: String,
    pub(crate) status: OwnerStatus,
    pub(crate) tasks: Vec<TaskId>,
}

impl OwnerRecord {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: OwnerStatus::NoError,
            tasks: Vec::new(),
        }
    }

    pub(crate) fn forget(&mut self, id: TaskId) {
        if let Some(pos) = self.tasks.iter().position(|t| *t == id) {
            self.tasks.remove(pos);
        }
    }
}
