// Copyright (c) 2025 - Cowboy AI, Inc.
//! Results of the linking operations

use serde::{Deserialize, Serialize};

/// Result of linking two ports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkOutcome {
    /// A link row was inserted or rewired
    Linked,
    /// The port was already linked to the requested peer
    AlreadyLinked,
    /// One of the ports (or the peer object) does not exist
    Unresolved,
}

/// Result of placing a child object under a parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParentOutcome {
    /// The child had no parent; a link was inserted
    Linked,
    /// The child moved from `previous_parent`
    Relinked { previous_parent: i64 },
    /// The child already sits under the requested parent
    Unchanged,
    /// Parent or child does not exist
    Unresolved,
}

impl ParentOutcome {
    /// Check if the store was written
    pub fn changed(&self) -> bool {
        matches!(self, ParentOutcome::Linked | ParentOutcome::Relinked { .. })
    }
}
