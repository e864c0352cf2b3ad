//! Cursor pagination over a room's history.

use serde::{Deserialize, Serialize};

/// Request parameters for a history page.
///
/// Pages chain by passing the `seq` of the last event returned as the next
/// `since`; the log guarantees no gaps or duplicates between pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventQuery {
    /// Return events with a sequence marker strictly greater than this.
    #[serde(default)]
    pub since: Option<i64>,
    /// Maximum number of events to return.
    #[serde(default)]
    pub limit: Option<usize>,
}

impl EventQuery {
    /// Query from the start of the log.
    pub fn from_start(limit: usize) -> Self {
        Self {
            since: None,
            limit: Some(limit),
        }
    }

    /// Query for the page following `since`.
    pub fn after(since: i64, limit: usize) -> Self {
        Self {
            since: Some(since),
            limit: Some(limit),
        }
    }
}
