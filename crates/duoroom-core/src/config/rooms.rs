//! Room limits and seat reclamation policy.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Room behaviour configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomsConfig {
    /// Maximum display name length in characters.
    #[serde(default = "default_max_name")]
    pub max_name_length: usize,
    /// Maximum chat message length in characters.
    #[serde(default = "default_max_message")]
    pub max_message_length: usize,
    /// Page size used when a history query gives no limit.
    #[serde(default = "default_history_page")]
    pub default_history_limit: usize,
    /// Upper bound on a history page.
    #[serde(default = "default_history_max")]
    pub max_history_limit: usize,
    /// Seconds a member may stay without any live connection before the
    /// seat is released. `0` keeps seats until an explicit leave.
    #[serde(default = "default_seat_reclaim")]
    pub seat_reclaim_seconds: u64,
}

impl RoomsConfig {
    /// Reclaim grace period, or `None` when reclamation is disabled.
    pub fn seat_reclaim_after(&self) -> Option<Duration> {
        (self.seat_reclaim_seconds > 0).then(|| Duration::from_secs(self.seat_reclaim_seconds))
    }

    /// Clamp a requested history page size.
    pub fn history_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_history_limit)
            .clamp(1, self.max_history_limit.max(1))
    }
}

impl Default for RoomsConfig {
    fn default() -> Self {
        Self {
            max_name_length: default_max_name(),
            max_message_length: default_max_message(),
            default_history_limit: default_history_page(),
            max_history_limit: default_history_max(),
            seat_reclaim_seconds: default_seat_reclaim(),
        }
    }
}

fn default_max_name() -> usize {
    64
}

fn default_max_message() -> usize {
    4000
}

fn default_history_page() -> usize {
    50
}

fn default_history_max() -> usize {
    200
}

fn default_seat_reclaim() -> u64 {
    300
}
