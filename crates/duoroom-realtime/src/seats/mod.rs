//! Seat reclamation.
//!
//! A member whose last connection drops keeps their seat for a grace
//! period. If no connection for them comes back before it runs out, the
//! seat is released as if they had left.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use tracing::{debug, warn};

use duoroom_core::types::RoomId;
use duoroom_service::RoomRegistry;

use crate::channel::ChannelRegistry;
use crate::metrics::EngineMetrics;

/// Grace-period timers keyed by `(room, member)`.
#[derive(Debug)]
pub struct SeatReclaimer {
    registry: RoomRegistry,
    channels: Arc<ChannelRegistry>,
    metrics: Arc<EngineMetrics>,
    /// `None` disables reclamation.
    delay: Option<Duration>,
    /// Token of the timer currently armed for each seat.
    timers: DashMap<(RoomId, String), u64>,
    next_token: AtomicU64,
}

impl SeatReclaimer {
    /// Creates a reclaimer releasing seats after `delay`.
    pub fn new(
        registry: RoomRegistry,
        channels: Arc<ChannelRegistry>,
        metrics: Arc<EngineMetrics>,
        delay: Option<Duration>,
    ) -> Self {
        Self {
            registry,
            channels,
            metrics,
            delay,
            timers: DashMap::new(),
            next_token: AtomicU64::new(1),
        }
    }

    /// Whether seats are ever reclaimed.
    pub fn is_enabled(&self) -> bool {
        self.delay.is_some()
    }

    /// Start (or restart) the grace period for `member` in `room_id`.
    pub fn arm(self: &Arc<Self>, room_id: &RoomId, member: &str) {
        let Some(delay) = self.delay else {
            return;
        };

        let key = (room_id.clone(), member.to_string());
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        self.timers.insert(key.clone(), token);
        debug!(room_id = %room_id, member = %member, ?delay, "Seat reclaim armed");

        let this = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if this.timers.remove_if(&key, |_, t| *t == token).is_none() {
                return;
            }
            this.reclaim(&key.0, &key.1).await;
        });
    }

    /// Stop the grace period for `member`, who is back.
    pub fn cancel(&self, room_id: &RoomId, member: &str) {
        if self
            .timers
            .remove(&(room_id.clone(), member.to_string()))
            .is_some()
        {
            debug!(room_id = %room_id, member = %member, "Seat reclaim cancelled");
        }
    }

    /// Number of armed timers.
    pub fn pending_count(&self) -> usize {
        self.timers.len()
    }

    async fn reclaim(&self, room_id: &RoomId, member: &str) {
        let channels = Arc::clone(&self.channels);
        let still_absent = {
            let room_id = room_id.clone();
            let member = member.to_string();
            move || channels.member_connection_count(&room_id, &member) == 0
        };

        match self.registry.reclaim_seat(room_id, member, still_absent).await {
            Ok(Some(_)) => self.metrics.seat_reclaimed(),
            Ok(None) => debug!(room_id = %room_id, member = %member, "Seat no longer vacant"),
            Err(e) => warn!(room_id = %room_id, member = %member, error = %e, "Seat reclaim failed"),
        }
    }
}
