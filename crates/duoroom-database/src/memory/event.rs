//! In-memory history log.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use duoroom_core::result::AppResult;
use duoroom_core::types::RoomId;
use duoroom_entity::{NewEvent, RoomEvent};

use crate::traits::HistoryLog;

/// Per-room event vectors with a process-wide sequence counter.
///
/// The counter is advanced while the room's shard is locked, so within a
/// room markers increase in push order.
#[derive(Debug)]
pub struct MemoryHistoryLog {
    events: DashMap<RoomId, Vec<RoomEvent>>,
    next_seq: AtomicI64,
}

impl Default for MemoryHistoryLog {
    fn default() -> Self {
        Self {
            events: DashMap::new(),
            next_seq: AtomicI64::new(1),
        }
    }
}

impl MemoryHistoryLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryLog for MemoryHistoryLog {
    async fn append(&self, event: NewEvent) -> AppResult<RoomEvent> {
        let mut log = self.events.entry(event.room_id.clone()).or_default();
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let stored = event.into_event(seq, Utc::now());
        log.push(stored.clone());
        Ok(stored)
    }

    async fn query(
        &self,
        room_id: &RoomId,
        since: Option<i64>,
        limit: usize,
    ) -> AppResult<Vec<RoomEvent>> {
        let Some(log) = self.events.get(room_id) else {
            return Ok(Vec::new());
        };
        let start = match since {
            Some(since) => log.partition_point(|e| e.seq <= since),
            None => 0,
        };
        Ok(log.iter().skip(start).take(limit).cloned().collect())
    }

    async fn purge_room(&self, room_id: &RoomId) -> AppResult<u64> {
        Ok(self
            .events
            .remove(room_id)
            .map(|(_, log)| log.len() as u64)
            .unwrap_or(0))
    }
}
