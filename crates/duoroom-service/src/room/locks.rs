//! Per-room mutual exclusion.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use duoroom_core::types::RoomId;

/// One async mutex per room identifier, created on demand.
///
/// Entries are dropped again when the last holder or waiter releases them,
/// so identifiers that never became rooms do not accumulate.
#[derive(Debug, Clone, Default)]
pub struct RoomLocks {
    locks: Arc<DashMap<RoomId, Arc<Mutex<()>>>>,
}

impl RoomLocks {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `room_id`.
    pub async fn lock(&self, room_id: &RoomId) -> RoomGuard {
        let mutex = self
            .locks
            .entry(room_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = mutex.lock_owned().await;
        RoomGuard {
            guard: Some(guard),
            room_id: room_id.clone(),
            locks: Arc::clone(&self.locks),
        }
    }

    /// Number of rooms with a live lock entry.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no lock entries exist.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Exclusive access to one room until dropped.
#[derive(Debug)]
pub struct RoomGuard {
    guard: Option<OwnedMutexGuard<()>>,
    room_id: RoomId,
    locks: Arc<DashMap<RoomId, Arc<Mutex<()>>>>,
}

impl RoomGuard {
    /// The locked room.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }
}

impl Drop for RoomGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the table itself still references the mutex: nobody waits.
        self.locks
            .remove_if(&self.room_id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
