//! In-memory room store.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use duoroom_core::error::AppError;
use duoroom_core::result::AppResult;
use duoroom_core::types::RoomId;
use duoroom_entity::Room;

use crate::traits::{JoinOutcome, LeaveOutcome, ROOM_ID_ATTEMPTS, RoomStore};

/// Rooms held in a concurrent map; each mutation runs under the map's
/// entry lock for that room.
#[derive(Debug, Default)]
pub struct MemoryRoomStore {
    rooms: DashMap<RoomId, Room>,
}

impl MemoryRoomStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomStore for MemoryRoomStore {
    async fn create_room(&self, creator: &str) -> AppResult<Room> {
        for _ in 0..ROOM_ID_ATTEMPTS {
            if let Entry::Vacant(slot) = self.rooms.entry(RoomId::generate()) {
                let room = Room::new(slot.key().clone(), creator);
                slot.insert(room.clone());
                return Ok(room);
            }
        }
        Err(AppError::conflict("Could not allocate a unique room id"))
    }

    async fn get_room(&self, id: &RoomId) -> AppResult<Room> {
        self.rooms
            .get(id)
            .map(|r| r.value().clone())
            .ok_or_else(|| AppError::room_not_found(id))
    }

    async fn add_member(&self, id: &RoomId, name: &str) -> AppResult<JoinOutcome> {
        let mut room = self
            .rooms
            .get_mut(id)
            .ok_or_else(|| AppError::room_not_found(id))?;

        if room.has_member(name) {
            return Ok(JoinOutcome::AlreadyMember(room.clone()));
        }
        if room.is_full() {
            return Err(AppError::room_full(id));
        }
        room.members.push(name.to_string());
        Ok(JoinOutcome::Joined(room.clone()))
    }

    async fn remove_member(&self, id: &RoomId, name: &str) -> AppResult<LeaveOutcome> {
        match self.rooms.entry(id.clone()) {
            Entry::Vacant(_) => Err(AppError::room_not_found(id)),
            Entry::Occupied(mut slot) => {
                let room = slot.get_mut();
                let Some(pos) = room.members.iter().position(|m| m == name) else {
                    return Err(AppError::not_a_member(id, name));
                };
                room.members.remove(pos);
                if room.is_empty() {
                    slot.remove();
                    Ok(LeaveOutcome::RoomDeleted)
                } else {
                    Ok(LeaveOutcome::Left(room.clone()))
                }
            }
        }
    }

    async fn delete_room(&self, id: &RoomId) -> AppResult<bool> {
        Ok(self.rooms.remove(id).is_some())
    }

    async fn list_rooms(&self) -> AppResult<Vec<Room>> {
        let mut rooms: Vec<Room> = self.rooms.iter().map(|r| r.value().clone()).collect();
        rooms.sort_by_key(|r| r.created_at);
        Ok(rooms)
    }

    async fn count_rooms(&self) -> AppResult<u64> {
        Ok(self.rooms.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use duoroom_core::error::ErrorKind;

    use super::*;

    #[tokio::test]
    async fn test_join_is_idempotent_and_capped() {
        let store = MemoryRoomStore::new();
        let room = store.create_room("alice").await.unwrap();

        let joined = store.add_member(&room.id, "bob").await.unwrap();
        assert!(matches!(joined, JoinOutcome::Joined(_)));

        let again = store.add_member(&room.id, "bob").await.unwrap();
        assert!(matches!(again, JoinOutcome::AlreadyMember(_)));
        assert_eq!(again.room().members, vec!["alice", "bob"]);

        let err = store.add_member(&room.id, "carol").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RoomFull);
        assert_eq!(store.get_room(&room.id).await.unwrap().members.len(), 2);
    }

    #[tokio::test]
    async fn test_last_leave_deletes_room() {
        let store = MemoryRoomStore::new();
        let room = store.create_room("alice").await.unwrap();
        store.add_member(&room.id, "bob").await.unwrap();

        let left = store.remove_member(&room.id, "alice").await.unwrap();
        assert_eq!(left, LeaveOutcome::Left(store.get_room(&room.id).await.unwrap()));

        let err = store.remove_member(&room.id, "alice").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotAMember);

        let last = store.remove_member(&room.id, "bob").await.unwrap();
        assert_eq!(last, LeaveOutcome::RoomDeleted);
        assert_eq!(store.count_rooms().await.unwrap(), 0);

        let err = store.add_member(&room.id, "carol").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RoomNotFound);
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let store = MemoryRoomStore::new();
        let first = store.create_room("alice").await.unwrap();
        let second = store.create_room("bob").await.unwrap();

        let ids: Vec<RoomId> = store.list_rooms().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&first.id) && ids.contains(&second.id));

        assert!(store.delete_room(&first.id).await.unwrap());
        assert!(!store.delete_room(&first.id).await.unwrap());
        assert_eq!(store.list_rooms().await.unwrap(), vec![second]);
    }
}
