//! Store abstractions injected into the room registry.

use std::fmt::Debug;

use async_trait::async_trait;

use duoroom_core::result::AppResult;
use duoroom_core::types::{FileId, RoomId};
use duoroom_entity::{FileDescriptor, NewEvent, Room, RoomEvent};

/// Number of identifier draws before room creation gives up.
pub const ROOM_ID_ATTEMPTS: usize = 5;

/// Result of adding a member to a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The member took a free seat.
    Joined(Room),
    /// The member already held a seat; nothing changed.
    AlreadyMember(Room),
}

impl JoinOutcome {
    /// The room after the operation.
    pub fn room(&self) -> &Room {
        match self {
            Self::Joined(room) | Self::AlreadyMember(room) => room,
        }
    }

    /// Consume the outcome, returning the room.
    pub fn into_room(self) -> Room {
        match self {
            Self::Joined(room) | Self::AlreadyMember(room) => room,
        }
    }
}

/// Result of removing a member from a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// The member left; others remain.
    Left(Room),
    /// The last member left and the room was deleted.
    RoomDeleted,
}

/// Keyed storage for rooms and their membership.
///
/// Every method is atomic with respect to other calls on the same room.
#[async_trait]
pub trait RoomStore: Send + Sync + Debug + 'static {
    /// Persist a new room holding only `creator` under a freshly generated
    /// identifier. Fails with `Conflict` if no free identifier was found.
    async fn create_room(&self, creator: &str) -> AppResult<Room>;

    /// Fetch a room, failing with `RoomNotFound` if it does not exist.
    async fn get_room(&self, id: &RoomId) -> AppResult<Room>;

    /// Add `name` to the room.
    ///
    /// Idempotent for existing members. Fails with `RoomFull` when both
    /// seats are taken by others and `RoomNotFound` when absent.
    async fn add_member(&self, id: &RoomId, name: &str) -> AppResult<JoinOutcome>;

    /// Remove `name` from the room, deleting the room once it is empty.
    ///
    /// Fails with `NotAMember` if `name` holds no seat.
    async fn remove_member(&self, id: &RoomId, name: &str) -> AppResult<LeaveOutcome>;

    /// Delete a room and its membership outright. Returns whether it existed.
    async fn delete_room(&self, id: &RoomId) -> AppResult<bool>;

    /// Every live room, oldest first.
    async fn list_rooms(&self) -> AppResult<Vec<Room>>;

    /// Number of live rooms.
    async fn count_rooms(&self) -> AppResult<u64>;
}

/// Append-only, per-room ordered event log.
#[async_trait]
pub trait HistoryLog: Send + Sync + Debug + 'static {
    /// Assign a sequence marker and store the event before returning it.
    async fn append(&self, event: NewEvent) -> AppResult<RoomEvent>;

    /// Events with `seq > since` (or from the start), oldest first, at most
    /// `limit` of them.
    async fn query(
        &self,
        room_id: &RoomId,
        since: Option<i64>,
        limit: usize,
    ) -> AppResult<Vec<RoomEvent>>;

    /// Drop the whole log of a deleted room. Returns the number of events.
    async fn purge_room(&self, room_id: &RoomId) -> AppResult<u64>;
}

/// Index of file descriptors shared in rooms.
#[async_trait]
pub trait FileIndex: Send + Sync + Debug + 'static {
    /// Record a descriptor.
    async fn insert(&self, file: &FileDescriptor) -> AppResult<()>;

    /// Look up a descriptor within a room.
    async fn get(&self, room_id: &RoomId, id: FileId) -> AppResult<Option<FileDescriptor>>;

    /// Remove a descriptor. Returns whether it existed.
    async fn remove(&self, room_id: &RoomId, id: FileId) -> AppResult<bool>;

    /// Descriptors of a room in upload order.
    async fn list(&self, room_id: &RoomId) -> AppResult<Vec<FileDescriptor>>;

    /// Remove and return every descriptor of a room.
    async fn remove_room(&self, room_id: &RoomId) -> AppResult<Vec<FileDescriptor>>;
}
