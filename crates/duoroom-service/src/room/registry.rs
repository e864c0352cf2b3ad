//! Membership, chat and seat reclamation.

use std::sync::Arc;

use tracing::{debug, info, warn};

use duoroom_core::config::RoomsConfig;
use duoroom_core::error::{AppError, ErrorKind};
use duoroom_core::result::AppResult;
use duoroom_core::traits::storage::ObjectStorage;
use duoroom_core::types::RoomId;
use duoroom_database::{FileIndex, HistoryLog, JoinOutcome, LeaveOutcome, RoomStore, Stores};
use duoroom_entity::{NewEvent, Room, RoomEvent};

use super::locks::RoomLocks;
use super::publisher::EventPublisher;
use super::validation;
use crate::context::MemberContext;

/// A member seated in a room by `create` or `join`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seat {
    /// The room after the operation.
    pub room: Room,
    /// The normalized display name that holds the seat.
    pub member: String,
    /// The appended notice; `None` when the member already held the seat.
    pub notice: Option<RoomEvent>,
}

/// Result of an explicit leave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    /// The room after the leave, `None` once it has been deleted.
    pub room: Option<Room>,
    /// The "X left" notice.
    pub notice: RoomEvent,
}

/// The single authority for room-affecting actions.
///
/// Every mutation takes the room's lock, applies the store change, appends
/// its event and publishes it before the lock is released. Broadcast order
/// therefore equals append order. A released seat is reported to the
/// publisher under the same lock, so no later event reaches the departed
/// member.
#[derive(Debug, Clone)]
pub struct RoomRegistry {
    pub(super) rooms: Arc<dyn RoomStore>,
    pub(super) history: Arc<dyn HistoryLog>,
    pub(super) files: Arc<dyn FileIndex>,
    pub(super) storage: Arc<dyn ObjectStorage>,
    pub(super) publisher: Arc<dyn EventPublisher>,
    pub(super) locks: RoomLocks,
    pub(super) limits: RoomsConfig,
    pub(super) max_upload_bytes: u64,
}

impl RoomRegistry {
    /// Creates a new room registry.
    pub fn new(
        stores: &Stores,
        storage: Arc<dyn ObjectStorage>,
        publisher: Arc<dyn EventPublisher>,
        limits: RoomsConfig,
        max_upload_bytes: u64,
    ) -> Self {
        Self {
            rooms: Arc::clone(&stores.rooms),
            history: Arc::clone(&stores.history),
            files: Arc::clone(&stores.files),
            storage,
            publisher,
            locks: RoomLocks::new(),
            limits,
            max_upload_bytes,
        }
    }

    /// Room limits in effect.
    pub fn limits(&self) -> &RoomsConfig {
        &self.limits
    }

    /// Largest accepted upload in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    /// Create a room held by `name`.
    pub async fn create(&self, name: &str) -> AppResult<Seat> {
        self.create_with(name, |_, _| {}).await
    }

    /// Create a room held by `name`.
    ///
    /// `on_seated` receives the room and the normalized name. It runs under
    /// the room's lock after the room and its "created" notice are stored
    /// and before the notice is published.
    pub async fn create_with<F>(&self, name: &str, on_seated: F) -> AppResult<Seat>
    where
        F: FnOnce(&Room, &str) + Send,
    {
        let name = validation::display_name(name, &self.limits)?;
        let room = self.rooms.create_room(&name).await?;
        let _guard = self.locks.lock(&room.id).await;

        let notice = match self
            .history
            .append(NewEvent::room_created(&room.id, &name))
            .await
        {
            Ok(notice) => notice,
            Err(e) => {
                if let Err(undo) = self.rooms.delete_room(&room.id).await {
                    warn!(room_id = %room.id, error = %undo, "Failed to discard room");
                }
                return Err(e);
            }
        };

        on_seated(&room, &name);
        self.publisher.publish(&room.id, &notice);
        info!(room_id = %room.id, member = %name, "Room created");

        Ok(Seat {
            room,
            member: name,
            notice: Some(notice),
        })
    }

    /// Take a seat in an existing room.
    pub async fn join(&self, room_id: &RoomId, name: &str) -> AppResult<Seat> {
        self.join_with(room_id, name, |_, _| {}).await
    }

    /// Take a seat in an existing room.
    ///
    /// Joining as a current member changes nothing and appends no notice.
    /// `on_seated` runs under the room's lock in both cases, before any
    /// notice is published.
    pub async fn join_with<F>(&self, room_id: &RoomId, name: &str, on_seated: F) -> AppResult<Seat>
    where
        F: FnOnce(&Room, &str) + Send,
    {
        let name = validation::display_name(name, &self.limits)?;
        let _guard = self.locks.lock(room_id).await;

        match self.rooms.add_member(room_id, &name).await? {
            JoinOutcome::AlreadyMember(room) => {
                debug!(room_id = %room_id, member = %name, "Member re-joined");
                on_seated(&room, &name);
                Ok(Seat {
                    room,
                    member: name,
                    notice: None,
                })
            }
            JoinOutcome::Joined(room) => {
                let notice = match self
                    .history
                    .append(NewEvent::member_joined(room_id, &name))
                    .await
                {
                    Ok(notice) => notice,
                    Err(e) => {
                        self.undo_seat(room_id, &name).await;
                        return Err(e);
                    }
                };

                on_seated(&room, &name);
                self.publisher.publish(room_id, &notice);
                info!(room_id = %room_id, member = %name, "Member joined");

                Ok(Seat {
                    room,
                    member: name,
                    notice: Some(notice),
                })
            }
        }
    }

    /// Give up the seat held by `ctx.member`. The room is deleted when it
    /// empties.
    pub async fn leave(&self, ctx: &MemberContext) -> AppResult<Departure> {
        let _guard = self.locks.lock(&ctx.room_id).await;
        self.member_room(ctx).await?;

        let outcome = self.rooms.remove_member(&ctx.room_id, &ctx.member).await?;
        let notice = match self
            .history
            .append(NewEvent::member_left(&ctx.room_id, &ctx.member))
            .await
        {
            Ok(notice) => notice,
            Err(e) => {
                if let LeaveOutcome::Left(_) = outcome {
                    if let Err(undo) = self.rooms.add_member(&ctx.room_id, &ctx.member).await {
                        warn!(room_id = %ctx.room_id, error = %undo, "Failed to restore seat");
                    }
                }
                return Err(e);
            }
        };

        self.publisher.publish(&ctx.room_id, &notice);
        self.publisher.member_departed(&ctx.room_id, &ctx.member);
        info!(room_id = %ctx.room_id, member = %ctx.member, "Member left");

        let room = match outcome {
            LeaveOutcome::Left(room) => Some(room),
            LeaveOutcome::RoomDeleted => {
                self.dispose_room(&ctx.room_id).await;
                None
            }
        };
        Ok(Departure { room, notice })
    }

    /// Append and publish a chat message from `ctx.member`.
    pub async fn post_message(&self, ctx: &MemberContext, content: &str) -> AppResult<RoomEvent> {
        validation::message(content, &self.limits)?;
        let _guard = self.locks.lock(&ctx.room_id).await;
        self.member_room(ctx).await?;

        let event = self
            .history
            .append(NewEvent::chat(&ctx.room_id, &ctx.member, content))
            .await?;
        self.publisher.publish(&ctx.room_id, &event);
        debug!(room_id = %ctx.room_id, member = %ctx.member, seq = event.seq, "Message posted");
        Ok(event)
    }

    /// Release `member`'s seat after they stayed disconnected.
    ///
    /// `still_absent` is evaluated under the room's lock; when it returns
    /// false (the member came back) nothing happens. Returns the appended
    /// notice, or `None` if no seat was released.
    pub async fn reclaim_seat<F>(
        &self,
        room_id: &RoomId,
        member: &str,
        still_absent: F,
    ) -> AppResult<Option<RoomEvent>>
    where
        F: FnOnce() -> bool + Send,
    {
        let _guard = self.locks.lock(room_id).await;
        let room = match self.rooms.get_room(room_id).await {
            Ok(room) => room,
            Err(e) if e.kind == ErrorKind::RoomNotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        if !room.has_member(member) || !still_absent() {
            return Ok(None);
        }

        let outcome = self.rooms.remove_member(room_id, member).await?;
        let notice = self
            .history
            .append(NewEvent::seat_reclaimed(room_id, member))
            .await?;
        self.publisher.publish(room_id, &notice);
        self.publisher.member_departed(room_id, member);
        info!(room_id = %room_id, member = %member, "Seat reclaimed after disconnect");

        if outcome == LeaveOutcome::RoomDeleted {
            self.dispose_room(room_id).await;
        }
        Ok(Some(notice))
    }

    /// Current state of a room.
    pub async fn room(&self, room_id: &RoomId) -> AppResult<Room> {
        self.rooms.get_room(room_id).await
    }

    /// A page of a room's history, oldest first.
    ///
    /// `limit` defaults to and is clamped by the configured page sizes.
    pub async fn history(
        &self,
        room_id: &RoomId,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> AppResult<Vec<RoomEvent>> {
        self.rooms.get_room(room_id).await?;
        self.history
            .query(room_id, since, self.limits.history_limit(limit))
            .await
    }

    /// Every live room, oldest first.
    pub async fn rooms(&self) -> AppResult<Vec<Room>> {
        self.rooms.list_rooms().await
    }

    /// Number of live rooms.
    pub async fn room_count(&self) -> AppResult<u64> {
        self.rooms.count_rooms().await
    }

    /// The room, provided `ctx.member` holds a seat in it.
    pub(super) async fn member_room(&self, ctx: &MemberContext) -> AppResult<Room> {
        let room = self.rooms.get_room(&ctx.room_id).await?;
        if !room.has_member(&ctx.member) {
            return Err(AppError::not_a_member(&ctx.room_id, &ctx.member));
        }
        Ok(room)
    }

    async fn undo_seat(&self, room_id: &RoomId, name: &str) {
        match self.rooms.remove_member(room_id, name).await {
            Ok(LeaveOutcome::RoomDeleted) => self.dispose_room(room_id).await,
            Ok(LeaveOutcome::Left(_)) => {}
            Err(e) => warn!(room_id = %room_id, error = %e, "Failed to undo seat"),
        }
    }

    /// Drop everything a deleted room still owns: its log, its file
    /// descriptors and their stored bytes.
    async fn dispose_room(&self, room_id: &RoomId) {
        match self.history.purge_room(room_id).await {
            Ok(purged) => debug!(room_id = %room_id, purged, "Room history dropped"),
            Err(e) => warn!(room_id = %room_id, error = %e, "Failed to drop room history"),
        }

        let files = match self.files.remove_room(room_id).await {
            Ok(files) => files,
            Err(e) => {
                warn!(room_id = %room_id, error = %e, "Failed to drop room files");
                return;
            }
        };
        for file in files {
            if let Err(e) = self.storage.delete(&file.storage_key).await {
                warn!(room_id = %room_id, file_id = %file.id, error = %e, "Failed to delete stored file");
            }
        }
        info!(room_id = %room_id, "Room deleted");
    }
}
