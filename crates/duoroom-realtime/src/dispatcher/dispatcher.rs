//! Maps `(state, inbound action)` to `(next state, reply)`.
//!
//! Room events caused by an action are broadcast by the room registry
//! through the engine; only the originator's reply comes back here.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use tracing::{debug, error};

use duoroom_core::error::{AppError, ErrorKind};
use duoroom_core::result::AppResult;
use duoroom_core::types::{ConnectionId, RoomId};
use duoroom_entity::Room;
use duoroom_service::{MemberContext, RoomRegistry, Seat};

use crate::channel::ChannelRegistry;
use crate::message::types::{InboundMessage, OutboundMessage};
use crate::seats::SeatReclaimer;

use super::state::{ConnectionState, Transition};

/// Applies inbound actions on behalf of one connection at a time.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: RoomRegistry,
    channels: Arc<ChannelRegistry>,
    seats: Arc<SeatReclaimer>,
}

impl Dispatcher {
    /// Creates a new dispatcher.
    pub fn new(
        registry: RoomRegistry,
        channels: Arc<ChannelRegistry>,
        seats: Arc<SeatReclaimer>,
    ) -> Self {
        Self {
            registry,
            channels,
            seats,
        }
    }

    /// Apply `message` sent by `conn_id` while in `state`.
    ///
    /// Failures become an `error` reply. A bound connection whose room or
    /// seat has disappeared falls back to [`ConnectionState::Unbound`].
    pub async fn dispatch(
        &self,
        conn_id: ConnectionId,
        state: &ConnectionState,
        message: InboundMessage,
    ) -> Transition {
        let action = message.action();
        match self.apply(conn_id, state, message).await {
            Ok(transition) => transition,
            Err(e) => {
                if e.kind.is_domain() {
                    debug!(conn_id = %conn_id, action, error = %e, "Action rejected");
                } else {
                    error!(conn_id = %conn_id, action, error = %e, "Action failed");
                }

                let next = match (state, e.kind) {
                    (
                        ConnectionState::Subscribed { .. },
                        ErrorKind::RoomNotFound | ErrorKind::NotAMember,
                    ) => {
                        self.channels.unsubscribe(conn_id);
                        ConnectionState::Unbound
                    }
                    _ => state.clone(),
                };
                Transition::to(next, OutboundMessage::error(&e))
            }
        }
    }

    async fn apply(
        &self,
        conn_id: ConnectionId,
        state: &ConnectionState,
        message: InboundMessage,
    ) -> AppResult<Transition> {
        match message {
            InboundMessage::Create { name } => {
                if state.is_subscribed() {
                    return Err(AppError::invalid_input(
                        "Leave the current room before creating another",
                    ));
                }
                let seat = self
                    .registry
                    .create_with(&name, |room, member| self.bind(conn_id, room, member))
                    .await?;
                let next = Self::subscribed(&seat);
                Ok(Transition::to(
                    next,
                    OutboundMessage::Created {
                        room: seat.room,
                        member: seat.member,
                    },
                ))
            }
            InboundMessage::Join { room_id, name } => {
                let room_id: RoomId = room_id.parse()?;
                if let ConnectionState::Subscribed {
                    room_id: bound,
                    member,
                } = state
                {
                    if *bound != room_id || name.trim() != member.as_str() {
                        return Err(AppError::invalid_input(
                            "A connection can only act in one room as one member",
                        ));
                    }
                }
                let seat = self
                    .registry
                    .join_with(&room_id, &name, |room, member| {
                        self.bind(conn_id, room, member)
                    })
                    .await?;
                let next = Self::subscribed(&seat);
                Ok(Transition::to(
                    next,
                    OutboundMessage::Joined {
                        room: seat.room,
                        member: seat.member,
                    },
                ))
            }
            InboundMessage::Message { content } => {
                let ctx = Self::bound(state)?;
                let event = self.registry.post_message(&ctx, &content).await?;
                Ok(Transition::to(
                    state.clone(),
                    OutboundMessage::Posted { seq: event.seq },
                ))
            }
            InboundMessage::UploadFile { filename, data } => {
                let ctx = Self::bound(state)?;
                let bytes = STANDARD.decode(data.as_bytes()).map_err(|e| {
                    AppError::invalid_input(format!("File data is not valid base64: {e}"))
                })?;
                let shared = self
                    .registry
                    .attach_file(&ctx, &filename, Bytes::from(bytes))
                    .await?;
                Ok(Transition::to(
                    state.clone(),
                    OutboundMessage::FileUploaded { file: shared.file },
                ))
            }
            InboundMessage::DeleteFile { file_id } => {
                let ctx = Self::bound(state)?;
                self.registry.delete_file(&ctx, file_id).await?;
                Ok(Transition::to(
                    state.clone(),
                    OutboundMessage::FileDeleted { file_id },
                ))
            }
            InboundMessage::Leave => {
                let ctx = Self::bound(state)?;
                self.registry.leave(&ctx).await?;
                self.channels.unsubscribe(conn_id);
                self.seats.cancel(&ctx.room_id, &ctx.member);
                Ok(Transition::to(
                    ConnectionState::Unbound,
                    OutboundMessage::Left {
                        room_id: ctx.room_id,
                    },
                ))
            }
            InboundMessage::History { since, limit } => {
                let ctx = Self::bound(state)?;
                let events = self.registry.history(&ctx.room_id, since, limit).await?;
                Ok(Transition::to(
                    state.clone(),
                    OutboundMessage::History {
                        room_id: ctx.room_id,
                        events,
                    },
                ))
            }
            InboundMessage::Pong { .. } => Ok(Transition::silent(state.clone())),
        }
    }

    /// Runs under the room lock, before the seat's notice is broadcast, so
    /// the new subscriber receives it.
    fn bind(&self, conn_id: ConnectionId, room: &Room, member: &str) {
        self.channels.subscribe(conn_id, &room.id, member);
        self.seats.cancel(&room.id, member);
    }

    fn subscribed(seat: &Seat) -> ConnectionState {
        ConnectionState::Subscribed {
            room_id: seat.room.id.clone(),
            member: seat.member.clone(),
        }
    }

    fn bound(state: &ConnectionState) -> AppResult<MemberContext> {
        match state {
            ConnectionState::Subscribed { room_id, member } => {
                Ok(MemberContext::new(room_id.clone(), member.clone()))
            }
            ConnectionState::Unbound => Err(AppError::new(
                ErrorKind::NotAMember,
                "Join or create a room first",
            )),
        }
    }
}
