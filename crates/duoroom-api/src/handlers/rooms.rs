//! Room membership and chat handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use duoroom_entity::{Room, RoomEvent};
use duoroom_service::{MemberContext, Seat};

use crate::dto::request::{CreateRoomRequest, MemberRequest, PostMessageRequest};
use crate::dto::response::{ApiResponse, LeftResponse, SeatResponse};
use crate::error::ApiError;
use crate::extractors::{ValidatedJson, parse_room_id};
use crate::state::AppState;

fn seat_response(state: &AppState, seat: Seat) -> ApiResponse<SeatResponse> {
    state
        .realtime
        .arm_seat_if_absent(&seat.room.id, &seat.member);
    ApiResponse::ok(SeatResponse {
        room: seat.room,
        member: seat.member,
    })
}

/// POST /api/rooms
pub async fn create_room(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateRoomRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SeatResponse>>), ApiError> {
    let seat = state.registry.create(&req.name).await?;
    Ok((StatusCode::CREATED, Json(seat_response(&state, seat))))
}

/// POST /api/rooms/{room_id}/join
///
/// Joining again under a name that already holds a seat succeeds without
/// changing anything.
pub async fn join_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    ValidatedJson(req): ValidatedJson<MemberRequest>,
) -> Result<Json<ApiResponse<SeatResponse>>, ApiError> {
    let room_id = parse_room_id(&room_id)?;
    let seat = state.registry.join(&room_id, &req.name).await?;
    Ok(Json(seat_response(&state, seat)))
}

/// POST /api/rooms/{room_id}/leave
pub async fn leave_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    ValidatedJson(req): ValidatedJson<MemberRequest>,
) -> Result<Json<ApiResponse<LeftResponse>>, ApiError> {
    let room_id = parse_room_id(&room_id)?;
    let ctx = MemberContext::new(room_id, req.name.trim());
    let departure = state.registry.leave(&ctx).await?;
    state.realtime.release_seat(&ctx.room_id, &ctx.member);

    Ok(Json(ApiResponse::ok(LeftResponse {
        room_id: ctx.room_id,
        room: departure.room,
    })))
}

/// GET /api/rooms/{room_id}
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<ApiResponse<Room>>, ApiError> {
    let room_id = parse_room_id(&room_id)?;
    let room = state.registry.room(&room_id).await?;
    Ok(Json(ApiResponse::ok(room)))
}

/// POST /api/rooms/{room_id}/messages
pub async fn post_message(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    ValidatedJson(req): ValidatedJson<PostMessageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RoomEvent>>), ApiError> {
    let room_id = parse_room_id(&room_id)?;
    let ctx = MemberContext::new(room_id, req.name.trim());
    let event = state.registry.post_message(&ctx, &req.content).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(event))))
}
