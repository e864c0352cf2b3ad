//! History handler.

use axum::Json;
use axum::extract::{Path, Query, State};

use duoroom_core::types::EventQuery;
use duoroom_entity::RoomEvent;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::parse_room_id;
use crate::state::AppState;

/// GET /api/rooms/{room_id}/events?since=&limit=
///
/// Events after `since`, oldest first. Pass the last `seq` as the next
/// `since` to page forward.
pub async fn list_events(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Query(query): Query<EventQuery>,
) -> Result<Json<ApiResponse<Vec<RoomEvent>>>, ApiError> {
    let room_id = parse_room_id(&room_id)?;
    let events = state
        .registry
        .history(&room_id, query.since, query.limit)
        .await?;
    Ok(Json(ApiResponse::ok(events)))
}
