//! WebSocket upgrade handler.
//!
//! Each socket gets a writer task draining its outbound queue and a
//! heartbeat task; inbound frames are handled in order on the socket's own
//! task, which owns the connection's protocol state.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{info, warn};

use duoroom_realtime::ConnectionState;
use duoroom_realtime::connection::run_heartbeat;
use duoroom_realtime::message::serializer::serialize_outbound;
use duoroom_realtime::message::validator::max_inbound_bytes;

use crate::state::AppState;

/// GET /ws
pub async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let max_frame = max_inbound_bytes(
        state.config.realtime.max_frame_bytes,
        state.config.storage.max_upload_size_bytes,
    );
    ws.max_message_size(max_frame)
        .on_upgrade(move |socket| handle_socket(state, socket))
}

/// Handles an established WebSocket connection.
async fn handle_socket(state: AppState, socket: WebSocket) {
    let engine = state.realtime.clone();
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (handle, mut outbound_rx) = engine.connect();
    let conn_id = handle.id;

    info!(conn_id = %conn_id, "WebSocket connection established");

    let writer = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            let text = match serialize_outbound(&msg) {
                Ok(text) => text,
                Err(e) => {
                    warn!(conn_id = %conn_id, error = %e, "Failed to serialize outbound message");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });
    let heartbeat = tokio::spawn(run_heartbeat(handle.clone(), engine.heartbeat_config()));

    let mut conn_state = ConnectionState::Unbound;
    loop {
        tokio::select! {
            _ = handle.closed() => break,
            frame = ws_rx.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    engine.handle_text(&handle, &mut conn_state, text.as_str()).await;
                }
                Some(Ok(Message::Pong(_))) => handle.record_pong().await,
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                    break;
                }
            },
        }
    }

    engine.disconnect(&conn_id);
    heartbeat.abort();
    writer.abort();

    info!(
        conn_id = %conn_id,
        room_id = conn_state.room_id().map(|r| r.to_string()),
        "WebSocket connection closed"
    );
}
