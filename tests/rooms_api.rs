//! Integration tests for room membership, chat and history.

mod common;

use duoroom_entity::{EventPayload, SystemNotice};
use duoroom_realtime::{ConnectionState, OutboundMessage};
use http::StatusCode;
use serde_json::json;

use common::{TestApp, notice_types};

#[tokio::test]
async fn test_create_then_get_room() {
    let app = TestApp::new();
    let room_id = app.create_room("  alice ").await;

    let response = app.request("GET", &format!("/api/rooms/{room_id}"), None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["data"]["members"], json!(["alice"]));
}

#[tokio::test]
async fn test_third_member_is_turned_away() {
    let app = TestApp::new();
    let room_id = app.create_room("alice").await;

    let bob = app.join(&room_id, "bob").await;
    assert_eq!(bob.status, StatusCode::OK);
    assert_eq!(bob.body["data"]["member"], "bob");

    let carol = app.join(&room_id, "carol").await;
    assert_eq!(carol.status, StatusCode::CONFLICT);
    assert_eq!(carol.body["error"], "ROOM_FULL");

    let room = app.request("GET", &format!("/api/rooms/{room_id}"), None).await;
    assert_eq!(room.body["data"]["members"], json!(["alice", "bob"]));
}

#[tokio::test]
async fn test_rejoin_is_idempotent() {
    let app = TestApp::new();
    let room_id = app.create_room("alice").await;
    app.join(&room_id, "bob").await;
    let before = app.events(&room_id, "").await;

    let again = app.join(&room_id, "bob").await;

    assert_eq!(again.status, StatusCode::OK);
    assert_eq!(again.body["data"]["room"]["members"], json!(["alice", "bob"]));
    assert_eq!(app.events(&room_id, "").await, before);
}

#[tokio::test]
async fn test_unknown_room() {
    let app = TestApp::new();

    let get = app.request("GET", "/api/rooms/doesnotexist", None).await;
    assert_eq!(get.status, StatusCode::NOT_FOUND);
    assert_eq!(get.body["error"], "ROOM_NOT_FOUND");

    let join = app.join("doesnotexist", "bob").await;
    assert_eq!(join.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_room_token_is_bad_request() {
    let app = TestApp::new();
    let response = app.request("GET", "/api/rooms/not%20valid!", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_blank_name_is_rejected() {
    let app = TestApp::new();

    let empty = app
        .request("POST", "/api/rooms", Some(json!({ "name": "" })))
        .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
    assert_eq!(empty.body["error"], "INVALID_INPUT");
    assert!(empty.body["details"]["name"].is_array());

    let spaces = app
        .request("POST", "/api/rooms", Some(json!({ "name": "   " })))
        .await;
    assert_eq!(spaces.status, StatusCode::BAD_REQUEST);

    let missing = app.request("POST", "/api/rooms", Some(json!({}))).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chat_requires_membership() {
    let app = TestApp::new();
    let room_id = app.create_room("alice").await;

    let outsider = app.post_message(&room_id, "mallory", "hi").await;
    assert_eq!(outsider.status, StatusCode::FORBIDDEN);
    assert_eq!(outsider.body["error"], "NOT_A_MEMBER");

    let posted = app.post_message(&room_id, "alice", "hello there").await;
    assert_eq!(posted.status, StatusCode::CREATED);
    assert_eq!(posted.body["data"]["member"], "alice");
    assert_eq!(posted.body["data"]["payload"]["kind"], "chat");
    assert_eq!(posted.body["data"]["payload"]["content"], "hello there");

    let events = app.events(&room_id, "").await;
    assert_eq!(events.len(), 2);
    assert_eq!(events[1]["payload"]["content"], "hello there");
}

#[tokio::test]
async fn test_history_pages_chain_without_gaps() {
    let app = TestApp::new();
    let room_id = app.create_room("alice").await;
    for i in 0..7 {
        app.post_message(&room_id, "alice", &format!("m{i}")).await;
    }

    let mut seen = Vec::new();
    let mut since: Option<i64> = None;
    loop {
        let query = match since {
            Some(s) => format!("?since={s}&limit=3"),
            None => "?limit=3".to_string(),
        };
        let page = app.events(&room_id, &query).await;
        if page.is_empty() {
            break;
        }
        assert!(page.len() <= 3);
        for event in &page {
            seen.push(event["seq"].as_i64().expect("seq"));
        }
        since = seen.last().copied();
    }

    assert_eq!(seen.len(), 8);
    assert!(seen.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn test_last_leave_deletes_room() {
    let app = TestApp::new();
    let room_id = app.create_room("alice").await;
    app.join(&room_id, "bob").await;

    let first = app.leave(&room_id, "alice").await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["data"]["room"]["members"], json!(["bob"]));
    assert_eq!(
        notice_types(&app.events(&room_id, "").await),
        vec!["room_created", "member_joined", "member_left"]
    );

    let second = app.leave(&room_id, "bob").await;
    assert_eq!(second.status, StatusCode::OK);
    assert!(second.body["data"]["room"].is_null());

    let third = app.leave(&room_id, "bob").await;
    assert_eq!(third.status, StatusCode::NOT_FOUND);
    assert_eq!(third.body["error"], "ROOM_NOT_FOUND");

    let gone = app.request("GET", &format!("/api/rooms/{room_id}"), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_leave_by_non_member() {
    let app = TestApp::new();
    let room_id = app.create_room("alice").await;

    let response = app.leave(&room_id, "bob").await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "NOT_A_MEMBER");
}

#[tokio::test]
async fn test_health_reports_counts() {
    let app = TestApp::new();
    app.create_room("alice").await;

    let response = app.request("GET", "/api/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["rooms"], 1);
    assert_eq!(response.body["data"]["connections"], 0);
}

#[tokio::test]
async fn test_leave_over_http_ends_websocket_delivery() {
    let app = TestApp::new();
    let room_id = app.create_room("alice").await;
    app.join(&room_id, "bob").await;

    let engine = &app.state.realtime;
    let (conn, mut rx) = engine.connect();
    let mut state = ConnectionState::Unbound;
    engine
        .handle_text(
            &conn,
            &mut state,
            &format!(r#"{{"type":"join","room_id":"{room_id}","name":"alice"}}"#),
        )
        .await;
    assert!(state.is_subscribed());
    while rx.try_recv().is_ok() {}

    assert_eq!(app.leave(&room_id, "alice").await.status, StatusCode::OK);
    assert_eq!(app.join(&room_id, "carol").await.status, StatusCode::OK);
    let posted = app.post_message(&room_id, "carol", "secret").await;
    assert_eq!(posted.status, StatusCode::CREATED);

    let mut frames = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        frames.push(frame);
    }
    // Only the notice of alice's own departure arrives.
    assert_eq!(frames.len(), 1);
    assert!(matches!(
        &frames[0],
        OutboundMessage::Event { event } if matches!(
            &event.payload,
            EventPayload::System { notice: SystemNotice::MemberLeft { member }, .. } if member == "alice"
        )
    ));
    assert_eq!(
        app.state.realtime.channels.member_connection_count(
            &room_id.parse().unwrap(),
            "alice"
        ),
        0
    );
}
