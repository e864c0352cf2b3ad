//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use http::{HeaderMap, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use duoroom_api::{AppState, build_app, build_state};
use duoroom_core::config::AppConfig;
use duoroom_database::Stores;
use duoroom_storage::MemoryStorageProvider;

const BOUNDARY: &str = "duoroom-test-boundary";

/// Test application backed by in-memory stores and storage.
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for direct inspection
    pub state: AppState,
}

/// A buffered response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Vec<u8>,
    pub body: Value,
}

impl TestApp {
    /// Create a new test application with default configuration.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a new test application with the given configuration.
    pub fn with_config(config: AppConfig) -> Self {
        let state = build_state(
            config,
            Stores::in_memory(),
            Arc::new(MemoryStorageProvider::new()),
        );
        Self {
            router: build_app(state.clone()),
            state,
        }
    }

    /// Send a request and buffer the response.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body")
            .to_vec();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            bytes,
            body,
        }
    }

    /// Send a request with an optional JSON body.
    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");
        self.send(request).await
    }

    /// Create a room and return its id.
    pub async fn create_room(&self, name: &str) -> String {
        let response = self
            .request("POST", "/api/rooms", Some(serde_json::json!({ "name": name })))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["data"]["room"]["id"]
            .as_str()
            .expect("room id")
            .to_string()
    }

    /// Join a room.
    pub async fn join(&self, room_id: &str, name: &str) -> TestResponse {
        self.request(
            "POST",
            &format!("/api/rooms/{room_id}/join"),
            Some(serde_json::json!({ "name": name })),
        )
        .await
    }

    /// Leave a room.
    pub async fn leave(&self, room_id: &str, name: &str) -> TestResponse {
        self.request(
            "POST",
            &format!("/api/rooms/{room_id}/leave"),
            Some(serde_json::json!({ "name": name })),
        )
        .await
    }

    /// Post a chat message.
    pub async fn post_message(&self, room_id: &str, name: &str, content: &str) -> TestResponse {
        self.request(
            "POST",
            &format!("/api/rooms/{room_id}/messages"),
            Some(serde_json::json!({ "name": name, "content": content })),
        )
        .await
    }

    /// Upload a file as `name` through the multipart endpoint.
    pub async fn upload(
        &self,
        room_id: &str,
        name: &str,
        filename: &str,
        data: &[u8],
    ) -> TestResponse {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\n{name}\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri(format!("/api/rooms/{room_id}/files"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request");
        self.send(request).await
    }

    /// The room's history as JSON events.
    pub async fn events(&self, room_id: &str, query: &str) -> Vec<Value> {
        let response = self
            .request("GET", &format!("/api/rooms/{room_id}/events{query}"), None)
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        response.body["data"].as_array().expect("events").clone()
    }
}

/// The `type` of each system notice in `events`.
pub fn notice_types(events: &[Value]) -> Vec<String> {
    events
        .iter()
        .filter(|e| e["payload"]["kind"] == "system")
        .map(|e| e["payload"]["notice"]["type"].as_str().unwrap_or_default().to_string())
        .collect()
}
