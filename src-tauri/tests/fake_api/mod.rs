//! In-process stand-in for the scenario API.
//!
//! Serves `/v1/scenarios/run` and `/v1/files/upload` on an ephemeral port,
//! answers with canned replies and records every request it sees.

#![allow(dead_code)]

use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// One multipart field as received.
#[derive(Debug, Clone)]
pub struct UploadField {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct Seen {
    pub run_bodies: Vec<Value>,
    pub uploads: Vec<Vec<UploadField>>,
    pub auth_headers: Vec<String>,
}

#[derive(Clone)]
pub struct FakeApi {
    run_reply: (StatusCode, String),
    upload_reply: (StatusCode, String),
    pub seen: Arc<Mutex<Seen>>,
}

impl FakeApi {
    /// Reply to runs with `{"result": {"response": <response>}}`.
    pub fn responding(response: Value) -> Self {
        let body = serde_json::json!({ "result": { "response": response } });
        Self::with_run_reply(StatusCode::OK, &body.to_string())
    }

    pub fn with_run_reply(status: StatusCode, body: &str) -> Self {
        Self {
            run_reply: (status, body.to_string()),
            upload_reply: (StatusCode::OK, r#"{"id":"file-123"}"#.to_string()),
            seen: Arc::default(),
        }
    }

    pub fn upload_reply(mut self, status: StatusCode, body: &str) -> Self {
        self.upload_reply = (status, body.to_string());
        self
    }

    /// Bind to 127.0.0.1:0 and return the base URL.
    pub async fn spawn(&self) -> String {
        let app = Router::new()
            .route("/v1/scenarios/run", post(run_handler))
            .route("/v1/files/upload", post(upload_handler))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    pub fn seen(&self) -> std::sync::MutexGuard<'_, Seen> {
        self.seen.lock().unwrap()
    }
}

fn record_auth(state: &FakeApi, headers: &HeaderMap) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    state.seen().auth_headers.push(auth);
}

async fn run_handler(
    State(state): State<FakeApi>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    record_auth(&state, &headers);
    state.seen().run_bodies.push(body);
    state.run_reply.clone()
}

async fn upload_handler(
    State(state): State<FakeApi>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> (StatusCode, String) {
    record_auth(&state, &headers);

    let mut fields = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or("").to_string();
        let file_name = field.file_name().map(|s| s.to_string());
        let content_type = field.content_type().map(|s| s.to_string());
        let data = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        fields.push(UploadField {
            name,
            file_name,
            content_type,
            data,
        });
    }
    state.seen().uploads.push(fields);
    state.upload_reply.clone()
}

/// A small, decodable PNG.
pub fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(4, 3, image::Rgb([20, 40, 60]));
    let mut bytes = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}
