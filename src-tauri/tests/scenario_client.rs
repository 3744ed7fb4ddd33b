//! Integration tests for the scenario client against a local fake API.
//!
//! Run with: cargo test --test scenario_client

mod fake_api;

use axum::http::StatusCode;
use base64::Engine;
use fake_api::{png_bytes, FakeApi};
use scenario_ocr_lib::scenario::config::RequestFlow;
use scenario_ocr_lib::scenario::{ScenarioClient, ScenarioConfig};
use scenario_ocr_lib::upload::UploadCandidate;
use scenario_ocr_lib::OcrError;
use serde_json::json;

// ── Helpers ──────────────────────────────────────────────────────────

fn client(base: &str, flow: RequestFlow) -> ScenarioClient {
    let mut config = ScenarioConfig::new(base, "test-token");
    config.flow = flow;
    config.reply = flow.default_strategy();
    ScenarioClient::new(config).unwrap()
}

fn candidate() -> UploadCandidate {
    UploadCandidate::from_bytes("receipt.png", "image/png", png_bytes())
}

// ── Flow A: inline ───────────────────────────────────────────────────

#[tokio::test]
async fn inline_flow_sends_base64_with_bearer() {
    let api = FakeApi::responding(json!({ "text": "Hello" }));
    let base = api.spawn().await;

    let text = client(&base, RequestFlow::Inline)
        .recognize(&candidate())
        .await
        .unwrap();
    assert_eq!(text, "Hello");

    let seen = api.seen();
    assert_eq!(seen.auth_headers, vec!["Bearer test-token".to_string()]);
    assert!(seen.uploads.is_empty());

    let body = &seen.run_bodies[0];
    let expected = base64::engine::general_purpose::STANDARD.encode(png_bytes());
    assert_eq!(body["inputs"]["base64"], json!(expected));
    assert_eq!(body["response_mode"], "blocking");
    assert_eq!(body["user"], "ocr-web");
}

#[tokio::test]
async fn inline_flow_unwraps_json_encoded_text() {
    let api = FakeApi::responding(json!("{\"text\":\"Line 1\\nLine 2\"}"));
    let base = api.spawn().await;

    let text = client(&base, RequestFlow::Inline)
        .recognize(&candidate())
        .await
        .unwrap();
    assert_eq!(text, "Line 1\nLine 2");
}

#[tokio::test]
async fn null_response_is_no_content() {
    let api = FakeApi::responding(serde_json::Value::Null);
    let base = api.spawn().await;

    let err = client(&base, RequestFlow::Inline)
        .recognize(&candidate())
        .await
        .unwrap_err();
    assert!(matches!(err, OcrError::Format(_)));
    assert_eq!(err.to_string(), "no response content");
}

// ── Flow B: upload then run ──────────────────────────────────────────

#[tokio::test]
async fn upload_flow_uploads_then_references_file() {
    let api = FakeApi::responding(json!("plain words"));
    let base = api.spawn().await;

    let text = client(&base, RequestFlow::UploadThenRun)
        .recognize(&candidate())
        .await
        .unwrap();
    assert_eq!(text, "plain words");

    let seen = api.seen();
    assert_eq!(seen.auth_headers.len(), 2);
    assert!(seen.auth_headers.iter().all(|h| h == "Bearer test-token"));

    let fields = &seen.uploads[0];
    let file = fields.iter().find(|f| f.name == "file").unwrap();
    assert_eq!(file.file_name.as_deref(), Some("receipt.png"));
    assert_eq!(file.content_type.as_deref(), Some("image/png"));
    assert_eq!(file.data, png_bytes());
    let user = fields.iter().find(|f| f.name == "user").unwrap();
    assert_eq!(user.data, b"ocr-web");

    let image = &seen.run_bodies[0]["inputs"]["image"];
    assert_eq!(image["transfer_method"], "local_file");
    assert_eq!(image["upload_file_id"], "file-123");
    assert_eq!(image["type"], "image");
}

#[tokio::test]
async fn upload_flow_coerces_objects_to_compact_json() {
    let api = FakeApi::responding(json!({ "fields": { "total": 12 } }));
    let base = api.spawn().await;

    let text = client(&base, RequestFlow::UploadThenRun)
        .recognize(&candidate())
        .await
        .unwrap();
    assert_eq!(text, r#"{"fields":{"total":12}}"#);
}

#[tokio::test]
async fn upload_rejection_stops_before_run() {
    let api = FakeApi::responding(json!("unused"))
        .upload_reply(StatusCode::PAYLOAD_TOO_LARGE, "too big");
    let base = api.spawn().await;

    let err = client(&base, RequestFlow::UploadThenRun)
        .recognize(&candidate())
        .await
        .unwrap_err();
    match err {
        OcrError::Upload { status, reason } => {
            assert_eq!(status, 413);
            assert_eq!(reason, "Payload Too Large");
        }
        other => panic!("expected upload error, got {:?}", other),
    }
    assert!(api.seen().run_bodies.is_empty());
}

#[tokio::test]
async fn upload_reply_without_id_is_format_error() {
    let api = FakeApi::responding(json!("unused")).upload_reply(StatusCode::OK, "{}");
    let base = api.spawn().await;

    let err = client(&base, RequestFlow::UploadThenRun)
        .recognize(&candidate())
        .await
        .unwrap_err();
    assert!(matches!(err, OcrError::Format(_)));
    assert!(api.seen().run_bodies.is_empty());
}

#[tokio::test]
async fn transcoded_upload_is_jpeg() {
    let api = FakeApi::responding(json!("ok"));
    let base = api.spawn().await;

    let mut config = ScenarioConfig::new(&base, "test-token");
    config.flow = RequestFlow::UploadThenRun;
    config.transcode_jpeg = true;
    ScenarioClient::new(config)
        .unwrap()
        .recognize(&candidate())
        .await
        .unwrap();

    let seen = api.seen();
    let file = seen.uploads[0].iter().find(|f| f.name == "file").unwrap();
    assert_eq!(file.content_type.as_deref(), Some("image/jpeg"));
    assert_eq!(&file.data[..2], &[0xFF, 0xD8]);
}

// ── Failures ─────────────────────────────────────────────────────────

#[tokio::test]
async fn run_failure_reports_status_and_reason() {
    let api = FakeApi::with_run_reply(StatusCode::INTERNAL_SERVER_ERROR, "boom");
    let base = api.spawn().await;

    let err = client(&base, RequestFlow::Inline)
        .recognize(&candidate())
        .await
        .unwrap_err();
    assert!(matches!(err, OcrError::Api { status: 500, .. }));
    assert_eq!(err.to_string(), "API error: 500 Internal Server Error");
}

#[tokio::test]
async fn non_json_reply_is_format_error() {
    let api = FakeApi::with_run_reply(StatusCode::OK, "<html>gateway</html>");
    let base = api.spawn().await;

    let err = client(&base, RequestFlow::Inline)
        .recognize(&candidate())
        .await
        .unwrap_err();
    assert!(matches!(err, OcrError::Format(_)));
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = client(&base, RequestFlow::Inline)
        .recognize(&candidate())
        .await
        .unwrap_err();
    assert!(matches!(err, OcrError::Network(_)));
}

#[test]
fn endpoints_hang_off_api_base() {
    let config = ScenarioConfig::new("http://localhost", "t");
    assert_eq!(config.upload_url(), "http://localhost/v1/files/upload");
    assert_eq!(config.run_url(), "http://localhost/v1/scenarios/run");
}
