//! End-to-end tests for the transcription endpoint.
//!
//! The OpenAI backend is replaced with wiremock, so these tests exercise
//! the full request path: multipart parsing, validation, temporary storage,
//! both remote calls, result persistence, and cleanup.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, body::Body, http::Request};
use serde_json::{Value, json};
use tower::util::ServiceExt;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use scribe_gateway::{ServerConfig, routes, state::AppState};

const BOUNDARY: &str = "scribe-test-boundary-4f9a";

fn test_config(base_url: &str, upload: &Path, result: &Path, dictionary: &Path) -> ServerConfig {
    ServerConfig {
        openai_base_url: base_url.to_string(),
        upload_dir: upload.to_path_buf(),
        result_dir: result.to_path_buf(),
        dictionary_path: dictionary.to_path_buf(),
        ..ServerConfig::default()
    }
}

fn build_app(config: ServerConfig) -> Router {
    let state = Arc::new(AppState::new(config).unwrap());
    routes::api::create_api_router().with_state(state)
}

/// Hand-rolled multipart encoder so tests control the exact wire form.
struct FormBuilder {
    body: Vec<u8>,
}

impl FormBuilder {
    fn new() -> Self {
        Self { body: Vec::new() }
    }

    fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\ncontent-disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\ncontent-disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\ncontent-type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn build(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

fn transcribe_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/transcribe")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn mount_transcription_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "text": "こんにちは 次の議題に移ります",
            "segments": [
                { "start": 0.0, "text": " こんにちは" },
                { "start": 65.2, "text": " 次の議題に移ります" }
            ]
        })))
        .mount(server)
        .await;
}

async fn mount_correction_ok(server: &MockServer, corrected: &str) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [
                { "message": { "role": "assistant", "content": corrected } }
            ]
        })))
        .mount(server)
        .await;
}

fn dir_entry_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

#[tokio::test]
async fn missing_api_key_is_rejected_before_anything_is_stored() {
    let uploads = tempfile::tempdir().unwrap();
    let results = tempfile::tempdir().unwrap();
    let app = build_app(test_config(
        "http://127.0.0.1:1",
        uploads.path(),
        results.path(),
        Path::new("/nonexistent/dictionary.json"),
    ));

    let body = FormBuilder::new()
        .file("file", "meeting.mp3", "audio/mpeg", b"fake-audio")
        .build();
    let response = app.oneshot(transcribe_request(body)).await.unwrap();

    assert_eq!(response.status(), 400);
    let json = response_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("APIキー"));
    assert_eq!(dir_entry_count(uploads.path()), 0);
}

#[tokio::test]
async fn missing_file_is_rejected() {
    let uploads = tempfile::tempdir().unwrap();
    let results = tempfile::tempdir().unwrap();
    let app = build_app(test_config(
        "http://127.0.0.1:1",
        uploads.path(),
        results.path(),
        Path::new("/nonexistent/dictionary.json"),
    ));

    let body = FormBuilder::new().text("openai_api_key", "sk-test").build();
    let response = app.oneshot(transcribe_request(body)).await.unwrap();

    assert_eq!(response.status(), 400);
    let json = response_json(response).await;
    assert!(
        json["error"]
            .as_str()
            .unwrap()
            .contains("アップロードされていません")
    );
}

#[tokio::test]
async fn unsupported_format_is_rejected() {
    let uploads = tempfile::tempdir().unwrap();
    let results = tempfile::tempdir().unwrap();
    let app = build_app(test_config(
        "http://127.0.0.1:1",
        uploads.path(),
        results.path(),
        Path::new("/nonexistent/dictionary.json"),
    ));

    let body = FormBuilder::new()
        .text("openai_api_key", "sk-test")
        .file("file", "notes.txt", "text/plain", b"just text")
        .build();
    let response = app.oneshot(transcribe_request(body)).await.unwrap();

    assert_eq!(response.status(), 400);
    let json = response_json(response).await;
    assert!(
        json["error"]
            .as_str()
            .unwrap()
            .contains("対応していないファイル形式")
    );
    assert_eq!(dir_entry_count(uploads.path()), 0);
}

#[tokio::test]
async fn empty_file_is_rejected() {
    let uploads = tempfile::tempdir().unwrap();
    let results = tempfile::tempdir().unwrap();
    let app = build_app(test_config(
        "http://127.0.0.1:1",
        uploads.path(),
        results.path(),
        Path::new("/nonexistent/dictionary.json"),
    ));

    let body = FormBuilder::new()
        .text("openai_api_key", "sk-test")
        .file("file", "meeting.mp3", "audio/mpeg", b"")
        .build();
    let response = app.oneshot(transcribe_request(body)).await.unwrap();

    assert_eq!(response.status(), 400);
    assert_eq!(dir_entry_count(uploads.path()), 0);
}

#[tokio::test]
async fn full_pipeline_persists_result_and_cleans_up() {
    let server = MockServer::start().await;
    mount_transcription_ok(&server).await;
    mount_correction_ok(&server, "【議事録】\n[00:00] こんにちは\n[01:05] 次の議題に移ります").await;

    let uploads = tempfile::tempdir().unwrap();
    let results = tempfile::tempdir().unwrap();
    let app = build_app(test_config(
        &server.uri(),
        uploads.path(),
        results.path(),
        Path::new("/nonexistent/dictionary.json"),
    ));

    let body = FormBuilder::new()
        .text("openai_api_key", "sk-test")
        .file("file", "meeting.mp3", "audio/mpeg", b"fake-audio-bytes")
        .build();
    let response = app.oneshot(transcribe_request(body)).await.unwrap();

    assert_eq!(response.status(), 200);
    let json = response_json(response).await;
    assert_eq!(json["success"], json!(true));
    assert!(
        json["filename"]
            .as_str()
            .unwrap()
            .ends_with("_result.txt")
    );
    assert!(json["text"].as_str().unwrap().contains("議事録"));
    assert!(json["processing_time"].as_f64().unwrap() >= 0.0);

    // The corrected text was persisted under {uuid}_result.txt.
    let entries: Vec<_> = std::fs::read_dir(results.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(entries.len(), 1);
    assert!(
        entries[0]
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .ends_with("_result.txt")
    );
    let persisted = std::fs::read_to_string(&entries[0]).unwrap();
    assert!(persisted.contains("[01:05]"));

    // The temporary upload is gone.
    assert_eq!(dir_entry_count(uploads.path()), 0);
}

#[tokio::test]
async fn upstream_rejection_maps_to_bad_gateway_and_still_cleans_up() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": { "message": "The server had an error processing your request" }
        })))
        .mount(&server)
        .await;

    let uploads = tempfile::tempdir().unwrap();
    let results = tempfile::tempdir().unwrap();
    let app = build_app(test_config(
        &server.uri(),
        uploads.path(),
        results.path(),
        Path::new("/nonexistent/dictionary.json"),
    ));

    let body = FormBuilder::new()
        .text("openai_api_key", "sk-test")
        .file("file", "meeting.mp3", "audio/mpeg", b"fake-audio")
        .build();
    let response = app.oneshot(transcribe_request(body)).await.unwrap();

    assert_eq!(response.status(), 502);
    assert_eq!(dir_entry_count(uploads.path()), 0);
    assert_eq!(dir_entry_count(results.path()), 0);
}

#[tokio::test]
async fn invalid_key_rejection_carries_a_key_hint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Incorrect API key provided" }
        })))
        .mount(&server)
        .await;

    let uploads = tempfile::tempdir().unwrap();
    let results = tempfile::tempdir().unwrap();
    let app = build_app(test_config(
        &server.uri(),
        uploads.path(),
        results.path(),
        Path::new("/nonexistent/dictionary.json"),
    ));

    let body = FormBuilder::new()
        .text("openai_api_key", "sk-wrong")
        .file("file", "meeting.mp3", "audio/mpeg", b"fake-audio")
        .build();
    let response = app.oneshot(transcribe_request(body)).await.unwrap();

    assert_eq!(response.status(), 502);
    let json = response_json(response).await;
    let message = json["error"].as_str().unwrap();
    assert!(message.contains("APIキー"));
    // Upstream wording never leaks through.
    assert!(!message.contains("Incorrect API key"));
}

#[tokio::test]
async fn slow_upstream_maps_to_gateway_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(5))
                .set_body_json(json!({ "text": "too late", "segments": [] })),
        )
        .mount(&server)
        .await;

    let uploads = tempfile::tempdir().unwrap();
    let results = tempfile::tempdir().unwrap();
    let mut config = test_config(
        &server.uri(),
        uploads.path(),
        results.path(),
        Path::new("/nonexistent/dictionary.json"),
    );
    config.transcription_timeout_secs = 1;
    let app = build_app(config);

    let body = FormBuilder::new()
        .text("openai_api_key", "sk-test")
        .file("file", "meeting.mp3", "audio/mpeg", b"fake-audio")
        .build();
    let response = app.oneshot(transcribe_request(body)).await.unwrap();

    assert_eq!(response.status(), 504);
    let json = response_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("タイムアウト"));
    assert_eq!(dir_entry_count(uploads.path()), 0);
}

#[tokio::test]
async fn dictionary_terms_reach_the_correction_prompt() {
    let server = MockServer::start().await;
    mount_transcription_ok(&server).await;
    // Only match a correction request whose prompt carries the dictionary
    // entry; the test fails with 502 if the term never arrives.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("リハビリ"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [ { "message": { "role": "assistant", "content": "整形済み" } } ]
        })))
        .mount(&server)
        .await;

    let dict_dir = tempfile::tempdir().unwrap();
    let dict_path = dict_dir.path().join("dictionary.json");
    std::fs::write(&dict_path, r#"{"りは": "リハビリ"}"#).unwrap();

    let uploads = tempfile::tempdir().unwrap();
    let results = tempfile::tempdir().unwrap();
    let app = build_app(test_config(
        &server.uri(),
        uploads.path(),
        results.path(),
        &dict_path,
    ));

    let body = FormBuilder::new()
        .text("openai_api_key", "sk-test")
        .file("file", "meeting.mp3", "audio/mpeg", b"fake-audio")
        .build();
    let response = app.oneshot(transcribe_request(body)).await.unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn corrupt_dictionary_does_not_fail_the_request() {
    let server = MockServer::start().await;
    mount_transcription_ok(&server).await;
    mount_correction_ok(&server, "整形済み").await;

    let dict_dir = tempfile::tempdir().unwrap();
    let dict_path = dict_dir.path().join("dictionary.json");
    std::fs::write(&dict_path, "{broken json").unwrap();

    let uploads = tempfile::tempdir().unwrap();
    let results = tempfile::tempdir().unwrap();
    let app = build_app(test_config(
        &server.uri(),
        uploads.path(),
        results.path(),
        &dict_path,
    ));

    let body = FormBuilder::new()
        .text("openai_api_key", "sk-test")
        .file("file", "meeting.mp3", "audio/mpeg", b"fake-audio")
        .build();
    let response = app.oneshot(transcribe_request(body)).await.unwrap();

    assert_eq!(response.status(), 200);
    let json = response_json(response).await;
    assert_eq!(json["text"], json!("整形済み"));
}

#[tokio::test]
async fn file_type_hint_does_not_affect_validation() {
    let server = MockServer::start().await;
    mount_transcription_ok(&server).await;
    mount_correction_ok(&server, "整形済み").await;

    let uploads = tempfile::tempdir().unwrap();
    let results = tempfile::tempdir().unwrap();
    let config = test_config(
        &server.uri(),
        uploads.path(),
        results.path(),
        Path::new("/nonexistent/dictionary.json"),
    );

    // The part declares an allow-listed type and there is no usable
    // extension; the hint carries the frontend's extension-style value and
    // must not defeat the MIME check.
    let body = FormBuilder::new()
        .text("openai_api_key", "sk-test")
        .text("file_type", "m4a")
        .file("file", "recording", "audio/mpeg", b"fake-audio")
        .build();
    let response = build_app(config.clone())
        .oneshot(transcribe_request(body))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // Conversely the hint cannot rescue an upload both checks reject.
    let body = FormBuilder::new()
        .text("openai_api_key", "sk-test")
        .text("file_type", "audio/webm")
        .file("file", "recording.bin", "application/x-unknown", b"fake-audio")
        .build();
    let response = build_app(config)
        .oneshot(transcribe_request(body))
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn oversized_upload_is_rejected_with_an_error_body() {
    let uploads = tempfile::tempdir().unwrap();
    let results = tempfile::tempdir().unwrap();
    let mut config = test_config(
        "http://127.0.0.1:1",
        uploads.path(),
        results.path(),
        Path::new("/nonexistent/dictionary.json"),
    );
    config.max_upload_bytes = 16;
    let app = build_app(config);

    let body = FormBuilder::new()
        .text("openai_api_key", "sk-test")
        .file("file", "meeting.mp3", "audio/mpeg", &[0u8; 64])
        .build();
    let response = app.oneshot(transcribe_request(body)).await.unwrap();

    assert_eq!(response.status(), 400);
    let json = response_json(response).await;
    assert!(json["error"].is_string());
    assert_eq!(dir_entry_count(uploads.path()), 0);
}
