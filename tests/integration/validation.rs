//! Request validation integration tests
//!
//! Every rejected request answers 400 with `{error, hint}` and never
//! reaches the provider.

use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::common::TestHarness;

/// Post a JSON body and check it is rejected before any upstream call
async fn assert_rejected(harness: &TestHarness, body: Value) -> Value {
    let response = harness.server.post("/api/chat").json(&body).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "body: {}", body);
    assert_eq!(harness.gemini.request_count().await, 0);

    let error: Value = response.json();
    assert!(error["error"].is_string());
    assert!(error["hint"].is_string());
    error
}

#[tokio::test]
async fn test_missing_message() {
    let harness = TestHarness::new().await;

    let error = assert_rejected(&harness, json!({ "aiModel": "pro" })).await;
    assert_eq!(error["error"], "Message is required");

    let error = assert_rejected(&harness, json!({ "message": null })).await;
    assert_eq!(error["error"], "Message is required");
}

#[tokio::test]
async fn test_non_string_message() {
    let harness = TestHarness::new().await;

    for message in [json!(42), json!(["hi"]), json!({ "text": "hi" }), json!(true)] {
        let error = assert_rejected(&harness, json!({ "message": message })).await;
        assert_eq!(error["error"], "Message must be a string");
    }
}

#[tokio::test]
async fn test_empty_message() {
    let harness = TestHarness::new().await;

    let error = assert_rejected(&harness, json!({ "message": "" })).await;
    assert_eq!(error["error"], "Message must not be empty");
}

#[tokio::test]
async fn test_message_length_limit() {
    let harness = TestHarness::new().await;
    let too_long = "a".repeat(chat_relay::chat::MAX_MESSAGE_CHARS + 1);

    let error = assert_rejected(&harness, json!({ "message": too_long })).await;
    assert!(error["error"].as_str().unwrap().contains("too long"));
}

#[tokio::test]
async fn test_message_at_limit_is_accepted() {
    let harness = TestHarness::new().await;
    harness
        .gemini
        .mock_stream(crate::common::constants::SMART_MODEL, &["ok"])
        .await;

    // Multi-byte characters: the limit counts characters, not bytes
    let at_limit = "é".repeat(chat_relay::chat::MAX_MESSAGE_CHARS);
    let response = harness
        .server
        .post("/api/chat")
        .json(&json!({ "message": at_limit }))
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_malformed_json() {
    let harness = TestHarness::new().await;

    let response = harness.server.post("/api/chat").text("{\"message\": ").await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let error: Value = response.json();
    assert_eq!(error["error"], "Invalid JSON in request body");
    assert!(error.get("debug").is_none());
    assert_eq!(harness.gemini.request_count().await, 0);
}

#[tokio::test]
async fn test_malformed_json_includes_debug_when_enabled() {
    let harness = TestHarness::with_config(|config| config.debug_enabled = true).await;

    let response = harness.server.post("/api/chat").text("not json").await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let error: Value = response.json();
    assert!(error["debug"].is_string());
}

#[tokio::test]
async fn test_wrongly_typed_options() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .post("/api/chat")
        .json(&json!({ "message": "hi", "useGrounding": "yes" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = harness
        .server
        .post("/api/chat")
        .json(&json!({ "message": "hi", "aiModel": 3 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    assert_eq!(harness.gemini.request_count().await, 0);
}

#[tokio::test]
async fn test_invalid_image_data() {
    let harness = TestHarness::new().await;

    let error = assert_rejected(
        &harness,
        json!({ "message": "look", "images": ["aGVsbG8=", "***not base64***"] }),
    )
    .await;
    assert!(error["error"].as_str().unwrap().contains("Image 1"));
}

#[tokio::test]
async fn test_body_over_limit() {
    let harness = TestHarness::with_config(|config| config.max_body_bytes = 64).await;

    let response = harness
        .server
        .post("/api/chat")
        .json(&json!({ "message": "x".repeat(200) }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let error: Value = response.json();
    assert_eq!(error["error"], "Failed to read request body");
    assert_eq!(harness.gemini.request_count().await, 0);
}
