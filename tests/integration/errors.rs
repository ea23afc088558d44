//! Error mapping integration tests
//!
//! - Missing or malformed credential: 500 before any upstream call
//! - Upstream failures before the stream opens: classified status with
//!   `{error, details, timestamp, hint}`

use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::common::{constants, TestHarness};

async fn post_chat(harness: &TestHarness, ai_model: &str) -> (StatusCode, Value) {
    let response = harness
        .server
        .post("/api/chat")
        .json(&json!({ "message": "hi", "aiModel": ai_model }))
        .await;
    (response.status_code(), response.json())
}

// =============================================================================
// Configuration
// =============================================================================

#[tokio::test]
async fn test_missing_credential() {
    let harness = TestHarness::with_config(|config| config.gemini_api_key = None).await;

    let (status, body) = post_chat(&harness, "smart").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("GEMINI_API_KEY"));
    assert!(body["hint"].is_string());
    assert_eq!(harness.gemini.request_count().await, 0);
}

#[tokio::test]
async fn test_blank_credential() {
    let harness =
        TestHarness::with_config(|config| config.gemini_api_key = Some("   ".to_string())).await;

    let (status, _) = post_chat(&harness, "smart").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(harness.gemini.request_count().await, 0);
}

#[tokio::test]
async fn test_malformed_credential() {
    let harness =
        TestHarness::with_config(|config| config.gemini_api_key = Some("key with spaces".to_string()))
            .await;

    let (status, body) = post_chat(&harness, "smart").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("malformed"));
    assert_eq!(harness.gemini.request_count().await, 0);
}

#[tokio::test]
async fn test_invalid_model_id() {
    let harness = TestHarness::with_config(|config| {
        config.models.smart = "bad model/id".to_string();
    })
    .await;

    let (status, body) = post_chat(&harness, "smart").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to initialize AI model");
    assert_eq!(harness.gemini.request_count().await, 0);
}

// =============================================================================
// Upstream classification
// =============================================================================

#[tokio::test]
async fn test_invalid_api_key_maps_to_401() {
    let harness = TestHarness::new().await;
    harness
        .gemini
        .mock_error(
            constants::SMART_MODEL,
            400,
            "API key not valid. Please pass a valid API key.",
        )
        .await;

    let (status, body) = post_chat(&harness, "smart").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Failed to generate AI response");
    assert!(body["details"].as_str().unwrap().contains("API key not valid"));
    assert!(chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());
    assert!(body["hint"].is_string());
}

#[tokio::test]
async fn test_quota_maps_to_429() {
    let harness = TestHarness::new().await;
    harness
        .gemini
        .mock_error(
            constants::PRO_MODEL,
            429,
            "Resource has been exhausted (e.g. check quota).",
        )
        .await;

    let (status, body) = post_chat(&harness, "pro").await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    // The hint depends on the tier
    assert_eq!(body["hint"], chat_relay::chat::Tier::Pro.remediation_hint());
}

#[tokio::test]
async fn test_unreachable_provider_maps_to_503() {
    // Nothing listens on the discard port
    let harness = TestHarness::with_config(|config| {
        config.gemini_api_url = "http://127.0.0.1:9".to_string();
    })
    .await;

    let (status, body) = post_chat(&harness, "smart").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "Failed to generate AI response");
}

#[tokio::test]
async fn test_other_upstream_errors_map_to_500() {
    let harness = TestHarness::new().await;
    harness
        .gemini
        .mock_error(constants::SMART_MODEL, 500, "Internal error encountered.")
        .await;

    let (status, body) = post_chat(&harness, "smart").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("Internal error encountered."));
}
