//! Common test utilities for the chat relay
//!
//! Provides the test harness (router plus mock Gemini server) and helpers
//! for reading event-stream bodies.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use serde_json::Value;

use chat_relay::config::Config;
use chat_relay::streaming::{data_payload, SseLineBuffer};
use chat_relay::{create_router, AiProvider, AppState, GeminiProvider};

use crate::mocks::MockGemini;

/// Test configuration constants
pub mod constants {
    /// API key the harness configures
    pub const TEST_GEMINI_API_KEY: &str = "test-gemini-api-key";
    pub const PRO_MODEL: &str = "gemini-2.5-pro";
    pub const SMART_MODEL: &str = "gemini-2.5-flash";
    pub const INTERNET_MODEL: &str = "gemini-1.5-flash";
}

/// Router wired to a mock Gemini server
pub struct TestHarness {
    pub server: TestServer,
    pub gemini: MockGemini,
}

impl TestHarness {
    /// Harness with a valid credential and default settings
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Harness whose config is adjusted before the app is built
    pub async fn with_config(customize: impl FnOnce(&mut Config)) -> Self {
        let gemini = MockGemini::start().await;

        let mut config = Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            gemini_api_url: gemini.uri(),
            gemini_api_key: Some(constants::TEST_GEMINI_API_KEY.to_string()),
            ..Config::default()
        };
        customize(&mut config);

        let provider: Arc<dyn AiProvider> =
            Arc::new(GeminiProvider::new(reqwest::Client::new(), &config));
        let state = Arc::new(AppState::with_provider(config, provider));
        let server = TestServer::new(create_router(state)).expect("Failed to create test server");

        Self { server, gemini }
    }
}

/// Split an event-stream body into its JSON events
pub fn parse_sse_events(body: &str) -> Vec<Value> {
    let mut buffer = SseLineBuffer::new();
    let mut lines = buffer.feed(body.as_bytes());
    lines.extend(buffer.finish());

    lines
        .iter()
        .filter_map(|line| data_payload(line))
        .map(|payload| serde_json::from_str(payload).expect("event payload is JSON"))
        .collect()
}

/// Concatenated token text of a parsed event list
pub fn collect_tokens(events: &[Value]) -> String {
    events
        .iter()
        .filter_map(|event| event.get("token").and_then(Value::as_str))
        .collect()
}
