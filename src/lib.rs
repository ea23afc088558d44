//! Chat relay - streaming chat endpoint in front of the Gemini API
//!
//! This library provides the core functionality for the relay server.
//! It validates chat requests, selects a model tier, calls the provider's
//! streaming API and relays the generated text as server-sent events.

pub mod chat;
pub mod config;
pub mod error;
pub mod proxy;
pub mod routes;
pub mod streaming;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;

pub use crate::config::Config;
pub use crate::error::{AppError, AppResult};
pub use crate::proxy::{AiProvider, GeminiProvider};
pub use crate::routes::create_router;

/// Application state shared across all request handlers
pub struct AppState {
    pub config: Config,
    pub start_time: Instant,
    /// AI provider for forwarding generation requests
    pub ai_provider: Arc<dyn AiProvider>,
}

impl AppState {
    /// Create a new application state backed by the Gemini API
    pub fn new(config: Config) -> Result<Self> {
        // No overall timeout: a response stays open for as long as the model streams
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(100)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let ai_provider: Arc<dyn AiProvider> =
            Arc::new(GeminiProvider::new(http_client, &config));

        Ok(Self::with_provider(config, ai_provider))
    }

    /// Create an application state around an existing provider
    pub fn with_provider(config: Config, ai_provider: Arc<dyn AiProvider>) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            ai_provider,
        }
    }
}
