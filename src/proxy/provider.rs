//! AI Provider abstraction layer
//!
//! Defines the trait the chat handler talks to, so the Gemini client can be
//! swapped for a scripted provider in tests.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

use super::types::{GenerateContentChunk, GenerateContentRequest};

/// Ordered stream of generation chunks from a provider
pub type ChunkStream =
    Pin<Box<dyn Stream<Item = Result<GenerateContentChunk, ProviderError>> + Send>>;

/// Errors raised by a provider call or while reading its stream
///
/// The display text is what the handler classifies and what ends up in
/// error events, so it carries the upstream wording verbatim.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Provider is not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid model identifier: {0}")]
    InvalidModel(String),

    #[error("Provider API error [{status}]: {message}")]
    Api { status: u16, message: String },

    #[error("Network error while trying to fetch from provider: {0}")]
    Network(String),

    #[error("{0}")]
    Blocked(String),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Trait defining the interface for generative AI providers
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Get the provider name for logging and metrics
    fn name(&self) -> &'static str;

    /// Whether the provider holds a usable credential
    fn is_configured(&self) -> bool;

    /// Start a streaming generation.
    ///
    /// Resolves once the provider has accepted the request; errors returned
    /// here happen before any chunk was produced.
    async fn stream_generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<ChunkStream, ProviderError>;
}

/// Handle on one model of a provider
#[derive(Clone)]
pub struct GenerativeModel {
    provider: Arc<dyn AiProvider>,
    model_id: String,
}

impl std::fmt::Debug for GenerativeModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerativeModel")
            .field("provider", &self.provider.name())
            .field("model_id", &self.model_id)
            .finish()
    }
}

impl GenerativeModel {
    /// Build a model handle.
    ///
    /// Accepts ids with or without the `models/` prefix.
    pub fn new(provider: Arc<dyn AiProvider>, model_id: &str) -> Result<Self, ProviderError> {
        let model_id = model_id.trim();
        let model_id = model_id.strip_prefix("models/").unwrap_or(model_id);

        if model_id.is_empty() {
            return Err(ProviderError::InvalidModel("model id is empty".to_string()));
        }
        if !model_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_'))
        {
            return Err(ProviderError::InvalidModel(format!(
                "'{}' contains unsupported characters",
                model_id
            )));
        }

        Ok(Self {
            provider,
            model_id: model_id.to_string(),
        })
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Start a streaming generation on this model
    pub async fn stream_generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<ChunkStream, ProviderError> {
        self.provider
            .stream_generate_content(&self.model_id, request)
            .await
    }
}
