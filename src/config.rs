//! Configuration management for the chat relay
//!
//! Configuration is loaded from environment variables once at startup.

use anyhow::{Context, Result};
use std::env;
use thiserror::Error;

use crate::chat::ModelCatalog;

/// Default Gemini REST endpoint
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default request body limit (25 MiB, room for several inline images)
pub const DEFAULT_MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    /// Gemini API base URL
    pub gemini_api_url: String,
    /// Gemini API key; requests fail with a configuration error without it
    pub gemini_api_key: Option<String>,

    /// Model id per tier
    pub models: ModelCatalog,

    /// Maximum accepted request body size
    pub max_body_bytes: usize,

    /// Include debug details in error responses (development only)
    pub debug_enabled: bool,
}

/// Why the provider credential cannot be used
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("GEMINI_API_KEY is not set")]
    Missing,

    #[error("GEMINI_API_KEY is malformed: {0}")]
    Malformed(&'static str),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            gemini_api_url: DEFAULT_GEMINI_API_URL.to_string(),
            gemini_api_key: None,
            models: ModelCatalog::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            debug_enabled: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let catalog = ModelCatalog::default();

        Ok(Self {
            host: env::var("RELAY_HOST").unwrap_or(defaults.host),
            port: env::var("RELAY_PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse()
                .context("Invalid RELAY_PORT")?,

            gemini_api_url: env::var("GEMINI_API_URL").unwrap_or(defaults.gemini_api_url),
            gemini_api_key: env::var("GEMINI_API_KEY").ok(),

            models: ModelCatalog {
                pro: env::var("GEMINI_MODEL_PRO").unwrap_or(catalog.pro),
                smart: env::var("GEMINI_MODEL_SMART").unwrap_or(catalog.smart),
                internet: env::var("GEMINI_MODEL_INTERNET").unwrap_or(catalog.internet),
            },

            max_body_bytes: env::var("RELAY_MAX_BODY_BYTES")
                .unwrap_or_else(|_| defaults.max_body_bytes.to_string())
                .parse()
                .context("Invalid RELAY_MAX_BODY_BYTES")?,

            debug_enabled: env::var("RELAY_DEBUG")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        })
    }

    /// The provider credential, if present and well-formed.
    ///
    /// Well-formed means non-empty after trimming and made of visible ASCII
    /// only, so it can travel in an HTTP header.
    pub fn provider_credential(&self) -> Result<&str, CredentialError> {
        let key = self
            .gemini_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(CredentialError::Missing)?;

        if !key.chars().all(|c| c.is_ascii_graphic()) {
            return Err(CredentialError::Malformed(
                "must contain only visible ASCII characters",
            ));
        }

        Ok(key)
    }
}
