//! Error types for the chat relay
//!
//! Every failure that happens before the event stream starts is turned into
//! a JSON response here. Failures after that point travel inside the stream.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::chat::{ContentError, Tier, ValidationError};
use crate::config::CredentialError;
use crate::proxy::ProviderError;

/// Generic message returned for upstream failures
pub const UPSTREAM_FAILURE_MESSAGE: &str = "Failed to generate AI response";

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        hint: Option<String>,
        debug: Option<String>,
    },

    #[error("Bad request: {message}")]
    BadRequest {
        message: String,
        hint: Option<String>,
        debug: Option<String>,
    },

    #[error("Upstream error: {source}")]
    Upstream { source: ProviderError, tier: Tier },
}

/// Classification of upstream failures by their message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamErrorKind {
    Credential,
    Quota,
    Network,
    Generic,
}

impl UpstreamErrorKind {
    /// Classify an upstream error message.
    ///
    /// Checks run in order; the first match wins.
    pub fn classify(message: &str) -> Self {
        if message.contains("API key") {
            UpstreamErrorKind::Credential
        } else if message.contains("quota") || message.contains("limit") {
            UpstreamErrorKind::Quota
        } else if message.contains("network") || message.contains("fetch") {
            UpstreamErrorKind::Network
        } else {
            UpstreamErrorKind::Generic
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            UpstreamErrorKind::Credential => StatusCode::UNAUTHORIZED,
            UpstreamErrorKind::Quota => StatusCode::TOO_MANY_REQUESTS,
            UpstreamErrorKind::Network => StatusCode::SERVICE_UNAVAILABLE,
            UpstreamErrorKind::Generic => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Body for configuration and validation failures
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<String>,
}

/// Body for upstream failures
#[derive(Debug, Serialize)]
pub struct UpstreamErrorResponse {
    pub error: String,
    pub details: String,
    pub timestamp: String,
    pub hint: String,
}

impl AppError {
    pub fn configuration(message: impl Into<String>, hint: impl Into<String>) -> Self {
        AppError::Configuration {
            message: message.into(),
            hint: Some(hint.into()),
            debug: None,
        }
    }

    pub fn bad_request(message: impl Into<String>, hint: impl Into<String>) -> Self {
        AppError::BadRequest {
            message: message.into(),
            hint: Some(hint.into()),
            debug: None,
        }
    }

    pub fn upstream(source: ProviderError, tier: Tier) -> Self {
        AppError::Upstream { source, tier }
    }

    /// Attach debug detail, only kept when debug output is enabled
    pub fn with_debug(mut self, enabled: bool, detail: impl std::fmt::Display) -> Self {
        if enabled {
            match &mut self {
                AppError::Configuration { debug, .. } | AppError::BadRequest { debug, .. } => {
                    *debug = Some(detail.to_string());
                }
                AppError::Upstream { .. } => {}
            }
        }
        self
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Upstream { source, .. } => {
                UpstreamErrorKind::classify(&source.to_string()).status_code()
            }
        }
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        AppError::configuration(
            err.to_string(),
            "Set GEMINI_API_KEY in the server environment and restart the service.",
        )
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        let hint = err.hint();
        AppError::bad_request(err.to_string(), hint)
    }
}

impl From<ContentError> for AppError {
    fn from(err: ContentError) -> Self {
        AppError::bad_request(
            err.to_string(),
            "Send images as base64 strings, optionally prefixed with a data URI header.",
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self {
            AppError::Configuration { message, hint, debug }
            | AppError::BadRequest { message, hint, debug } => {
                (status, Json(ErrorResponse { error: message, hint, debug })).into_response()
            }
            AppError::Upstream { source, tier } => {
                let body = UpstreamErrorResponse {
                    error: UPSTREAM_FAILURE_MESSAGE.to_string(),
                    details: source.to_string(),
                    timestamp: chrono::Utc::now().to_rfc3339(),
                    hint: tier.remediation_hint().to_string(),
                };
                (status, Json(body)).into_response()
            }
        }
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
