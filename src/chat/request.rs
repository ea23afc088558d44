//! Incoming chat request
//!
//! The wire shape accepted by `POST /api/chat` and its validation.

use serde::Deserialize;
use thiserror::Error;

use super::model::Tier;

/// Maximum message length, in characters
pub const MAX_MESSAGE_CHARS: usize = 100_000;

/// Chat request body as sent by the client
///
/// `message` is kept as a raw JSON value so that a missing message and a
/// message of the wrong type can be reported separately.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<serde_json::Value>,
    /// Legacy single image (base64, optionally a data URI)
    #[serde(default)]
    pub image: Option<String>,
    /// Ordered images (base64, optionally data URIs)
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub use_grounding: Option<bool>,
    #[serde(default)]
    pub ai_model: Option<String>,
}

/// Message validation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Message is required")]
    MissingMessage,

    #[error("Message must be a string")]
    MessageNotString,

    #[error("Message must not be empty")]
    EmptyMessage,

    #[error("Message is too long ({length} characters, maximum is {max})")]
    MessageTooLong { length: usize, max: usize },
}

impl ValidationError {
    /// Client-facing hint for fixing the request
    pub fn hint(&self) -> &'static str {
        match self {
            ValidationError::MissingMessage => "Include a \"message\" field in the JSON body.",
            ValidationError::MessageNotString | ValidationError::EmptyMessage => {
                "\"message\" must be a non-empty string."
            }
            ValidationError::MessageTooLong { .. } => {
                "Shorten the message to 100000 characters or fewer."
            }
        }
    }
}

/// A request that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedChat {
    pub message: String,
    /// Images to attach, already resolved between `images` and `image`
    pub images: Vec<String>,
    pub use_grounding: bool,
    pub tier: Tier,
}

impl ChatRequest {
    /// Validate the message and resolve defaults.
    pub fn validate(self) -> Result<ValidatedChat, ValidationError> {
        let message = match self.message {
            None => return Err(ValidationError::MissingMessage),
            Some(serde_json::Value::String(message)) => message,
            Some(_) => return Err(ValidationError::MessageNotString),
        };

        if message.is_empty() {
            return Err(ValidationError::EmptyMessage);
        }

        let length = message.chars().count();
        if length > MAX_MESSAGE_CHARS {
            return Err(ValidationError::MessageTooLong {
                length,
                max: MAX_MESSAGE_CHARS,
            });
        }

        // `images` wins over the legacy `image` field; an empty array falls through
        let images = match (self.images, self.image) {
            (Some(images), _) if !images.is_empty() => images,
            (_, Some(image)) if !image.is_empty() => vec![image],
            _ => Vec::new(),
        };

        Ok(ValidatedChat {
            message,
            images,
            use_grounding: self.use_grounding.unwrap_or(true),
            tier: Tier::from_label(self.ai_model.as_deref()),
        })
    }
}
