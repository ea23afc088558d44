//! Content assembly
//!
//! Builds the provider request from a validated chat: one text part, then
//! the images in order, plus the grounding tool when selected.

use base64::{
    alphabet,
    engine::{general_purpose::STANDARD, DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use thiserror::Error;

use super::model::ModelSelection;
use super::request::ValidatedChat;
use crate::proxy::{GenerateContentRequest, Part, Tool};

/// MIME type every attached image is sent with
pub const IMAGE_MIME_TYPE: &str = "image/jpeg";

/// Client images may arrive with or without padding
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("Image {index} is not valid base64: {reason}")]
    InvalidImage { index: usize, reason: String },
}

/// Strip an optional `data:<mime>;base64,` prefix.
fn strip_data_uri(raw: &str) -> &str {
    let raw = raw.trim();
    match raw.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map_or(rest, |(_, payload)| payload),
        None => raw,
    }
}

/// Decode one client image and re-encode it as an inline JPEG part.
pub fn image_part(index: usize, raw: &str) -> Result<Part, ContentError> {
    let payload: String = strip_data_uri(raw)
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        // URL-safe alphabet maps onto the standard one
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            c => c,
        })
        .collect();

    let bytes = LENIENT
        .decode(payload.as_bytes())
        .map_err(|e| ContentError::InvalidImage {
            index,
            reason: e.to_string(),
        })?;

    Ok(Part::inline(IMAGE_MIME_TYPE, STANDARD.encode(bytes)))
}

/// Ordered content parts: the message text followed by each image.
pub fn build_parts(chat: &ValidatedChat) -> Result<Vec<Part>, ContentError> {
    let mut parts = Vec::with_capacity(1 + chat.images.len());
    parts.push(Part::text(chat.message.as_str()));

    for (index, raw) in chat.images.iter().enumerate() {
        parts.push(image_part(index, raw)?);
    }

    Ok(parts)
}

/// Assemble the full generation request for a chat and model selection.
pub fn build_generate_request(
    chat: &ValidatedChat,
    selection: &ModelSelection,
) -> Result<GenerateContentRequest, ContentError> {
    let request = GenerateContentRequest::user(build_parts(chat)?);

    Ok(if selection.grounding {
        request.with_tools(vec![Tool::google_search()])
    } else {
        request
    })
}
