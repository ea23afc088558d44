//! Gemini provider
//!
//! Calls `models/{model}:streamGenerateContent?alt=sse` and turns the SSE
//! body into a [`ChunkStream`].

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use tracing::{debug, error, info, instrument, warn};

use super::provider::{AiProvider, ChunkStream, ProviderError};
use super::types::{ApiErrorEnvelope, GenerateContentChunk, GenerateContentRequest};
use crate::config::Config;
use crate::streaming::{data_payload, SseLineBuffer};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini REST client
pub struct GeminiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GeminiProvider {
    /// Create a new Gemini client.
    ///
    /// A missing or malformed credential does not fail construction; the
    /// provider reports itself as unconfigured instead.
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.gemini_api_url.trim_end_matches('/').to_string(),
            api_key: config.provider_credential().ok().map(str::to_string),
        }
    }

    fn stream_url(&self, model: &str) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url, model
        )
    }

    fn headers(&self) -> Result<HeaderMap, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ProviderError::NotConfigured("GEMINI_API_KEY is not set".to_string())
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(
            API_KEY_HEADER,
            HeaderValue::from_str(api_key).map_err(|_| {
                ProviderError::NotConfigured(
                    "GEMINI_API_KEY is not a valid header value".to_string(),
                )
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl AiProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    #[instrument(skip(self, request), fields(provider = "gemini", tools = request.has_tools()))]
    async fn stream_generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<ChunkStream, ProviderError> {
        let url = self.stream_url(model);
        let headers = self.headers()?;

        debug!(url = %url, "Starting streaming request to Gemini");

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(url = %url, error = %e, "Failed to send request to Gemini");
                ProviderError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = upstream_error_message(&body);
            warn!(status = %status, error = %message, "Gemini rejected streaming request");
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        info!(model = %model, "Gemini stream opened");

        let mut body = response.bytes_stream();
        let stream = async_stream::stream! {
            let mut buffer = SseLineBuffer::new();
            let mut failed = false;

            'read: while let Some(item) = body.next().await {
                let piece = match item {
                    Ok(piece) => piece,
                    Err(e) => {
                        failed = true;
                        yield Err(ProviderError::Network(e.to_string()));
                        break 'read;
                    }
                };

                for line in buffer.feed(&piece) {
                    if let Some(parsed) = parse_sse_line(&line) {
                        failed = parsed.is_err();
                        yield parsed;
                        if failed {
                            break 'read;
                        }
                    }
                }
            }

            if !failed && buffer.has_incomplete() {
                debug!("Gemini stream ended without a trailing newline");
                if let Some(parsed) = buffer.finish().as_deref().and_then(parse_sse_line) {
                    yield parsed;
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

/// Parse one SSE line into a chunk. Non-data lines yield `None`.
fn parse_sse_line(line: &str) -> Option<Result<GenerateContentChunk, ProviderError>> {
    let payload = data_payload(line)?;
    if payload.is_empty() {
        return None;
    }

    // Errors after the stream opened arrive as an error envelope in a data frame
    if let Ok(envelope) = serde_json::from_str::<ApiErrorEnvelope>(payload) {
        warn!(
            code = ?envelope.error.code,
            status = ?envelope.error.status,
            "Gemini reported an error mid-stream"
        );
        return Some(Err(ProviderError::Api {
            status: envelope.error.code.unwrap_or(500),
            message: envelope.error.message,
        }));
    }

    Some(serde_json::from_str::<GenerateContentChunk>(payload).map_err(|e| {
        warn!(
            error = %e,
            line_len = payload.len(),
            "Failed to parse Gemini stream chunk"
        );
        ProviderError::InvalidResponse(format!("failed to parse stream chunk: {}", e))
    }))
}

/// Pull `error.message` out of a Gemini error body, falling back to the raw body.
fn upstream_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => {
            debug!(status = ?envelope.error.status, "Parsed Gemini error envelope");
            envelope.error.message
        }
        _ if body.trim().is_empty() => "empty error response".to_string(),
        _ => body.trim().to_string(),
    }
}
