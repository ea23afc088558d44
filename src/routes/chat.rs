//! Chat streaming endpoint
//!
//! `POST /api/chat` validates the request, picks a model for the requested
//! tier, starts a streaming generation and relays the text to the client as
//! server-sent events.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderName},
    response::{IntoResponse, Response},
};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info, instrument, warn, Instrument, Span};

use crate::{
    chat::{build_generate_request, stream_with_fallback, ChatRequest},
    error::AppError,
    proxy::GenerativeModel,
    routes::metrics::{record_request, record_stream},
    streaming::{format_sse_event, relay_chunks},
    AppState,
};

/// Events buffered between the relay task and the response body
const RELAY_CHANNEL_CAPACITY: usize = 32;

const X_ACCEL_BUFFERING: HeaderName = HeaderName::from_static("x-accel-buffering");

/// Handle a chat request
///
/// # Request Format
///
/// ```json
/// {
///   "message": "What is in this picture?",  // Required, at most 100000 characters
///   "images": ["<base64>", "..."],          // Optional, sent in order
///   "image": "<base64>",                    // Optional legacy single image
///   "useGrounding": true,                   // Optional, defaults to true
///   "aiModel": "smart"                      // Optional: pro | smart | internet
/// }
/// ```
///
/// On success the body is a stream of `data: {json}\n\n` frames: token
/// events followed by one `{"done":true}` or `{"error":true,...}` event.
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn chat_stream(
    State(state): State<Arc<AppState>>,
    request: axum::extract::Request,
) -> Result<Response, AppError> {
    let start_time = Instant::now();
    let debug = state.config.debug_enabled;

    if let Err(e) = state.config.provider_credential() {
        error!(error = %e, "Chat request rejected, provider credential unusable");
        return Err(e.into());
    }
    if !state.ai_provider.is_configured() {
        error!(provider = state.ai_provider.name(), "AI provider client is not configured");
        return Err(AppError::configuration(
            "AI provider client is not configured",
            "Check the provider settings in the server environment.",
        ));
    }

    let body = axum::body::to_bytes(request.into_body(), state.config.max_body_bytes)
        .await
        .map_err(|e| {
            AppError::bad_request(
                "Failed to read request body",
                format!(
                    "Request bodies are limited to {} bytes.",
                    state.config.max_body_bytes
                ),
            )
            .with_debug(debug, e)
        })?;

    let chat_request: ChatRequest = serde_json::from_slice(&body).map_err(|e| {
        AppError::bad_request(
            "Invalid JSON in request body",
            "Send a JSON object with a \"message\" field.",
        )
        .with_debug(debug, e)
    })?;

    let chat = chat_request.validate().map_err(|e| {
        warn!(error = %e, "Chat request failed validation");
        AppError::from(e)
    })?;

    let selection = state.config.models.select(chat.tier, chat.use_grounding);

    let model =
        GenerativeModel::new(state.ai_provider.clone(), &selection.model_id).map_err(|e| {
            error!(model = %selection.model_id, error = %e, "Failed to build model handle");
            AppError::configuration(
                "Failed to initialize AI model",
                "Check the GEMINI_MODEL_* settings in the server environment.",
            )
            .with_debug(debug, e)
        })?;

    let generate_request = build_generate_request(&chat, &selection)?;

    info!(
        tier = %selection.tier,
        model = %model.model_id(),
        grounding = selection.grounding,
        images = chat.images.len(),
        message_chars = chat.message.chars().count(),
        "Processing chat request"
    );

    let upstream = match stream_with_fallback(&model, &generate_request).await {
        Ok(upstream) => upstream,
        Err(e) => {
            error!(model = %model.model_id(), error = %e, "Failed to start generation");
            record_request(
                "upstream_error",
                model.model_id(),
                start_time.elapsed().as_secs_f64(),
            );
            return Err(AppError::upstream(e, selection.tier));
        }
    };

    record_request("streaming", model.model_id(), start_time.elapsed().as_secs_f64());

    let (tx, rx) = mpsc::channel(RELAY_CHANNEL_CAPACITY);
    let model_id = model.model_id().to_string();

    tokio::spawn(
        async move {
            let outcome = relay_chunks(upstream, tx).await;
            record_stream(outcome.label(), outcome.tokens() as u64, &model_id);
            info!(
                model = %model_id,
                outcome = outcome.label(),
                tokens = outcome.tokens(),
                "Chat stream finished"
            );
        }
        .instrument(Span::current()),
    );

    let events = ReceiverStream::new(rx).map(|event| {
        if event.is_terminal() {
            debug!("Writing terminal stream event");
        }
        Ok::<_, Infallible>(format_sse_event(&event))
    });

    Ok((
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
            (X_ACCEL_BUFFERING, "no"),
        ],
        Body::from_stream(events),
    )
        .into_response())
}
