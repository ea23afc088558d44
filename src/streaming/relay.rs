//! Chunk relay
//!
//! Moves provider chunks onto the client channel as [`StreamEvent`]s.

use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::StreamEvent;
use crate::proxy::ChunkStream;

/// How a relay ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Upstream finished; `Done` was sent (or the client left just before)
    Completed { tokens: usize },
    /// Upstream failed; an `Error` event was sent (or the client left just before)
    Failed { tokens: usize, message: String },
    /// A token could not be delivered because the client disconnected
    ClientGone { tokens: usize },
}

impl RelayOutcome {
    pub fn tokens(&self) -> usize {
        match self {
            RelayOutcome::Completed { tokens }
            | RelayOutcome::Failed { tokens, .. }
            | RelayOutcome::ClientGone { tokens } => *tokens,
        }
    }

    /// Metrics label
    pub fn label(&self) -> &'static str {
        match self {
            RelayOutcome::Completed { .. } => "completed",
            RelayOutcome::Failed { .. } => "failed",
            RelayOutcome::ClientGone { .. } => "client_gone",
        }
    }
}

/// Relay upstream chunks to `tx` until the stream ends, fails, or the
/// receiver is dropped.
///
/// Token events keep upstream order. At most one terminating event is sent
/// and nothing is sent after it; `tx` is dropped on return, which closes the
/// client stream. Send failures never propagate.
pub async fn relay_chunks(
    mut upstream: ChunkStream,
    tx: mpsc::Sender<StreamEvent>,
) -> RelayOutcome {
    let mut tokens = 0;

    while let Some(item) = upstream.next().await {
        let text = match item.and_then(|chunk| chunk.text()) {
            Ok(text) => text,
            Err(e) => {
                let message = e.to_string();
                warn!(error = %message, tokens, "Upstream stream failed mid-relay");
                if tx.send(StreamEvent::error(message.clone())).await.is_err() {
                    debug!("Client gone before error event could be delivered");
                }
                return RelayOutcome::Failed { tokens, message };
            }
        };

        if text.is_empty() {
            continue;
        }

        if tx.send(StreamEvent::token(text)).await.is_err() {
            debug!(tokens, "Client disconnected, stopping relay");
            return RelayOutcome::ClientGone { tokens };
        }
        tokens += 1;
    }

    if tx.send(StreamEvent::done()).await.is_err() {
        debug!("Client gone before done event could be delivered");
    }

    RelayOutcome::Completed { tokens }
}
