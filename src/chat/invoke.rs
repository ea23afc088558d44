//! Provider invocation with the grounding fallback
//!
//! Some models reject the search grounding tool. When that happens the
//! request is sent once more without tools; any other failure is final.

use tracing::{info, warn};

use crate::proxy::{ChunkStream, GenerateContentRequest, GenerativeModel, ProviderError};
use crate::routes::metrics::record_grounding_fallback;

/// Upstream wording for a model that cannot use search grounding.
///
/// Matched against the error text, so it has to follow the provider's
/// current message.
pub const GROUNDING_UNSUPPORTED: &str = "Search Grounding is not supported";

/// Whether an error says the grounding tool is unsupported for the model
pub fn is_grounding_unsupported(err: &ProviderError) -> bool {
    err.to_string().contains(GROUNDING_UNSUPPORTED)
}

/// Start a streaming generation, retrying once without tools if the
/// grounding tool was refused.
pub async fn stream_with_fallback(
    model: &GenerativeModel,
    request: &GenerateContentRequest,
) -> Result<ChunkStream, ProviderError> {
    match model.stream_generate_content(request).await {
        Ok(stream) => Ok(stream),
        Err(err) if request.has_tools() && is_grounding_unsupported(&err) => {
            warn!(
                provider = model.provider_name(),
                model = %model.model_id(),
                error = %err,
                "Search grounding rejected, retrying without tools"
            );
            record_grounding_fallback(model.model_id());

            let retry = request.without_tools();
            let stream = model.stream_generate_content(&retry).await?;
            info!(
                provider = model.provider_name(),
                model = %model.model_id(),
                "Retry without grounding succeeded"
            );
            Ok(stream)
        }
        Err(err) => Err(err),
    }
}
