//! Chat request pipeline
//!
//! Everything the `/api/chat` handler does before the relay starts:
//! request validation, tier-to-model selection, content assembly and the
//! one-shot grounding fallback.

pub mod content;
pub mod invoke;
pub mod model;
pub mod request;

pub use content::{build_generate_request, ContentError};
pub use invoke::{is_grounding_unsupported, stream_with_fallback};
pub use model::{ModelCatalog, ModelSelection, Tier};
pub use request::{ChatRequest, ValidatedChat, ValidationError, MAX_MESSAGE_CHARS};
