//! Proxy module
//!
//! Handles request forwarding to the upstream generative AI provider.

pub mod gemini;
pub mod provider;
pub mod types;

pub use gemini::GeminiProvider;
pub use provider::{AiProvider, ChunkStream, GenerativeModel, ProviderError};
pub use types::{
    Content, GenerateContentChunk, GenerateContentRequest, InlineData, Part, Tool,
};
