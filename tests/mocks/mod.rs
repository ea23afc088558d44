//! Mock infrastructure for testing external services
//!
//! The relay has a single upstream, the Gemini API, mocked with wiremock.


pub use gemini::*;
