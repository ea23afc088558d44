//! Integration tests for the chat relay
//!
//! These tests drive the full router against a mock Gemini server and check
//! both the event stream and the requests the relay sends upstream.

mod errors;
mod health;
mod validation;
