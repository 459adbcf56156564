//! Google Gemini generation service implementation.
//!
//! Provides [`GeminiClient`], which implements the
//! [`GenerationService`](parley_core::llm::provider::GenerationService) trait
//! for the Gemini REST API (including SSE streaming), and
//! [`GeminiConnector`], which builds one per credential.

pub mod client;
pub mod streaming;
pub mod types;

#[cfg(test)]
mod test_server;

pub use client::{GeminiClient, GeminiConnector, DEFAULT_BASE_URL};
