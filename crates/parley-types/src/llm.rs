//! Generation request/response types for Parley.
//!
//! These types model the data shapes exchanged with a text-generation
//! service: the request carrying the whole transcript, the reply, streaming
//! events, and the error taxonomy for remote failures.

use serde::{Deserialize, Serialize};

use crate::chat::Turn;

/// Model used when neither the config file nor the command line picks one.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Request to a generation service.
///
/// `contents` is the entire ordered transcript, newest turn last.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub contents: Vec<Turn>,
}

/// Reply from a generation service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// `None` when the service produced no text.
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub usage: Usage,
}

/// Token usage reported for a generation call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Events emitted during a streaming generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A piece of reply text.
    TextDelta { text: String },

    /// The service finished with this reason (e.g. "STOP").
    Finished { reason: String },

    /// Token usage information.
    Usage(Usage),

    /// The stream has completed.
    Done,
}

/// Errors from generation service operations.
///
/// The `Display` text is what the session manager records as the
/// user-visible error message.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("stream error: {0}")]
    Stream(String),

    #[error("rate limited, try again shortly")]
    RateLimited,

    #[error("authentication failed: check your API key")]
    AuthenticationFailed,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("request blocked: {0}")]
    Blocked(String),
}
