//! GenerationService and GenerationConnector trait definitions.
//!
//! `GenerationService` is the remote text-generation port. Uses RPITIT for
//! `generate`, and `Pin<Box<dyn Stream>>` for `stream` (streams need to be
//! object-safe for the BoxGenerationService wrapper).

use std::pin::Pin;

use futures_util::Stream;
use secrecy::SecretString;

use parley_types::llm::{GenerateRequest, GenerateResponse, LlmError, StreamEvent};

use super::box_provider::BoxGenerationService;

/// Boxed stream of generation events.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>>;

/// Trait for text-generation backends.
///
/// Implementations are already authenticated: the credential is supplied
/// once, when a [`GenerationConnector`] builds the service.
/// Implementations live in parley-infra (e.g., `GeminiClient`).
pub trait GenerationService: Send + Sync {
    /// Human-readable service name (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send the ordered conversation and receive the full reply.
    fn generate(
        &self,
        request: &GenerateRequest,
    ) -> impl std::future::Future<Output = Result<GenerateResponse, LlmError>> + Send;

    /// Send the ordered conversation and receive the reply as a stream.
    fn stream(&self, request: GenerateRequest) -> EventStream;
}

/// Builds an authenticated [`BoxGenerationService`] from a credential.
///
/// The session manager calls this whenever its credential changes.
pub trait GenerationConnector: Send + Sync {
    fn connect(&self, credential: &SecretString) -> Result<BoxGenerationService, LlmError>;
}
