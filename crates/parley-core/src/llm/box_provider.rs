//! BoxGenerationService -- object-safe dynamic dispatch wrapper for GenerationService.
//!
//! 1. Define an object-safe `GenerationServiceDyn` trait with boxed futures
//! 2. Blanket-impl `GenerationServiceDyn` for all `T: GenerationService`
//! 3. `BoxGenerationService` wraps `Box<dyn GenerationServiceDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use parley_types::llm::{GenerateRequest, GenerateResponse, LlmError};

use super::provider::{EventStream, GenerationService};

/// Object-safe version of [`GenerationService`] with boxed futures.
pub trait GenerationServiceDyn: Send + Sync {
    fn name(&self) -> &str;

    fn generate_boxed<'a>(
        &'a self,
        request: &'a GenerateRequest,
    ) -> Pin<Box<dyn Future<Output = Result<GenerateResponse, LlmError>> + Send + 'a>>;

    fn stream_boxed(&self, request: GenerateRequest) -> EventStream;
}

impl<T: GenerationService> GenerationServiceDyn for T {
    fn name(&self) -> &str {
        GenerationService::name(self)
    }

    fn generate_boxed<'a>(
        &'a self,
        request: &'a GenerateRequest,
    ) -> Pin<Box<dyn Future<Output = Result<GenerateResponse, LlmError>> + Send + 'a>> {
        Box::pin(self.generate(request))
    }

    fn stream_boxed(&self, request: GenerateRequest) -> EventStream {
        self.stream(request)
    }
}

/// Type-erased generation service.
///
/// Since `GenerationService` uses RPITIT, it cannot be used as a trait object
/// directly. `BoxGenerationService` provides equivalent methods that delegate
/// to the inner `GenerationServiceDyn` trait object.
pub struct BoxGenerationService {
    inner: Box<dyn GenerationServiceDyn + Send + Sync>,
}

impl BoxGenerationService {
    /// Wrap a concrete `GenerationService` in a type-erased box.
    pub fn new<T: GenerationService + 'static>(service: T) -> Self {
        Self {
            inner: Box::new(service),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, LlmError> {
        self.inner.generate_boxed(request).await
    }

    pub fn stream(&self, request: GenerateRequest) -> EventStream {
        self.inner.stream_boxed(request)
    }
}
