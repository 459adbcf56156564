//! GeminiClient -- concrete [`GenerationService`] for the Gemini REST API.
//!
//! Sends the whole transcript to `models/{model}:generateContent` (or
//! `:streamGenerateContent?alt=sse` when streaming) with the API key in the
//! `x-goog-api-key` header.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use std::time::Duration;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use parley_core::llm::box_provider::BoxGenerationService;
use parley_core::llm::provider::{EventStream, GenerationConnector, GenerationService};
use parley_types::llm::{GenerateRequest, GenerateResponse, LlmError, Usage};

use super::streaming::create_gemini_stream;
use super::types::{GeminiErrorEnvelope, GeminiRequest, GeminiResponse};

/// Public Gemini API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini text-generation client, bound to one API key.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

// GeminiClient does NOT derive Debug: it holds the API key.

impl GeminiClient {
    /// Create a client that shares an existing HTTP connection pool.
    pub fn with_http(http: reqwest::Client, api_key: SecretString, base_url: impl Into<String>) -> Self {
        Self {
            http,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Full method URL for a model, e.g. `.../models/gemini-2.5-flash:generateContent`.
    fn url(&self, model: &str, method: &str) -> String {
        let model = model.trim_start_matches("models/");
        format!("{}/models/{model}:{method}", self.base_url)
    }

    fn post(&self, url: &str, body: &GeminiRequest) -> reqwest::RequestBuilder {
        self.http
            .post(url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .header("content-type", "application/json")
            .json(body)
    }
}

impl GenerationService for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, LlmError> {
        let body = GeminiRequest::from_turns(&request.contents);
        let url = self.url(&request.model, "generateContent");

        debug!(model = %request.model, turns = body.contents.len(), "Gemini API request");

        let response = self
            .post(&url, &body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(map_error_status(status, &error_body));
        }

        let gemini_resp: GeminiResponse = response.json().await.map_err(|e| {
            LlmError::Deserialization(format!("failed to parse response: {e}"))
        })?;

        into_generate_response(gemini_resp)
    }

    fn stream(&self, request: GenerateRequest) -> EventStream {
        let body = GeminiRequest::from_turns(&request.contents);
        let url = format!("{}?alt=sse", self.url(&request.model, "streamGenerateContent"));

        debug!(model = %request.model, turns = body.contents.len(), "Gemini API streaming request");

        create_gemini_stream(self.post(&url, &body))
    }
}

/// Builds [`GeminiClient`]s that share one HTTP connection pool.
pub struct GeminiConnector {
    http: reqwest::Client,
    base_url: String,
}

impl GeminiConnector {
    pub fn new() -> Self {
        Self {
            http: build_http_client(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for GeminiConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationConnector for GeminiConnector {
    fn connect(&self, credential: &SecretString) -> Result<BoxGenerationService, LlmError> {
        let key = credential.expose_secret().trim();
        if key.is_empty() {
            return Err(LlmError::AuthenticationFailed);
        }

        let client = GeminiClient::with_http(
            self.http.clone(),
            SecretString::from(key.to_string()),
            self.base_url.clone(),
        );
        Ok(BoxGenerationService::new(client))
    }
}

fn build_http_client() -> reqwest::Client {
    // Only the connect phase is bounded; a slow generation is left to finish.
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()
        .expect("failed to create reqwest client")
}

/// Map a non-2xx status and body to an [`LlmError`].
pub(crate) fn map_error_status(status: StatusCode, body: &str) -> LlmError {
    let message = serde_json::from_str::<GeminiErrorEnvelope>(body)
        .map(|env| env.error.message)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string());

    match status.as_u16() {
        400 => LlmError::InvalidRequest(message),
        401 | 403 => LlmError::AuthenticationFailed,
        429 => LlmError::RateLimited,
        _ => LlmError::Provider {
            message: format!("HTTP {status}: {message}"),
        },
    }
}

/// Convert a parsed Gemini response into the service-agnostic reply.
pub(crate) fn into_generate_response(resp: GeminiResponse) -> Result<GenerateResponse, LlmError> {
    if resp.candidates.is_empty() {
        if let Some(reason) = resp.block_reason() {
            return Err(LlmError::Blocked(reason.to_string()));
        }
    }

    let usage = resp
        .usage_metadata
        .as_ref()
        .map(|u| Usage {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
        })
        .unwrap_or_default();

    Ok(GenerateResponse {
        text: resp.text(),
        finish_reason: resp.finish_reason(),
        usage,
    })
}
