//! Gemini `generateContent` API types.
//!
//! These are Gemini-specific request/response structures used for HTTP
//! communication. They are NOT the generic generation types from
//! parley-types -- those are service-agnostic.

use serde::{Deserialize, Serialize};

use parley_types::chat::{Speaker, Turn};

/// Request body for `models/{model}:generateContent` and
/// `models/{model}:streamGenerateContent`.
#[derive(Debug, Clone, Serialize)]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
}

impl GeminiRequest {
    /// Build the wire request from the ordered transcript.
    pub fn from_turns(turns: &[Turn]) -> Self {
        Self {
            contents: turns.iter().map(GeminiContent::from).collect(),
        }
    }
}

/// One turn on the wire: a role plus text parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

impl From<&Turn> for GeminiContent {
    fn from(turn: &Turn) -> Self {
        let role = match turn.speaker {
            Speaker::User => "user",
            Speaker::Model => "model",
        };
        Self {
            role: Some(role.to_string()),
            parts: turn
                .segments
                .iter()
                .map(|s| GeminiPart {
                    text: Some(s.text.clone()),
                })
                .collect(),
        }
    }
}

/// A content part. Only text parts are produced or read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Response body (also the payload of each streaming SSE `data:` line).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    pub prompt_feedback: Option<GeminiPromptFeedback>,
    #[serde(default)]
    pub usage_metadata: Option<GeminiUsage>,
}

impl GeminiResponse {
    /// Concatenated text of the first candidate's parts, if any text exists.
    pub fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let content = candidate.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        Some(text)
    }

    pub fn finish_reason(&self) -> Option<String> {
        self.candidates.first()?.finish_reason.clone()
    }

    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback.as_ref()?.block_reason.as_deref()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    #[serde(default)]
    pub content: Option<GeminiContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiPromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiUsage {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiErrorEnvelope {
    pub error: GeminiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_roles_and_parts() {
        let turns = vec![Turn::user("hello"), Turn::model("hi there")];
        let body = serde_json::to_value(GeminiRequest::from_turns(&turns)).unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "contents": [
                    { "role": "user", "parts": [{ "text": "hello" }] },
                    { "role": "model", "parts": [{ "text": "hi there" }] }
                ]
            })
        );
    }

    #[test]
    fn test_response_text_joins_parts() {
        let json = r#"{
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Hello, " }, { "text": "world" }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 5, "candidatesTokenCount": 3, "totalTokenCount": 8 }
        }"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();

        assert_eq!(resp.text().as_deref(), Some("Hello, world"));
        assert_eq!(resp.finish_reason().as_deref(), Some("STOP"));
        let usage = resp.usage_metadata.unwrap();
        assert_eq!(usage.prompt_token_count, 5);
        assert_eq!(usage.candidates_token_count, 3);
    }

    #[test]
    fn test_response_without_candidates_has_no_text() {
        let resp: GeminiResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.text().is_none());
        assert!(resp.block_reason().is_none());
    }

    #[test]
    fn test_blocked_prompt_feedback() {
        let json = r#"{ "promptFeedback": { "blockReason": "SAFETY" } }"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.block_reason(), Some("SAFETY"));
        assert!(resp.candidates.is_empty());
    }

    #[test]
    fn test_error_envelope() {
        let json = r#"{
            "error": { "code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT" }
        }"#;
        let env: GeminiErrorEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(env.error.code, Some(400));
        assert!(env.error.message.starts_with("API key not valid"));
    }
}
