//! SSE stream adapter for `streamGenerateContent?alt=sse`.
//!
//! Each SSE `data:` line carries a complete `GenerateContentResponse` chunk
//! holding the next piece of text. `usageMetadata` is cumulative, so only the
//! last one seen is reported.

use eventsource_stream::Eventsource;
use futures_util::StreamExt;

use parley_core::llm::provider::EventStream;
use parley_types::llm::{LlmError, StreamEvent, Usage};

use super::client::{into_generate_response, map_error_status};
use super::types::GeminiResponse;

/// Events decoded from one SSE chunk.
#[derive(Debug, Default)]
pub(crate) struct ChunkEvents {
    pub events: Vec<StreamEvent>,
    pub usage: Option<Usage>,
}

/// Decode one SSE `data:` payload.
pub(crate) fn parse_chunk(data: &str) -> Result<ChunkEvents, LlmError> {
    let chunk: GeminiResponse = serde_json::from_str(data)
        .map_err(|e| LlmError::Deserialization(format!("failed to parse stream chunk: {e}")))?;

    let response = into_generate_response(chunk)?;
    let mut out = ChunkEvents::default();

    if let Some(text) = response.text.filter(|t| !t.is_empty()) {
        out.events.push(StreamEvent::TextDelta { text });
    }
    if let Some(reason) = response.finish_reason {
        out.events.push(StreamEvent::Finished { reason });
    }
    if response.usage != Usage::default() {
        out.usage = Some(response.usage);
    }

    Ok(out)
}

/// Send a prepared streaming request and adapt its SSE body to [`StreamEvent`]s.
///
/// The request already carries its URL, headers, and body; nothing is sent
/// until the returned stream is first polled.
pub fn create_gemini_stream(request: reqwest::RequestBuilder) -> EventStream {
    Box::pin(async_stream::try_stream! {
        let response = request.send().await.map_err(|e| LlmError::Provider {
            message: format!("HTTP request failed: {e}"),
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            Err::<(), LlmError>(map_error_status(status, &error_body))?;
            return;
        }

        let mut events = response.bytes_stream().eventsource();
        let mut usage: Option<Usage> = None;

        while let Some(event) = events.next().await {
            let event = event.map_err(|e| LlmError::Stream(e.to_string()))?;
            if event.data.trim().is_empty() {
                continue;
            }

            let decoded = parse_chunk(&event.data)?;
            for ev in decoded.events {
                yield ev;
            }
            if decoded.usage.is_some() {
                usage = decoded.usage;
            }
        }

        if let Some(usage) = usage {
            yield StreamEvent::Usage(usage);
        }
        yield StreamEvent::Done;
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use parley_core::llm::provider::GenerationService;
    use parley_types::chat::Turn;
    use parley_types::llm::GenerateRequest;

    use crate::gemini::test_server::{local_client, serve_once};

    fn request() -> GenerateRequest {
        GenerateRequest {
            model: "gemini-2.5-flash".to_string(),
            contents: vec![Turn::user("hello")],
        }
    }

    #[test]
    fn test_parse_chunk_text_delta() {
        let data = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hel"}]}}]}"#;
        let out = parse_chunk(data).unwrap();
        assert_eq!(out.events.len(), 1);
        assert!(matches!(&out.events[0], StreamEvent::TextDelta { text } if text == "Hel"));
        assert!(out.usage.is_none());
    }

    #[test]
    fn test_parse_chunk_final_with_usage() {
        let data = r#"{
            "candidates":[{"content":{"parts":[{"text":"lo"}]},"finishReason":"STOP"}],
            "usageMetadata":{"promptTokenCount":7,"candidatesTokenCount":2}
        }"#;
        let out = parse_chunk(data).unwrap();
        assert_eq!(out.events.len(), 2);
        assert!(matches!(&out.events[1], StreamEvent::Finished { reason } if reason == "STOP"));
        assert_eq!(out.usage.unwrap().input_tokens, 7);
    }

    #[test]
    fn test_parse_chunk_blocked() {
        let data = r#"{"promptFeedback":{"blockReason":"PROHIBITED_CONTENT"}}"#;
        assert!(matches!(parse_chunk(data), Err(LlmError::Blocked(_))));
    }

    #[test]
    fn test_parse_chunk_invalid_json() {
        assert!(matches!(
            parse_chunk("not json"),
            Err(LlmError::Deserialization(_))
        ));
    }

    #[tokio::test]
    async fn test_stream_over_http_yields_deltas_then_usage() {
        let body = concat!(
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Hel\"}]}}]}\n\n",
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"lo\"}]},\"finishReason\":\"STOP\"}],",
            "\"usageMetadata\":{\"promptTokenCount\":5,\"candidatesTokenCount\":2}}\n\n",
        );
        let (base_url, server) = serve_once("200 OK", "text/event-stream", body).await;

        let events: Vec<StreamEvent> = local_client(&base_url)
            .stream(request())
            .map(|ev| ev.unwrap())
            .collect()
            .await;
        let captured = server.await.unwrap();

        assert_eq!(
            captured.request_line,
            "POST /v1beta/models/gemini-2.5-flash:streamGenerateContent?alt=sse HTTP/1.1"
        );
        assert_eq!(events.len(), 5);
        assert!(matches!(&events[0], StreamEvent::TextDelta { text } if text == "Hel"));
        assert!(matches!(&events[1], StreamEvent::TextDelta { text } if text == "lo"));
        assert!(matches!(&events[2], StreamEvent::Finished { reason } if reason == "STOP"));
        assert!(matches!(&events[3], StreamEvent::Usage(u) if u.output_tokens == 2));
        assert!(matches!(events[4], StreamEvent::Done));
    }

    #[tokio::test]
    async fn test_stream_over_http_reports_error_status() {
        let (base_url, server) = serve_once("401 Unauthorized", "application/json", "{}").await;

        let mut stream = local_client(&base_url).stream(request());
        let first = stream.next().await;
        server.await.unwrap();

        assert!(matches!(first, Some(Err(LlmError::AuthenticationFailed))));
        assert!(stream.next().await.is_none());
    }
}
