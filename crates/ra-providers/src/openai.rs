use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error};

use ra_core::{
    CompletionRequest, CompletionResponse, Error, FinishReason, Message, Provider, Role,
    StreamChunk, StreamResult, Usage,
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: Option<String>,
}

impl OpenAIProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        // HTTP/1.1 and no transparent decompression keep SSE chunks flowing
        // as they arrive instead of being buffered.
        let client = Client::builder()
            .http1_only()
            .no_gzip()
            .no_brotli()
            .no_deflate()
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    fn build_request(&self, request: &CompletionRequest) -> OpenAIChatRequest {
        // Model priority: request > provider default
        let model = request
            .model
            .clone()
            .or_else(|| self.default_model.clone());

        let messages = request
            .messages
            .iter()
            .map(|m| OpenAIMessage {
                role: match m.role {
                    Role::System => "system",
                    Role::User => "user",
                    Role::Assistant => "assistant",
                }
                .to_string(),
                content: Some(m.content.clone()),
            })
            .collect();

        OpenAIChatRequest {
            model,
            messages,
            temperature: request.temperature,
            stream: Some(request.stream),
            stream_options: request.stream.then_some(StreamOptions {
                include_usage: true,
            }),
        }
    }

    fn parse_response(&self, response: OpenAIChatResponse) -> Result<CompletionResponse, Error> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::api(500, "No choices in response"))?;

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("length") => FinishReason::Length,
            Some("content_filter") => FinishReason::ContentFilter,
            _ => FinishReason::Stop,
        };

        let usage = response
            .usage
            .map(|u| Usage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(CompletionResponse {
            message: Message::assistant(choice.message.content.unwrap_or_default()),
            usage,
            model: response.model,
            finish_reason,
        })
    }

    fn parse_error(&self, status: u16, body: &str) -> Error {
        #[derive(Deserialize)]
        struct ErrorResponse {
            error: ErrorDetail,
        }

        #[derive(Deserialize)]
        struct ErrorDetail {
            message: String,
        }

        if let Ok(err) = serde_json::from_str::<ErrorResponse>(body) {
            match status {
                401 => Error::auth(err.error.message),
                429 => Error::rate_limit(err.error.message),
                400 => Error::invalid_request(err.error.message),
                _ => Error::api(status, err.error.message),
            }
        } else {
            Error::api(status, body.to_string())
        }
    }

    async fn post(&self, request: &OpenAIChatRequest) -> Result<reqwest::Response, Error> {
        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");

        if request.stream == Some(true) {
            builder = builder
                .header("Accept", "text/event-stream")
                .header("Accept-Encoding", "identity")
                .header("Cache-Control", "no-cache");
        }

        let response = builder
            .json(request)
            .send()
            .await
            .map_err(|e| Error::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(self.parse_error(status.as_u16(), &error_text));
        }

        Ok(response)
    }
}

#[async_trait]
impl Provider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn default_model(&self) -> Option<&str> {
        self.default_model.as_deref()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, Error> {
        let api_request = self.build_request(&request.with_stream(false));
        debug!(model = ?api_request.model, messages = api_request.messages.len(), "OpenAI request");

        let api_response: OpenAIChatResponse = self
            .post(&api_request)
            .await?
            .json()
            .await
            .map_err(|e| Error::serialization(e.to_string()))?;

        self.parse_response(api_response)
    }

    async fn stream(&self, request: CompletionRequest) -> Result<StreamResult, Error> {
        let api_request = self.build_request(&request.with_stream(true));
        debug!(model = ?api_request.model, messages = api_request.messages.len(), "OpenAI stream request");

        let mut response = self.post(&api_request).await?;
        let (tx, rx) = mpsc::channel::<Result<StreamChunk, Error>>(100);

        tokio::spawn(async move {
            let mut decoder = SseDecoder::default();

            loop {
                let chunk = match response.chunk().await {
                    Ok(Some(chunk)) => chunk,
                    Ok(None) => break,
                    Err(e) => {
                        let _ = tx.send(Err(Error::stream(e.to_string()))).await;
                        return;
                    }
                };

                for data in decoder.push(&chunk) {
                    if data == "[DONE]" {
                        let _ = tx.send(Ok(StreamChunk::Done { usage: None })).await;
                        return;
                    }

                    for chunk in parse_stream_event(&data) {
                        if tx.send(Ok(chunk)).await.is_err() {
                            // Receiver dropped; the caller abandoned the stream
                            return;
                        }
                    }
                }
            }

            let _ = tx.send(Ok(StreamChunk::Done { usage: None })).await;
        });

        Ok(Box::pin(ReceiverStream::new(rx)) as StreamResult)
    }
}

/// Splits a server-sent event byte stream into `data:` payloads.
///
/// Bytes are buffered until a full event (terminated by a blank line) has
/// arrived, so a multi-byte character split across network chunks is decoded
/// only once it is complete.
#[derive(Debug, Default)]
struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut payloads = Vec::new();
        while let Some(end) = self.buffer.windows(2).position(|w| w == b"\n\n") {
            let event: Vec<u8> = self.buffer.drain(..end + 2).collect();
            let event = String::from_utf8_lossy(&event);

            payloads.extend(
                event
                    .lines()
                    .filter_map(|line| line.strip_prefix("data:"))
                    .map(|data| data.trim_start().to_string()),
            );
        }
        payloads
    }
}

/// Translate one SSE `data:` payload into stream chunks.
fn parse_stream_event(data: &str) -> Vec<StreamChunk> {
    let response = match serde_json::from_str::<OpenAIStreamResponse>(data) {
        Ok(response) => response,
        Err(e) => {
            error!("Failed to parse SSE message: {} - data: {}", e, data);
            return Vec::new();
        }
    };

    let mut chunks = Vec::new();
    for choice in response.choices {
        if let Some(content) = choice.delta.content.filter(|c| !c.is_empty()) {
            chunks.push(StreamChunk::Delta { content });
        }
        if choice.finish_reason.is_some() {
            let usage = response
                .usage
                .as_ref()
                .map(|u| Usage::new(u.prompt_tokens, u.completion_tokens));
            chunks.push(StreamChunk::Done { usage });
        }
    }
    chunks
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAIChatRequest {
    /// Model to use. Optional for servers that have a default model.
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream_options: Option<StreamOptions>,
}

#[derive(Debug, Serialize)]
struct StreamOptions {
    include_usage: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChatResponse {
    model: String,
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAIStreamResponse {
    choices: Vec<OpenAIStreamChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIStreamChoice {
    delta: OpenAIStreamDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIStreamDelta {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[test]
    fn test_provider_creation() {
        let provider = OpenAIProvider::new("test-key");
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.default_model(), None);
    }

    #[test]
    fn test_build_request() {
        let provider = OpenAIProvider::new("test-key").with_default_model("gpt-3.5-turbo-1106");
        let request = CompletionRequest::new(vec![
            Message::system("You are a research assistant."),
            Message::user("Hello"),
        ])
        .with_temperature(0.0);
        let api_request = provider.build_request(&request);

        assert_eq!(api_request.model, Some("gpt-3.5-turbo-1106".to_string()));
        assert_eq!(api_request.messages.len(), 2);
        assert_eq!(api_request.messages[0].role, "system");
        assert_eq!(api_request.messages[1].role, "user");
        assert_eq!(api_request.temperature, Some(0.0));
        assert!(api_request.stream_options.is_none());
    }

    #[test]
    fn test_parse_stream_event() {
        let chunks = parse_stream_event(
            r#"{"choices":[{"delta":{"content":"Hello"},"finish_reason":null}]}"#,
        );
        assert_eq!(chunks, vec![StreamChunk::Delta { content: "Hello".to_string() }]);

        let chunks = parse_stream_event("not json");
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_sse_decoder_waits_for_complete_events() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(b"data: {\"a\":").is_empty());
        assert_eq!(decoder.push(b"1}\n\ndata: [DONE]\n\n"), vec!["{\"a\":1}", "[DONE]"]);
        assert!(decoder.buffer.is_empty());
    }

    #[test]
    fn test_sse_decoder_multibyte_split() {
        let event = "data: {\"choices\":[{\"delta\":{\"content\":\"Größe\"},\"finish_reason\":null}]}\n\n";
        let bytes = event.as_bytes();
        // Split after the first byte of the two-byte 'ö'
        let split = event.find('ö').unwrap() + 1;

        let mut decoder = SseDecoder::default();
        assert!(decoder.push(&bytes[..split]).is_empty());
        let payloads = decoder.push(&bytes[split..]);

        assert_eq!(payloads.len(), 1);
        assert_eq!(
            parse_stream_event(&payloads[0]),
            vec![StreamChunk::Delta { content: "Größe".to_string() }]
        );
    }

    #[tokio::test]
    async fn test_complete_against_mock_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"model":"gpt-3.5-turbo-1106","choices":[{"message":{"role":"assistant","content":"Apple is a tech company."},"finish_reason":"stop"}],"usage":{"prompt_tokens":10,"completion_tokens":6}}"#,
            )
            .create_async()
            .await;

        let provider = OpenAIProvider::new("test-key").with_base_url(server.url());
        let response = provider
            .complete(CompletionRequest::new(vec![Message::user("What is Apple?")]))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.text(), "Apple is a tech company.");
        assert_eq!(response.usage.total_tokens, 16);
        assert_eq!(response.finish_reason, FinishReason::Stop);
    }

    #[tokio::test]
    async fn test_error_status_mapping() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body(r#"{"error":{"message":"slow down","type":"rate_limit"}}"#)
            .create_async()
            .await;

        let provider = OpenAIProvider::new("test-key").with_base_url(server.url());
        let err = provider
            .complete(CompletionRequest::new(vec![Message::user("hi")]))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::RateLimit(ref m) if m == "slow down"));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_stream_against_mock_server() {
        let mut server = mockito::Server::new_async().await;
        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"# Report\"},\"finish_reason\":null}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\" body\"},\"finish_reason\":null}]}\n\n",
            "data: [DONE]\n\n",
        );
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(body)
            .create_async()
            .await;

        let provider = OpenAIProvider::new("test-key").with_base_url(server.url());
        let mut stream = provider
            .stream(CompletionRequest::new(vec![Message::user("write")]))
            .await
            .unwrap();

        let mut text = String::new();
        while let Some(chunk) = stream.next().await {
            match chunk.unwrap() {
                StreamChunk::Delta { content } => text.push_str(&content),
                StreamChunk::Done { .. } => break,
                _ => {}
            }
        }
        assert_eq!(text, "# Report body");
    }

    #[tokio::test]
    async fn test_stream_multibyte_across_body_chunks() {
        let mut server = mockito::Server::new_async().await;
        let event = "data: {\"choices\":[{\"delta\":{\"content\":\"Größe\"},\"finish_reason\":null}]}\n\ndata: [DONE]\n\n";
        let split = event.find('ö').unwrap() + 1;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_chunked_body(move |w| {
                w.write_all(&event.as_bytes()[..split])?;
                w.flush()?;
                w.write_all(&event.as_bytes()[split..])
            })
            .create_async()
            .await;

        let provider = OpenAIProvider::new("test-key").with_base_url(server.url());
        let mut stream = provider
            .stream(CompletionRequest::new(vec![Message::user("write")]))
            .await
            .unwrap();

        let mut text = String::new();
        while let Some(chunk) = stream.next().await {
            match chunk.unwrap() {
                StreamChunk::Delta { content } => text.push_str(&content),
                StreamChunk::Done { .. } => break,
                _ => {}
            }
        }
        assert_eq!(text, "Größe");
    }
}
