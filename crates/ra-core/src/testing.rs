//! Test utilities shared across the workspace.
//! Only compiled when running tests or with the `testing` feature.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::error::Error;
use crate::message::{Message, StreamChunk, Usage};
use crate::provider::{CompletionRequest, CompletionResponse, FinishReason, Provider, StreamResult};

/// A mock provider that returns pre-configured responses.
///
/// Responses come from two places. Rules match a substring of the request
/// transcript and answer every matching call, which keeps results stable when
/// calls arrive concurrently. Calls that match no rule pop the FIFO queue.
pub struct MockProvider {
    responses: Mutex<Vec<Result<String, Error>>>,
    rules: Mutex<Vec<(String, Result<String, String>)>>,
    /// Captured requests (for assertion).
    pub captured_requests: Mutex<Vec<CompletionRequest>>,
    pub name: String,
    pub default_model: Option<String>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            rules: Mutex::new(Vec::new()),
            captured_requests: Mutex::new(Vec::new()),
            name: "mock".to_string(),
            default_model: None,
        }
    }

    /// Queue a response to be returned by the next unmatched complete() call.
    /// Responses are returned in FIFO order (first queued = first returned).
    pub fn queue_response(&self, content: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(0, Ok(content.to_string()));
    }

    /// Queue an error for the next unmatched complete() call.
    pub fn queue_error(&self, error: Error) {
        self.responses.lock().unwrap().insert(0, Err(error));
    }

    /// Answer every request whose transcript contains `needle` with `content`.
    /// Rules are checked in registration order.
    pub fn respond_when(&self, needle: &str, content: &str) {
        self.rules
            .lock()
            .unwrap()
            .push((needle.to_string(), Ok(content.to_string())));
    }

    /// Fail every request whose transcript contains `needle`.
    pub fn fail_when(&self, needle: &str, message: &str) {
        self.rules
            .lock()
            .unwrap()
            .push((needle.to_string(), Err(message.to_string())));
    }

    /// Get the number of captured requests.
    pub fn request_count(&self) -> usize {
        self.captured_requests.lock().unwrap().len()
    }

    /// Get the last captured request.
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.captured_requests.lock().unwrap().last().cloned()
    }

    /// Get every captured request.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.captured_requests.lock().unwrap().clone()
    }

    fn next_content(&self, request: &CompletionRequest) -> Result<String, Error> {
        let transcript = request.transcript();
        let matched = self
            .rules
            .lock()
            .unwrap()
            .iter()
            .find(|(needle, _)| transcript.contains(needle.as_str()))
            .map(|(_, outcome)| outcome.clone());

        match matched {
            Some(Ok(content)) => Ok(content),
            Some(Err(message)) => Err(Error::api(500, message)),
            None => self
                .responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(Error::Unknown("No mock response queued".to_string()))),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn default_model(&self) -> Option<&str> {
        self.default_model.as_deref()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, Error> {
        let content = self.next_content(&request);
        self.captured_requests.lock().unwrap().push(request);
        Ok(CompletionResponse {
            message: Message::assistant(content?),
            usage: Usage::new(0, 0),
            model: "mock-model".to_string(),
            finish_reason: FinishReason::Stop,
        })
    }

    /// Streams the same content `complete` would return, one word per delta.
    async fn stream(&self, request: CompletionRequest) -> Result<StreamResult, Error> {
        let content = self.next_content(&request);
        self.captured_requests.lock().unwrap().push(request);
        let content = content?;

        let mut chunks = vec![Ok(StreamChunk::Start {
            model: "mock-model".to_string(),
        })];
        chunks.extend(
            content
                .split_inclusive(' ')
                .map(|word| Ok(StreamChunk::Delta { content: word.to_string() })),
        );
        chunks.push(Ok(StreamChunk::Done { usage: None }));

        Ok(Box::pin(futures::stream::iter(chunks)))
    }
}
