use std::sync::Arc;

use ra_core::{CompletionRequest, Message, Provider, Result, StreamResult};

use crate::prompts::{PromptLanguage, PromptSet};

pub const DEFAULT_TEMPERATURE: f32 = 0.0;

/// A provider plus the per-call settings every stage shares.
#[derive(Clone)]
pub struct ModelClient {
    provider: Arc<dyn Provider>,
    model: Option<String>,
    temperature: f32,
    language: PromptLanguage,
}

impl ModelClient {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            model: None,
            temperature: DEFAULT_TEMPERATURE,
            language: PromptLanguage::default(),
        }
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_language(mut self, language: PromptLanguage) -> Self {
        self.language = language;
        self
    }

    pub fn language(&self) -> PromptLanguage {
        self.language
    }

    /// Prompt texts in this client's language.
    pub fn prompts(&self) -> &'static PromptSet {
        self.language.prompts()
    }

    pub fn request(&self, messages: Vec<Message>) -> CompletionRequest {
        let mut request = CompletionRequest::new(messages).with_temperature(self.temperature);
        if let Some(model) = self.model.as_deref().or_else(|| self.provider.default_model()) {
            request = request.with_model(model);
        }
        request
    }

    /// Send `messages` and return the assistant's text.
    pub async fn complete(&self, messages: Vec<Message>) -> Result<String> {
        let response = self.provider.complete(self.request(messages)).await?;
        Ok(response.message.content)
    }

    pub async fn stream(&self, messages: Vec<Message>) -> Result<StreamResult> {
        self.provider.stream(self.request(messages)).await
    }
}
