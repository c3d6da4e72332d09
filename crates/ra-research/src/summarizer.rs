//! Per-page summarization against the research question.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use ra_core::{Message, Result};
use ra_web::PageFetcher;

use crate::llm::ModelClient;
use crate::template::render;

/// Page text beyond this many characters is dropped before summarization.
pub const MAX_PAGE_CHARS: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSummary {
    pub url: String,
    pub summary: String,
}

impl PageSummary {
    pub fn new(url: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            summary: summary.into(),
        }
    }

    /// Marker used when summarizing a page failed outright.
    pub fn failed(url: impl Into<String>, error: impl fmt::Display) -> Self {
        Self::new(url, format!("Failed to summarize the webpage: {}", error))
    }
}

/// The block format used in the research bundle.
impl fmt::Display for PageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Source Url: {}\nSummary: {}", self.url, self.summary)
    }
}

/// The first `max_chars` characters of `text`, cut on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub struct Summarizer {
    fetcher: Arc<dyn PageFetcher>,
    model: ModelClient,
    max_chars: usize,
}

impl Summarizer {
    pub fn new(fetcher: Arc<dyn PageFetcher>, model: ModelClient) -> Self {
        Self {
            fetcher,
            model,
            max_chars: MAX_PAGE_CHARS,
        }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Prompt for one page. `text` is truncated here.
    pub fn messages(&self, text: &str, question: &str) -> Vec<Message> {
        let text = truncate_chars(text, self.max_chars);
        vec![Message::user(render(
            self.model.prompts().summary,
            &[("text", text), ("question", question)],
        ))]
    }

    /// Fetch `url` and summarize it against `question`. Fetch failures arrive
    /// as sentinel text and are summarized like any page; only model failures
    /// return `Err`.
    pub async fn summarize(&self, url: &str, question: &str) -> Result<PageSummary> {
        let text = self.fetcher.fetch(url).await;
        debug!(url, chars = text.chars().count(), "Summarizing page");

        let summary = self.model.complete(self.messages(&text, question)).await?;
        Ok(PageSummary::new(url, summary))
    }
}
