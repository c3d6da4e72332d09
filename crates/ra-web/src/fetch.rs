//! Page fetching.
//!
//! Fetch failures are not errors here: the fetcher returns a short sentinel
//! text describing what went wrong, and that text flows into summarization
//! like any other page content.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use scraper::Html;
use tracing::{debug, warn};

/// Every sentinel returned in place of page text starts with this.
pub const FETCH_FAILURE_PREFIX: &str = "Failed to retrieve the webpage";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);
/// Bytes of a response body read before the rest is discarded.
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;
const USER_AGENT: &str = concat!("research-assistant/", env!("CARGO_PKG_VERSION"));

/// Elements whose text is never rendered.
const INVISIBLE_TAGS: &[&str] = &["script", "style", "noscript", "template"];

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Return the visible text of `url`, or a sentinel starting with
    /// [`FETCH_FAILURE_PREFIX`].
    async fn fetch(&self, url: &str) -> String;
}

pub struct HttpPageFetcher {
    client: Client,
    max_body_bytes: usize,
}

impl Default for HttpPageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpPageFetcher {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

/// Read at most `limit` bytes of the body. Invalid UTF-8, including a
/// character cut at the limit, is replaced rather than rejected.
async fn read_capped(mut response: reqwest::Response, limit: usize) -> reqwest::Result<String> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let room = limit - body.len();
        if chunk.len() >= room {
            body.extend_from_slice(&chunk[..room]);
            debug!(limit, "Page body truncated");
            break;
        }
        body.extend_from_slice(&chunk);
    }
    Ok(String::from_utf8_lossy(&body).into_owned())
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> String {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url, error = %e, "Page fetch failed");
                return format!("{}: {}", FETCH_FAILURE_PREFIX, e);
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            warn!(url, status = status.as_u16(), "Page fetch returned non-200 status");
            return format!("{}: Status code {}", FETCH_FAILURE_PREFIX, status.as_u16());
        }

        match read_capped(response, self.max_body_bytes).await {
            Ok(html) => {
                let text = html_to_text(&html);
                debug!(url, chars = text.chars().count(), "Fetched page");
                text
            }
            Err(e) => {
                warn!(url, error = %e, "Failed to read page body");
                format!("{}: {}", FETCH_FAILURE_PREFIX, e)
            }
        }
    }
}

/// Strip markup from an HTML document and return its visible text, with runs
/// of whitespace collapsed to single spaces.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut words: Vec<&str> = Vec::new();
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| INVISIBLE_TAGS.contains(&el.name()))
        });
        if hidden {
            continue;
        }

        words.extend(text.split_whitespace());
    }

    words.join(" ")
}
