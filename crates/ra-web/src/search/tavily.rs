//! Tavily search API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ra_core::Error;

use super::{SearchProvider, TAVILY};

const DEFAULT_ENDPOINT: &str = "https://api.tavily.com/search";

pub struct TavilySearch {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl TavilySearch {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[derive(Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    max_results: usize,
    search_depth: &'static str,
    include_answer: bool,
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyHit>,
}

/// One hit. Only the source URL is used; title, content and score are ignored.
#[derive(Deserialize)]
struct TavilyHit {
    url: String,
}

#[derive(Deserialize)]
struct TavilyError {
    #[serde(alias = "error")]
    detail: serde_json::Value,
}

#[async_trait]
impl SearchProvider for TavilySearch {
    fn name(&self) -> &str {
        TAVILY
    }

    async fn search(&self, query: &str, count: usize) -> Result<Vec<String>, Error> {
        let request = TavilyRequest {
            query,
            max_results: count,
            search_depth: "basic",
            include_answer: false,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.trim())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::search(TAVILY, format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<TavilyError>(&body)
                .map(|e| match e.detail {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                })
                .unwrap_or(body);
            return match status.as_u16() {
                401 | 403 => Err(Error::auth(format!("tavily: {}", detail))),
                429 => Err(Error::rate_limit(format!("tavily: {}", detail))),
                _ => Err(Error::search(TAVILY, format!("HTTP {}: {}", status, detail))),
            };
        }

        let parsed: TavilyResponse = response
            .json()
            .await
            .map_err(|e| Error::search(TAVILY, format!("invalid response: {}", e)))?;

        let links: Vec<String> = parsed
            .results
            .into_iter()
            .map(|hit| hit.url)
            .take(count)
            .collect();
        debug!(query, results = links.len(), "Tavily search");
        Ok(links)
    }
}
