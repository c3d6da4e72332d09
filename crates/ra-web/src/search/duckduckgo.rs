//! DuckDuckGo search via the keyless HTML endpoint.

use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::debug;

use ra_core::Error;

use super::{SearchProvider, DUCKDUCKGO};

const DEFAULT_ENDPOINT: &str = "https://html.duckduckgo.com/html/";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

pub struct DuckDuckGoSearch {
    client: Client,
    endpoint: String,
}

impl Default for DuckDuckGoSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl DuckDuckGoSearch {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .timeout(Duration::from_secs(20))
                .build()
                .unwrap_or_default(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    fn name(&self) -> &str {
        DUCKDUCKGO
    }

    async fn search(&self, query: &str, count: usize) -> Result<Vec<String>, Error> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("q", query)])
            .header("Accept", "text/html")
            .send()
            .await
            .map_err(|e| Error::search(DUCKDUCKGO, format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::search(DUCKDUCKGO, format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::search(DUCKDUCKGO, format!("failed to read response: {}", e)))?;

        let links = parse_result_links(&body, count);
        debug!(query, results = links.len(), "DuckDuckGo search");
        Ok(links)
    }
}

/// Pull the top `count` result links out of a DuckDuckGo HTML results page.
fn parse_result_links(html: &str, count: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(link_selector) = Selector::parse("a.result__a") else {
        return Vec::new();
    };

    document
        .select(&link_selector)
        .filter_map(|el| el.value().attr("href"))
        .map(unwrap_redirect)
        .filter(|url| url.starts_with("http://") || url.starts_with("https://"))
        .take(count)
        .collect()
}

/// Result anchors point at `//duckduckgo.com/l/?uddg=<encoded target>&...`;
/// return the decoded target, or the href unchanged when it is direct.
fn unwrap_redirect(href: &str) -> String {
    if let Some(pos) = href.find("uddg=") {
        let start = pos + "uddg=".len();
        let end = href[start..]
            .find('&')
            .map(|i| start + i)
            .unwrap_or(href.len());
        let encoded = &href[start..end];
        if !encoded.is_empty() {
            return percent_decode_str(encoded).decode_utf8_lossy().into_owned();
        }
    }
    href.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS_PAGE: &str = r#"<html><body>
        <div class="result"><a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.apple.com%2Finvestor%2F&amp;rut=abc">Apple IR</a>
            <a class="result__snippet">Investor relations</a></div>
        <div class="result"><a class="result__a" href="https://finance.example.com/aapl">AAPL quote</a></div>
        <div class="result result--ad"><a class="result__a" href="//duckduckgo.com/y.js?ad_domain=broker.example">Ad</a></div>
        <div class="result"><a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fnews.example.org%2Fapple&amp;rut=def">News</a></div>
    </body></html>"#;

    #[test]
    fn test_unwrap_redirect() {
        assert_eq!(
            unwrap_redirect("//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fa%3Fb%3Dc&rut=1"),
            "https://example.com/a?b=c"
        );
        assert_eq!(unwrap_redirect("https://direct.example"), "https://direct.example");
    }

    #[test]
    fn test_parse_result_links_respects_count() {
        let links = parse_result_links(RESULTS_PAGE, 3);
        assert_eq!(
            links,
            vec![
                "https://www.apple.com/investor/",
                "https://finance.example.com/aapl",
                "https://news.example.org/apple",
            ]
        );

        let links = parse_result_links(RESULTS_PAGE, 1);
        assert_eq!(links, vec!["https://www.apple.com/investor/"]);
    }

    #[test]
    fn test_parse_result_links_empty_page() {
        assert!(parse_result_links("<html><body>No results.</body></html>", 3).is_empty());
    }

    #[tokio::test]
    async fn test_search_against_mock_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/html/")
            .match_body(mockito::Matcher::UrlEncoded(
                "q".into(),
                "apple stock outlook".into(),
            ))
            .with_status(200)
            .with_body(RESULTS_PAGE)
            .create_async()
            .await;

        let search = DuckDuckGoSearch::new().with_endpoint(format!("{}/html/", server.url()));
        let links = search.search("apple stock outlook", 2).await.unwrap();

        mock.assert_async().await;
        assert_eq!(links.len(), 2);
    }

    #[tokio::test]
    async fn test_search_http_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/html/")
            .with_status(503)
            .create_async()
            .await;

        let search = DuckDuckGoSearch::new().with_endpoint(format!("{}/html/", server.url()));
        let err = search.search("anything", 3).await.unwrap_err();
        assert!(matches!(err, Error::Search { ref engine, .. } if engine == DUCKDUCKGO));
    }
}
