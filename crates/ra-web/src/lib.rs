//! ra-web: the web-facing side of the research pipeline
//!
//! - Fetch: download a page and reduce it to visible text
//! - Search: pluggable search backends (DuckDuckGo, Tavily) behind a registry

pub mod fetch;
pub mod search;

pub use fetch::{html_to_text, HttpPageFetcher, PageFetcher, FETCH_FAILURE_PREFIX};
pub use search::{
    DuckDuckGoSearch, SearchProvider, SearchRegistry, TavilySearch, DUCKDUCKGO, TAVILY,
};
