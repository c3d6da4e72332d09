//! Web search backends.
//!
//! Backends implement [`SearchProvider`] and are looked up by name through a
//! [`SearchRegistry`], so the configured `search_engine` key picks the
//! implementation at call time and new backends need no caller changes.

mod duckduckgo;
mod tavily;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use ra_core::Error;

pub use duckduckgo::DuckDuckGoSearch;
pub use tavily::TavilySearch;

pub const DUCKDUCKGO: &str = "duckduckgo";
pub const TAVILY: &str = "tavily";

#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Return up to `count` result URLs for `query`, best first.
    /// No results is an empty vector, not an error.
    async fn search(&self, query: &str, count: usize) -> Result<Vec<String>, Error>;
}

/// Named search backends with a declared default.
#[derive(Clone)]
pub struct SearchRegistry {
    providers: BTreeMap<String, Arc<dyn SearchProvider>>,
    default_key: String,
}

impl Default for SearchRegistry {
    fn default() -> Self {
        Self::new(DUCKDUCKGO)
    }
}

impl SearchRegistry {
    pub fn new(default_key: impl Into<String>) -> Self {
        Self {
            providers: BTreeMap::new(),
            default_key: default_key.into(),
        }
    }

    /// Registry with DuckDuckGo as the default, plus Tavily when an API key
    /// is available.
    pub fn with_builtin(tavily_api_key: Option<&str>) -> Self {
        let mut registry = Self::new(DUCKDUCKGO).register(DUCKDUCKGO, Arc::new(DuckDuckGoSearch::new()));
        if let Some(key) = tavily_api_key.filter(|k| !k.trim().is_empty()) {
            registry = registry.register(TAVILY, Arc::new(TavilySearch::new(key)));
        }
        registry
    }

    pub fn register(mut self, key: impl Into<String>, provider: Arc<dyn SearchProvider>) -> Self {
        self.providers.insert(key.into(), provider);
        self
    }

    pub fn default_key(&self) -> &str {
        &self.default_key
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    /// Resolve `key`, or the default backend when no key is given.
    pub fn resolve(&self, key: Option<&str>) -> Result<Arc<dyn SearchProvider>, Error> {
        let key = key.unwrap_or(&self.default_key);
        self.providers.get(key).cloned().ok_or_else(|| {
            Error::ProviderNotFound(format!(
                "search engine '{}' (available: {})",
                key,
                self.keys().collect::<Vec<_>>().join(", ")
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str);

    #[async_trait]
    impl SearchProvider for Fixed {
        fn name(&self) -> &str {
            self.0
        }

        async fn search(&self, _query: &str, _count: usize) -> Result<Vec<String>, Error> {
            Ok(vec![format!("https://{}.example", self.0)])
        }
    }

    #[test]
    fn test_resolve_default_and_named() {
        let registry = SearchRegistry::new("first")
            .register("first", Arc::new(Fixed("first")))
            .register("second", Arc::new(Fixed("second")));

        assert_eq!(registry.resolve(None).unwrap().name(), "first");
        assert_eq!(registry.resolve(Some("second")).unwrap().name(), "second");
    }

    #[test]
    fn test_resolve_unknown_key() {
        let registry = SearchRegistry::new("first").register("first", Arc::new(Fixed("first")));
        let err = registry.resolve(Some("bing")).err().unwrap();
        assert!(err.to_string().contains("bing"));
        assert!(err.to_string().contains("first"));
    }

    #[test]
    fn test_builtin_registry() {
        let registry = SearchRegistry::with_builtin(None);
        assert_eq!(registry.default_key(), DUCKDUCKGO);
        assert_eq!(registry.keys().collect::<Vec<_>>(), vec![DUCKDUCKGO]);

        let registry = SearchRegistry::with_builtin(Some("tvly-test"));
        assert_eq!(registry.keys().collect::<Vec<_>>(), vec![DUCKDUCKGO, TAVILY]);
        assert_eq!(registry.resolve(Some(TAVILY)).unwrap().name(), TAVILY);
    }
}
