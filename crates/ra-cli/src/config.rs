use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use ra_research::{PromptLanguage, ReportType};

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-1106";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Search backend key (duckduckgo, tavily)
    pub search_engine: String,

    /// Report template (research_report, resource_report, outline_report)
    pub report_type: ReportType,

    /// Language of the model prompts (german, english)
    pub prompt_language: PromptLanguage,

    pub model: String,

    /// OpenAI-compatible API base URL
    pub base_url: Option<String>,

    /// Falls back to OPENAI_API_KEY
    pub openai_api_key: Option<String>,

    /// Falls back to TAVILY_API_KEY
    pub tavily_api_key: Option<String>,

    pub results_per_question: usize,
    pub max_page_chars: usize,
    pub max_concurrency: usize,
    pub fetch_timeout_secs: u64,
    pub model_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub temperature: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_engine: ra_web::DUCKDUCKGO.to_string(),
            report_type: ReportType::default(),
            prompt_language: PromptLanguage::default(),
            model: DEFAULT_MODEL.to_string(),
            base_url: None,
            openai_api_key: None,
            tavily_api_key: None,
            results_per_question: ra_research::RESULTS_PER_QUESTION,
            max_page_chars: ra_research::MAX_PAGE_CHARS,
            max_concurrency: ra_research::DEFAULT_MAX_CONCURRENCY,
            fetch_timeout_secs: 20,
            model_timeout_secs: 60,
            max_retries: 3,
            retry_base_delay_ms: 500,
            temperature: ra_research::DEFAULT_TEMPERATURE,
        }
    }
}

/// Values given on the command line. Unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_engine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Config {
    /// Load the effective configuration.
    ///
    /// Layers, lowest first: built-in defaults, the user config file, the
    /// file given with `--config`, `RA_*` environment variables, command-line
    /// flags. API keys missing after that fall back to the provider's usual
    /// environment variable.
    pub fn load(explicit: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
        }

        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Ok(path) = Self::config_path() {
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }
        let figment = figment
            .merge(Env::prefixed("RA_"))
            .merge(Serialized::defaults(overrides));

        let config: Config = figment.extract().context("Invalid configuration")?;
        Ok(config.with_key_fallbacks(|name| std::env::var(name).ok()))
    }

    fn with_key_fallbacks(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let present = |key: &Option<String>| key.as_deref().is_some_and(|k| !k.trim().is_empty());

        if !present(&self.openai_api_key) {
            self.openai_api_key = lookup("OPENAI_API_KEY");
        }
        if !present(&self.tavily_api_key) {
            self.tavily_api_key = lookup("TAVILY_API_KEY");
        }
        self
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("research-assistant"))
    }

    /// Copy with API keys reduced to a recognizable prefix.
    pub fn masked(&self) -> Self {
        Self {
            openai_api_key: self.openai_api_key.as_deref().map(mask_key),
            tavily_api_key: self.tavily_api_key.as_deref().map(mask_key),
            ..self.clone()
        }
    }
}

fn mask_key(key: &str) -> String {
    let prefix: String = key.chars().take(4).collect();
    if key.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{}****", prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(toml: &str) -> Config {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::string(toml))
            .extract()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.search_engine, "duckduckgo");
        assert_eq!(config.report_type, ReportType::ResearchReport);
        assert_eq!(config.prompt_language, PromptLanguage::German);
        assert_eq!(config.model, "gpt-3.5-turbo-1106");
        assert_eq!(config.results_per_question, 3);
        assert_eq!(config.max_page_chars, 10_000);
        assert_eq!(config.max_concurrency, 8);
        assert_eq!(config.temperature, 0.0);
    }

    #[test]
    fn test_parse_partial_file() {
        let config = from_toml(
            r#"
            search_engine = "tavily"
            report_type = "outline_report"
            tavily_api_key = "tvly-abc"
            max_concurrency = 2
        "#,
        );
        assert_eq!(config.search_engine, "tavily");
        assert_eq!(config.report_type, ReportType::OutlineReport);
        assert_eq!(config.tavily_api_key.as_deref(), Some("tvly-abc"));
        assert_eq!(config.max_concurrency, 2);
        // Untouched keys keep their defaults
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.fetch_timeout_secs, 20);
    }

    #[test]
    fn test_unknown_report_type_falls_back() {
        let config = from_toml(r#"report_type = "poem""#);
        assert_eq!(config.report_type, ReportType::ResearchReport);
    }

    #[test]
    fn test_overrides_win() {
        let overrides = Overrides {
            model: Some("gpt-4o".to_string()),
            report_type: Some("resource_report".to_string()),
            prompt_language: Some("en".to_string()),
            search_engine: None,
        };
        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::string(r#"model = "gpt-4"
search_engine = "tavily""#))
            .merge(Serialized::defaults(&overrides))
            .extract()
            .unwrap();

        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.report_type, ReportType::ResourceReport);
        assert_eq!(config.prompt_language, PromptLanguage::English);
        assert_eq!(config.search_engine, "tavily");
    }

    #[test]
    fn test_prompt_language_from_file() {
        assert_eq!(from_toml(r#"prompt_language = "english""#).prompt_language, PromptLanguage::English);
        assert_eq!(from_toml(r#"prompt_language = "de""#).prompt_language, PromptLanguage::German);

        let invalid = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::string(r#"prompt_language = "french""#))
            .extract::<Config>();
        assert!(invalid.is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ra.toml");
        std::fs::write(&path, "results_per_question = 5\n").unwrap();

        let config = Config::load(Some(&path), &Overrides::default()).unwrap();
        assert_eq!(config.results_per_question, 5);
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(Some(&dir.path().join("missing.toml")), &Overrides::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_key_fallbacks() {
        let config = Config {
            openai_api_key: Some("".to_string()),
            tavily_api_key: Some("tvly-configured".to_string()),
            ..Config::default()
        }
        .with_key_fallbacks(|name| Some(format!("{}-from-env", name)));

        assert_eq!(config.openai_api_key.as_deref(), Some("OPENAI_API_KEY-from-env"));
        assert_eq!(config.tavily_api_key.as_deref(), Some("tvly-configured"));
    }

    #[test]
    fn test_masked() {
        let config = Config {
            openai_api_key: Some("sk-1234567890abcdef".to_string()),
            tavily_api_key: Some("short".to_string()),
            ..Config::default()
        };
        let masked = config.masked();
        assert_eq!(masked.openai_api_key.as_deref(), Some("sk-1****"));
        assert_eq!(masked.tavily_api_key.as_deref(), Some("****"));
        assert_eq!(masked.model, config.model);
    }
}
