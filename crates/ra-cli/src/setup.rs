use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use crate::config::Config;

const CONFIG_TEMPLATE: &str = r#"# research-assistant configuration
#
# Every key is optional; the values shown are the defaults.
# Any key can also be set through the environment with an RA_ prefix,
# e.g. RA_SEARCH_ENGINE=tavily.
#
# API keys are read from OPENAI_API_KEY and TAVILY_API_KEY when not set here.

# ── Model ────────────────────────────────────────────────────────
model = "gpt-3.5-turbo-1106"
# base_url = "https://api.openai.com/v1"
# openai_api_key = "sk-..."
temperature = 0.0

# ── Research ─────────────────────────────────────────────────────
# duckduckgo needs no key; tavily needs tavily_api_key
search_engine = "duckduckgo"
# tavily_api_key = "tvly-..."

# research_report, resource_report or outline_report
report_type = "research_report"

# Language of the model prompts: german or english
prompt_language = "german"

results_per_question = 3
max_page_chars = 10000
max_concurrency = 8

# ── Timeouts and retries ─────────────────────────────────────────
fetch_timeout_secs = 20
model_timeout_secs = 60
max_retries = 3
retry_base_delay_ms = 500
"#;

pub fn run() -> Result<()> {
    let config_dir = Config::config_dir()?;
    let config_path = config_dir.join("config.toml");

    std::fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create config directory: {}", config_dir.display()))?;

    if config_path.exists() {
        println!("Existing config file found:");
        println!("  {}", config_path.display());
        print!("\nOverwrite? (The existing file will be backed up) [y/N] ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Setup cancelled.");
            return Ok(());
        }

        backup_file(&config_path)?;
    }

    std::fs::write(&config_path, CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("Created {}", config_path.display());

    println!("\nNext steps:");
    println!("  1. Set your API key:  export OPENAI_API_KEY=\"sk-...\"");
    println!("  2. Ask a question:    ra \"Should I invest in Apple stock?\"");
    println!("  3. Pick a template:   ra --report-type outline_report \"...\"");

    Ok(())
}

/// Back up a file to <name>.bak, appending a timestamp if .bak already exists.
fn backup_file(path: &Path) -> Result<()> {
    let mut backup = path.with_extension("toml.bak");

    if backup.exists() {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        backup = path.with_extension(format!("toml.bak.{}", timestamp));
    }

    std::fs::rename(path, &backup)
        .with_context(|| format!("Failed to back up {} to {}", path.display(), backup.display()))?;
    println!("  Backed up to {}", backup.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::providers::{Format, Toml};
    use figment::Figment;

    #[test]
    fn test_template_matches_defaults() {
        let parsed: Config = Figment::new()
            .merge(Toml::string(CONFIG_TEMPLATE))
            .extract()
            .unwrap();
        let defaults = Config::default();

        assert_eq!(parsed.model, defaults.model);
        assert_eq!(parsed.search_engine, defaults.search_engine);
        assert_eq!(parsed.report_type, defaults.report_type);
        assert_eq!(parsed.prompt_language, defaults.prompt_language);
        assert_eq!(parsed.results_per_question, defaults.results_per_question);
        assert_eq!(parsed.max_page_chars, defaults.max_page_chars);
        assert_eq!(parsed.max_concurrency, defaults.max_concurrency);
        assert_eq!(parsed.model_timeout_secs, defaults.model_timeout_secs);
        assert!(parsed.openai_api_key.is_none());
    }

    #[test]
    fn test_backup_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        std::fs::write(&path, "first").unwrap();
        backup_file(&path).unwrap();
        assert!(!path.exists());
        assert_eq!(std::fs::read_to_string(dir.path().join("config.toml.bak")).unwrap(), "first");

        std::fs::write(&path, "second").unwrap();
        backup_file(&path).unwrap();
        let backups = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(backups, 2);
    }
}
