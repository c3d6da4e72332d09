use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use futures::StreamExt;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ra_core::{Error as CoreError, Provider};
use ra_providers::{OpenAIProvider, RetryPolicy, RetryProvider};
use ra_research::{ReportType, ResearchPipeline};
use ra_web::{SearchProvider, SearchRegistry, TAVILY};

mod config;
mod setup;

use config::{Config, Overrides};

/// Log level for tracing output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Most verbose: includes streamed model chunks
    Trace,
    /// Verbose: model requests, fetched pages, search hits
    Debug,
    /// Standard: stage progress
    Info,
    /// Quiet: only warnings and errors
    Warn,
    /// Minimal: only errors
    Error,
}

impl LogLevel {
    fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Parser)]
#[command(name = "ra")]
#[command(author, version, about = "Research assistant: web research reports from a single question", long_about = None)]
pub struct Cli {
    /// Question or topic to research
    pub question: Option<String>,

    /// Report template: research_report, resource_report, outline_report
    #[arg(short, long)]
    pub report_type: Option<String>,

    /// Search backend: duckduckgo, tavily
    #[arg(short, long)]
    pub search_engine: Option<String>,

    /// Prompt language: german, english
    #[arg(long)]
    pub prompt_language: Option<String>,

    /// Model to use (overrides config)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Additional config file, layered over ~/.config/research-assistant/config.toml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Stream the report as it is written
    #[arg(long)]
    pub stream: bool,

    /// Print the research bundle and skip report writing
    #[arg(long)]
    pub bundle_only: bool,

    /// Write the result to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_enum, default_value = "warn")]
    pub log_level: LogLevel,

    /// Enable debug logging (shorthand for --log-level debug)
    #[arg(short, long)]
    pub debug: bool,

    /// Write logs to file (JSON-lines format)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the effective configuration
    Config,
    /// Write a config template to ~/.config/research-assistant
    Setup,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Resolve log level: --debug overrides --log-level
    let log_level = if cli.debug {
        LogLevel::Debug
    } else {
        cli.log_level
    };

    let filter = EnvFilter::new(log_level.as_filter());

    if let Some(log_path) = &cli.log_file {
        let file = std::fs::File::create(log_path)
            .with_context(|| format!("Failed to create log file: {:?}", log_path))?;
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::sync::Mutex::new(file)))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    match &cli.command {
        // Setup runs without loading the config it is about to write
        Some(Commands::Setup) => setup::run(),
        Some(Commands::Config) => show_config(&load_config(&cli)?),
        None => {
            let Some(question) = cli.question.as_deref().filter(|q| !q.trim().is_empty()) else {
                anyhow::bail!("No question given. Usage: ra \"<question>\"");
            };
            let config = load_config(&cli)?;
            research_mode(&cli, &config, question).await
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let overrides = Overrides {
        search_engine: cli.search_engine.clone(),
        report_type: cli.report_type.clone(),
        prompt_language: cli.prompt_language.clone(),
        model: cli.model.clone(),
    };
    Config::load(cli.config.as_deref(), &overrides)
}

async fn research_mode(cli: &Cli, config: &Config, question: &str) -> Result<()> {
    let provider = create_provider(config)?;
    let search = resolve_search(config)?;
    let report_type = config.report_type;

    let pipeline = ResearchPipeline::builder(provider, search)
        .model(Some(config.model.clone()))
        .temperature(config.temperature)
        .prompt_language(config.prompt_language)
        .results_per_question(config.results_per_question)
        .max_page_chars(config.max_page_chars)
        .max_concurrency(config.max_concurrency)
        .fetch_timeout(Duration::from_secs(config.fetch_timeout_secs))
        .build();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted, cancelling research...");
            on_interrupt.cancel();
        }
    });

    tracing::info!(
        question,
        %report_type,
        engine = %config.search_engine,
        language = %config.prompt_language,
        "Starting research"
    );

    let result = if cli.bundle_only {
        pipeline.research(question, &cancel).await
    } else if cli.stream {
        stream_report(cli, &pipeline, question, report_type, &cancel).await
    } else {
        pipeline
            .run(question, report_type, &cancel)
            .await
            .map(|research| research.report)
    };

    let text = result.map_err(research_error)?;

    match &cli.output {
        Some(path) => {
            std::fs::write(path, &text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        // Streamed text is already on stdout
        None if cli.stream && !cli.bundle_only => println!(),
        None => println!("{}", text),
    }

    Ok(())
}

fn research_error(e: CoreError) -> anyhow::Error {
    match e {
        CoreError::Cancelled => anyhow::anyhow!("Research cancelled"),
        e if e.is_auth_error() => {
            anyhow::Error::new(e).context("The model API rejected the API key; check OPENAI_API_KEY or openai_api_key")
        }
        e => anyhow::Error::new(e).context("Research failed"),
    }
}

/// Gather the bundle, then stream the report. Deltas go to stdout unless an
/// output file was requested; the full text is returned either way.
async fn stream_report(
    cli: &Cli,
    pipeline: &ResearchPipeline,
    question: &str,
    report_type: ReportType,
    cancel: &CancellationToken,
) -> ra_core::Result<String> {
    let bundle = pipeline.research(question, cancel).await?;
    let mut stream = pipeline.stream_report(&bundle, question, report_type).await?;

    let mut report = String::new();
    let mut stdout = std::io::stdout();
    loop {
        let delta = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CoreError::Cancelled),
            delta = stream.next() => delta,
        };
        let Some(delta) = delta else { break };
        let delta = delta?;

        if cli.output.is_none() {
            print!("{}", delta);
            let _ = stdout.flush();
        }
        report.push_str(&delta);
    }

    Ok(report)
}

fn create_provider(config: &Config) -> Result<Arc<dyn Provider>> {
    let api_key = config
        .openai_api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No OpenAI API key configured. Set OPENAI_API_KEY or openai_api_key in {}",
                Config::config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| "config.toml".to_string())
            )
        })?;

    let mut openai = OpenAIProvider::new(api_key).with_default_model(config.model.as_str());
    if let Some(base_url) = &config.base_url {
        openai = openai.with_base_url(base_url.as_str());
    }

    let policy = RetryPolicy::default()
        .with_max_attempts(config.max_retries)
        .with_base_delay(Duration::from_millis(config.retry_base_delay_ms))
        .with_timeout(Duration::from_secs(config.model_timeout_secs));

    Ok(Arc::new(RetryProvider::new(Arc::new(openai), policy)))
}

fn resolve_search(config: &Config) -> Result<Arc<dyn SearchProvider>> {
    let registry = SearchRegistry::with_builtin(config.tavily_api_key.as_deref());

    if config.search_engine == TAVILY && registry.resolve(Some(TAVILY)).is_err() {
        anyhow::bail!("The tavily search engine needs an API key. Set TAVILY_API_KEY or tavily_api_key.");
    }

    registry
        .resolve(Some(config.search_engine.as_str()))
        .context("Unknown search engine")
}

fn show_config(config: &Config) -> Result<()> {
    let path = Config::config_path()?;
    println!("# Config file: {}", path.display());
    if !path.exists() {
        println!("# (not found; run `ra setup` to create it)");
    }
    println!();

    let rendered = toml::to_string_pretty(&config.masked()).context("Failed to render configuration")?;
    print!("{}", rendered);
    Ok(())
}
