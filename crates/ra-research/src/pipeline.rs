//! End-to-end research pipeline: aggregate, then write.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::BoxStream;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use ra_core::{Error, Provider, Result};
use ra_web::{HttpPageFetcher, PageFetcher, SearchProvider};

use crate::aggregator::{ResearchAggregator, DEFAULT_MAX_CONCURRENCY, RESULTS_PER_QUESTION};
use crate::llm::{ModelClient, DEFAULT_TEMPERATURE};
use crate::planner::QueryPlanner;
use crate::prompts::PromptLanguage;
use crate::summarizer::{Summarizer, MAX_PAGE_CHARS};
use crate::writer::{ReportType, ReportWriter};

/// Everything one pipeline run produced.
#[derive(Debug, Clone, Serialize)]
pub struct ResearchReport {
    pub question: String,
    pub report_type: ReportType,
    pub bundle: String,
    pub report: String,
}

pub struct ResearchPipeline {
    aggregator: ResearchAggregator,
    writer: ReportWriter,
}

impl ResearchPipeline {
    pub fn builder(provider: Arc<dyn Provider>, search: Arc<dyn SearchProvider>) -> PipelineBuilder {
        PipelineBuilder::new(provider, search)
    }

    pub fn new(aggregator: ResearchAggregator, writer: ReportWriter) -> Self {
        Self { aggregator, writer }
    }

    /// Gather the research bundle only.
    pub async fn research(&self, question: &str, cancel: &CancellationToken) -> Result<String> {
        self.aggregator.aggregate(question, cancel).await
    }

    pub async fn run(
        &self,
        question: &str,
        report_type: ReportType,
        cancel: &CancellationToken,
    ) -> Result<ResearchReport> {
        let bundle = self.research(question, cancel).await?;

        let report = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            report = self.writer.write(&bundle, question, report_type) => report?,
        };
        info!(%report_type, report_chars = report.len(), "Report finished");

        Ok(ResearchReport {
            question: question.to_string(),
            report_type,
            bundle,
            report,
        })
    }

    /// Stream the report for an already gathered `bundle`.
    pub async fn stream_report(
        &self,
        bundle: &str,
        question: &str,
        report_type: ReportType,
    ) -> Result<BoxStream<'static, Result<String>>> {
        self.writer.write_stream(bundle, question, report_type).await
    }
}

/// Assembles a [`ResearchPipeline`] from a model provider and a search
/// backend. The page fetcher defaults to [`HttpPageFetcher`].
pub struct PipelineBuilder {
    provider: Arc<dyn Provider>,
    search: Arc<dyn SearchProvider>,
    fetcher: Option<Arc<dyn PageFetcher>>,
    model: Option<String>,
    temperature: f32,
    language: PromptLanguage,
    results_per_question: usize,
    max_page_chars: usize,
    max_concurrency: usize,
    fetch_timeout: Option<Duration>,
}

impl PipelineBuilder {
    pub fn new(provider: Arc<dyn Provider>, search: Arc<dyn SearchProvider>) -> Self {
        Self {
            provider,
            search,
            fetcher: None,
            model: None,
            temperature: DEFAULT_TEMPERATURE,
            language: PromptLanguage::default(),
            results_per_question: RESULTS_PER_QUESTION,
            max_page_chars: MAX_PAGE_CHARS,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            fetch_timeout: None,
        }
    }

    pub fn fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn prompt_language(mut self, language: PromptLanguage) -> Self {
        self.language = language;
        self
    }

    pub fn results_per_question(mut self, count: usize) -> Self {
        self.results_per_question = count;
        self
    }

    pub fn max_page_chars(mut self, chars: usize) -> Self {
        self.max_page_chars = chars;
        self
    }

    pub fn max_concurrency(mut self, permits: usize) -> Self {
        self.max_concurrency = permits;
        self
    }

    /// Ignored when a custom fetcher is supplied.
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> ResearchPipeline {
        let model = ModelClient::new(self.provider)
            .with_model(self.model)
            .with_temperature(self.temperature)
            .with_language(self.language);

        let fetcher: Arc<dyn PageFetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(match self.fetch_timeout {
                Some(timeout) => HttpPageFetcher::with_timeout(timeout),
                None => HttpPageFetcher::new(),
            }),
        };

        let summarizer = Summarizer::new(fetcher, model.clone()).with_max_chars(self.max_page_chars);
        let aggregator = ResearchAggregator::new(QueryPlanner::new(model.clone()), self.search, summarizer)
            .with_results_per_question(self.results_per_question)
            .with_max_concurrency(self.max_concurrency);

        ResearchPipeline::new(aggregator, ReportWriter::new(model))
    }
}
