//! Research aggregation: plan, search, then summarize every hit in parallel.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use ra_core::{Error, Result};
use ra_web::SearchProvider;

use crate::planner::QueryPlanner;
use crate::summarizer::{PageSummary, Summarizer};

/// URLs requested from the search backend for each generated query.
pub const RESULTS_PER_QUESTION: usize = 3;

/// Upper bound on concurrent leaf calls (searches and summarizations).
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// A result URL tagged with the query that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub url: String,
    pub question: String,
}

pub struct ResearchAggregator {
    planner: QueryPlanner,
    search: Arc<dyn SearchProvider>,
    summarizer: Summarizer,
    results_per_question: usize,
    limiter: Arc<Semaphore>,
}

impl ResearchAggregator {
    pub fn new(planner: QueryPlanner, search: Arc<dyn SearchProvider>, summarizer: Summarizer) -> Self {
        Self {
            planner,
            search,
            summarizer,
            results_per_question: RESULTS_PER_QUESTION,
            limiter: Arc::new(Semaphore::new(DEFAULT_MAX_CONCURRENCY)),
        }
    }

    pub fn with_results_per_question(mut self, count: usize) -> Self {
        self.results_per_question = count;
        self
    }

    pub fn with_max_concurrency(mut self, permits: usize) -> Self {
        self.limiter = Arc::new(Semaphore::new(permits.max(1)));
        self
    }

    /// Build the research bundle for `task`.
    ///
    /// Summaries of one query are joined with a newline and the per-query
    /// blocks with a blank line, in query order. No queries, or no hits,
    /// yields an empty bundle. Cancelling `cancel` drops all in-flight work
    /// and returns [`Error::Cancelled`].
    pub async fn aggregate(&self, task: &str, cancel: &CancellationToken) -> Result<String> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Research cancelled");
                Err(Error::Cancelled)
            }
            result = self.collect(task) => result,
        }
    }

    async fn collect(&self, task: &str) -> Result<String> {
        let plan = self.planner.plan(task).await?;
        if plan.queries.is_empty() {
            warn!("No search queries generated; research bundle is empty");
            return Ok(String::new());
        }

        let blocks = join_all(plan.queries.iter().map(|query| self.research_query(query))).await;
        let bundle = blocks
            .into_iter()
            .filter(|block| !block.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");

        info!(chars = bundle.len(), "Research bundle assembled");
        Ok(bundle)
    }

    /// Search one query and summarize each hit. Summaries are joined with a
    /// newline in hit order; an empty string means nothing was found.
    pub async fn research_query(&self, query: &str) -> String {
        let hits = self.search_hits(query).await;
        let summaries = join_all(hits.iter().map(|hit| self.summarize_hit(hit))).await;

        summaries
            .iter()
            .map(PageSummary::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Search failures are logged and count as zero hits.
    pub async fn search_hits(&self, query: &str) -> Vec<SearchHit> {
        let urls = {
            let _permit = self.limiter.acquire().await;
            self.search.search(query, self.results_per_question).await
        };

        match urls {
            Ok(urls) => {
                debug!(query, hits = urls.len(), engine = self.search.name(), "Search finished");
                urls.into_iter()
                    .map(|url| SearchHit {
                        url,
                        question: query.to_string(),
                    })
                    .collect()
            }
            Err(e) => {
                warn!(query, engine = self.search.name(), error = %e, "Search failed; continuing without results");
                Vec::new()
            }
        }
    }

    async fn summarize_hit(&self, hit: &SearchHit) -> PageSummary {
        let _permit = self.limiter.acquire().await;
        match self.summarizer.summarize(&hit.url, &hit.question).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(url = %hit.url, error = %e, "Summarization failed");
                PageSummary::failed(&hit.url, e)
            }
        }
    }
}
