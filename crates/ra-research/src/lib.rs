//! Research pipeline stages for research-assistant.
//!
//! This crate provides:
//! - `QueryPlanner`: persona selection and search query generation
//! - `Summarizer`: fetch a page and summarize it against a question
//! - `ResearchAggregator`: bounded fan-out from queries to a research bundle
//! - `ReportWriter`: Markdown report from a bundle, one of three templates
//! - `PromptLanguage`: German (default) or English prompt texts
//! - `ResearchPipeline`: the stages wired together with injected providers

pub mod aggregator;
pub mod json;
pub mod llm;
pub mod pipeline;
pub mod planner;
pub mod prompts;
pub mod summarizer;
pub mod template;
pub mod writer;

pub use aggregator::{ResearchAggregator, SearchHit, DEFAULT_MAX_CONCURRENCY, RESULTS_PER_QUESTION};
pub use json::ModelJson;
pub use llm::{ModelClient, DEFAULT_TEMPERATURE};
pub use pipeline::{PipelineBuilder, ResearchPipeline, ResearchReport};
pub use planner::{AgentSelection, QueryPlan, QueryPlanner};
pub use prompts::{PromptLanguage, PromptSet};
pub use summarizer::{PageSummary, Summarizer, MAX_PAGE_CHARS};
pub use writer::{ReportType, ReportWriter};

pub use tokio_util::sync::CancellationToken;
