//! Report writing from a research bundle.

use std::fmt;

use futures::stream::{BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use ra_core::{Message, Result, StreamChunk};

use crate::llm::ModelClient;
use crate::prompts::PromptSet;
use crate::template::render;

/// Which report template the writer uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum ReportType {
    #[default]
    ResearchReport,
    ResourceReport,
    OutlineReport,
}

impl ReportType {
    pub const ALL: [ReportType; 3] = [
        ReportType::ResearchReport,
        ReportType::ResourceReport,
        ReportType::OutlineReport,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ReportType::ResearchReport => "research_report",
            ReportType::ResourceReport => "resource_report",
            ReportType::OutlineReport => "outline_report",
        }
    }

    /// Look up a report type by key. Unknown keys fall back to
    /// `research_report`.
    pub fn from_key(key: &str) -> Self {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.key() == key)
            .unwrap_or_else(|| {
                warn!(report_type = key, "Unknown report type; using research_report");
                ReportType::ResearchReport
            })
    }

    /// This report type's template from `prompts`.
    pub fn template(&self, prompts: &PromptSet) -> &'static str {
        match self {
            ReportType::ResearchReport => prompts.research_report,
            ReportType::ResourceReport => prompts.resource_report,
            ReportType::OutlineReport => prompts.outline_report,
        }
    }
}

impl From<String> for ReportType {
    fn from(key: String) -> Self {
        Self::from_key(&key)
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

pub struct ReportWriter {
    model: ModelClient,
}

impl ReportWriter {
    pub fn new(model: ModelClient) -> Self {
        Self { model }
    }

    pub fn messages(&self, bundle: &str, question: &str, report_type: ReportType) -> Vec<Message> {
        let prompts = self.model.prompts();
        vec![
            Message::system(prompts.writer_system),
            Message::user(render(
                report_type.template(prompts),
                &[("research_summary", bundle), ("question", question)],
            )),
        ]
    }

    pub async fn write(&self, bundle: &str, question: &str, report_type: ReportType) -> Result<String> {
        info!(%report_type, bundle_chars = bundle.len(), "Writing report");
        self.model.complete(self.messages(bundle, question, report_type)).await
    }

    /// Same request as [`write`](Self::write), yielding the report text as it
    /// arrives.
    pub async fn write_stream(
        &self,
        bundle: &str,
        question: &str,
        report_type: ReportType,
    ) -> Result<BoxStream<'static, Result<String>>> {
        info!(%report_type, bundle_chars = bundle.len(), "Streaming report");
        let stream = self.model.stream(self.messages(bundle, question, report_type)).await?;

        Ok(stream
            .filter_map(|chunk| async move {
                match chunk {
                    Ok(StreamChunk::Delta { content }) => Some(Ok(content)),
                    Ok(StreamChunk::Start { .. } | StreamChunk::Done { .. }) => None,
                    Err(e) => Some(Err(e)),
                }
            })
            .boxed())
    }
}
