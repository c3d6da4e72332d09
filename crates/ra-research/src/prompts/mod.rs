//! Prompt texts for every model call in the pipeline.
//!
//! Templates use `{name}` placeholders filled by [`crate::template::render`].
//! Each [`PromptLanguage`] has a complete [`PromptSet`]; German is the default.

use std::fmt;

use serde::{Deserialize, Serialize};

mod english;
mod german;

pub use english::ENGLISH;
pub use german::GERMAN;

/// One language's prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptSet {
    /// System prompt for persona selection. Placeholders: none.
    pub auto_agent_instructions: &'static str,
    /// User message for persona selection. Placeholders: `{task}`.
    pub choose_agent: &'static str,
    /// User message for query generation; the system message is the
    /// persona's role prompt. Placeholders: `{question}`.
    pub search_queries: &'static str,
    /// Per-page summarization. Placeholders: `{text}`, `{question}`.
    pub summary: &'static str,
    pub writer_system: &'static str,
    /// Report templates. Placeholders: `{research_summary}`, `{question}`.
    pub research_report: &'static str,
    pub resource_report: &'static str,
    pub outline_report: &'static str,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptLanguage {
    #[default]
    #[serde(alias = "de")]
    German,
    #[serde(alias = "en")]
    English,
}

impl PromptLanguage {
    pub fn prompts(&self) -> &'static PromptSet {
        match self {
            PromptLanguage::German => &GERMAN,
            PromptLanguage::English => &ENGLISH,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            PromptLanguage::German => "german",
            PromptLanguage::English => "english",
        }
    }
}

impl fmt::Display for PromptLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
