//! Query planning: pick a persona for the task, then ask it for search queries.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use ra_core::{Message, Result};

use crate::json::ModelJson;
use crate::llm::ModelClient;
use crate::template::render;

/// The persona chosen for a task. Both fields are empty when the model's
/// answer could not be parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSelection {
    #[serde(default)]
    pub agent: Option<String>,
    #[serde(default, rename = "agent_role_prompt")]
    pub role_prompt: Option<String>,
}

impl AgentSelection {
    /// Pick the string fields out of a JSON object. Fields that are missing
    /// or not strings are left empty; anything but an object yields `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let field = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);

        Some(Self {
            agent: field("agent"),
            role_prompt: field("agent_role_prompt"),
        })
    }

    /// The role prompt, or an empty string when none was chosen.
    pub fn role_prompt(&self) -> &str {
        self.role_prompt.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPlan {
    pub agent: AgentSelection,
    pub queries: Vec<String>,
}

pub struct QueryPlanner {
    model: ModelClient,
}

impl QueryPlanner {
    pub fn new(model: ModelClient) -> Self {
        Self { model }
    }

    pub async fn choose_agent(&self, task: &str) -> Result<AgentSelection> {
        let prompts = self.model.prompts();
        let messages = vec![
            Message::system(prompts.auto_agent_instructions),
            Message::user(render(prompts.choose_agent, &[("task", task)])),
        ];
        let raw = self.model.complete(messages).await?;

        let selection = ModelJson::<Value>::parse(&raw)
            .into_option()
            .and_then(|value| AgentSelection::from_value(&value));
        match selection {
            Some(selection) => Ok(selection),
            None => {
                warn!(response = %raw, "Agent selection was not a JSON object; continuing without a role prompt");
                Ok(AgentSelection::default())
            }
        }
    }

    /// Ask the persona for search queries. The parsed list is returned as is:
    /// order kept, length not checked.
    pub async fn generate_queries(&self, role_prompt: &str, question: &str) -> Result<Vec<String>> {
        let messages = vec![
            Message::system(role_prompt),
            Message::user(render(self.model.prompts().search_queries, &[("question", question)])),
        ];
        let raw = self.model.complete(messages).await?;

        match ModelJson::<Vec<String>>::parse(&raw) {
            ModelJson::Parsed(queries) => Ok(queries),
            ModelJson::Fallback => {
                warn!(response = %raw, "Search queries were not a JSON string array; no queries generated");
                Ok(Vec::new())
            }
        }
    }

    pub async fn plan(&self, task: &str) -> Result<QueryPlan> {
        let agent = self.choose_agent(task).await?;
        info!(agent = agent.agent.as_deref().unwrap_or("<none>"), "Selected research agent");

        let queries = self.generate_queries(agent.role_prompt(), task).await?;
        info!(count = queries.len(), "Generated search queries");

        Ok(QueryPlan { agent, queries })
    }
}
