//! Activities worker agent

use std::sync::Arc;

use async_trait::async_trait;

use super::{parse_options, render_prompt, WorkerAgent};
use crate::agents::domain::{FacetOptions, SubTask, TravelFacet};
use crate::agents::error::AgentResult;
use crate::agents::llm::{CompletionRequest, LlmClient};
use crate::agents::tools::SearchTool;

const INSTRUCTION: &str = "You are an activities agent tasked with recommending 3-5 relevant local \
activities or excursions for a given destination and trip length. \
Respond with concise bullet points, one activity per line. \
Respond in {{language}}.";

const PROMPT: &str = "Recommend things to do in {{destinations}} during {{dates}} \
for a {{duration_days}}-day trip.\n\nWeb search results:\n{{search_results}}";

/// Worker agent scoped to local activities and excursions
pub struct ActivitiesAgent {
    llm: Arc<dyn LlmClient>,
    search: Arc<dyn SearchTool>,
}

impl ActivitiesAgent {
    pub fn new(llm: Arc<dyn LlmClient>, search: Arc<dyn SearchTool>) -> Self {
        Self { llm, search }
    }

    fn search_query(task: &SubTask) -> String {
        format!(
            "things to do in {} {}",
            task.destinations.join(" "),
            task.dates.as_deref().unwrap_or("")
        )
    }
}

#[async_trait]
impl WorkerAgent for ActivitiesAgent {
    fn facet(&self) -> TravelFacet {
        TravelFacet::Activities
    }

    async fn answer(&self, task: &SubTask) -> AgentResult<FacetOptions> {
        let hits = self.search.search(&Self::search_query(task)).await?;
        tracing::debug!(hits = hits.len(), "Activities search completed");

        let instruction = render_prompt(INSTRUCTION, task, &hits)?;
        let prompt = render_prompt(PROMPT, task, &hits)?;

        let response = self
            .llm
            .complete(CompletionRequest::from_prompts(instruction, prompt))
            .await?;

        parse_options(response.text(), self.facet())
    }
}
