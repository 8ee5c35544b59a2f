//! Flight worker agent

use std::sync::Arc;

use async_trait::async_trait;

use super::{parse_options, render_prompt, WorkerAgent};
use crate::agents::domain::{FacetOptions, SubTask, TravelFacet};
use crate::agents::error::AgentResult;
use crate::agents::llm::{CompletionRequest, LlmClient};
use crate::agents::tools::SearchTool;

const INSTRUCTION: &str = "You are a travel agent tasked with finding 2-3 relevant flight options \
given an origin airport, destination, and travel dates. \
Return prices, times, and airlines, one option per line, as a bullet list. \
Respond in {{language}}.";

const PROMPT: &str = "Find flight options from {{origin}} to {{destinations}} for {{dates}} \
({{duration_days}} days, budget {{budget}}).\n\nWeb search results:\n{{search_results}}";

/// Worker agent scoped to flight options
pub struct FlightAgent {
    llm: Arc<dyn LlmClient>,
    search: Arc<dyn SearchTool>,
}

impl FlightAgent {
    pub fn new(llm: Arc<dyn LlmClient>, search: Arc<dyn SearchTool>) -> Self {
        Self { llm, search }
    }

    fn search_query(task: &SubTask) -> String {
        format!(
            "flights from {} to {} {}",
            task.origin.as_deref().unwrap_or(""),
            task.destinations.join(" "),
            task.dates.as_deref().unwrap_or("")
        )
    }
}

#[async_trait]
impl WorkerAgent for FlightAgent {
    fn facet(&self) -> TravelFacet {
        TravelFacet::Flight
    }

    async fn answer(&self, task: &SubTask) -> AgentResult<FacetOptions> {
        let hits = self.search.search(&Self::search_query(task)).await?;
        tracing::debug!(hits = hits.len(), "Flight search completed");

        let instruction = render_prompt(INSTRUCTION, task, &hits)?;
        let prompt = render_prompt(PROMPT, task, &hits)?;

        let response = self
            .llm
            .complete(CompletionRequest::from_prompts(instruction, prompt))
            .await?;

        parse_options(response.text(), self.facet())
    }
}
