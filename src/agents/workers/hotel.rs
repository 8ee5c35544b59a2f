//! Hotel worker agent

use std::sync::Arc;

use async_trait::async_trait;

use super::{parse_options, render_prompt, WorkerAgent};
use crate::agents::domain::{FacetOptions, SubTask, TravelFacet};
use crate::agents::error::AgentResult;
use crate::agents::llm::{CompletionRequest, LlmClient};
use crate::agents::tools::SearchTool;

const INSTRUCTION: &str = "You are a hotel agent tasked with finding 2-3 accommodation options \
given destination, dates, and approximate budget. \
Include area, rating, and price range, one option per line, as a bullet list. \
Respond in {{language}}.";

const PROMPT: &str = "Find accommodation in {{destinations}} for {{dates}} \
({{duration_days}} nights, budget {{budget}}).\n\nWeb search results:\n{{search_results}}";

/// Worker agent scoped to accommodation options
pub struct HotelAgent {
    llm: Arc<dyn LlmClient>,
    search: Arc<dyn SearchTool>,
}

impl HotelAgent {
    pub fn new(llm: Arc<dyn LlmClient>, search: Arc<dyn SearchTool>) -> Self {
        Self { llm, search }
    }

    fn search_query(task: &SubTask) -> String {
        format!(
            "hotels in {} {} budget {}",
            task.destinations.join(" "),
            task.dates.as_deref().unwrap_or(""),
            task.budget.as_deref().unwrap_or("")
        )
    }
}

#[async_trait]
impl WorkerAgent for HotelAgent {
    fn facet(&self) -> TravelFacet {
        TravelFacet::Hotel
    }

    async fn answer(&self, task: &SubTask) -> AgentResult<FacetOptions> {
        let hits = self.search.search(&Self::search_query(task)).await?;
        tracing::debug!(hits = hits.len(), "Hotel search completed");

        let instruction = render_prompt(INSTRUCTION, task, &hits)?;
        let prompt = render_prompt(PROMPT, task, &hits)?;

        let response = self
            .llm
            .complete(CompletionRequest::from_prompts(instruction, prompt))
            .await?;

        parse_options(response.text(), self.facet())
    }
}
