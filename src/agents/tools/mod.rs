//! External tool surface for worker agents
//!
//! Each worker exposes exactly one capability: web search. The trait seam
//! keeps the retrieval backend swappable and lets tests run without a
//! network.

mod web_search;

pub use web_search::WebSearchTool;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::agents::error::AgentResult;

/// One search result fed into a worker prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Trait for the web search capability
#[async_trait]
pub trait SearchTool: Send + Sync {
    /// Run a search query and return ranked hits
    async fn search(&self, query: &str) -> AgentResult<Vec<SearchHit>>;
}
