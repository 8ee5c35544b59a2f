//! HTTP-backed web search tool
//!
//! Thin JSON client against a configurable search endpoint. The retrieval
//! implementation itself lives behind the endpoint; this adapter only
//! shapes queries and responses.

use async_trait::async_trait;
use serde::Deserialize;
use std::env;

use super::{SearchHit, SearchTool};
use crate::agents::error::{AgentError, AgentResult};
use crate::config::SearchSettings;

/// Web search tool calling a JSON search API
pub struct WebSearchTool {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    max_results: usize,
}

impl WebSearchTool {
    /// Create a new search tool from configuration
    pub fn new(settings: &SearchSettings) -> AgentResult<Self> {
        let api_key = match &settings.api_key_env {
            Some(var) => Some(env::var(var).map_err(|_| {
                AgentError::Configuration(format!("Environment variable {} not set", var))
            })?),
            None => None,
        };

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: settings.base_url.clone(),
            api_key,
            max_results: settings.max_results,
        })
    }
}

#[async_trait]
impl SearchTool for WebSearchTool {
    async fn search(&self, query: &str) -> AgentResult<Vec<SearchHit>> {
        let mut url = format!("{}?q={}", self.base_url, urlencoding::encode(query));
        if let Some(key) = &self.api_key {
            url.push_str(&format!("&api_key={}", key));
        }

        tracing::debug!(query, "Running web search");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AgentError::Search(format!("Search request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::Search(format!(
                "Search endpoint returned status {}",
                status.as_u16()
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Search(format!("Failed to parse search response: {}", e)))?;

        Ok(body
            .results
            .into_iter()
            .take(self.max_results)
            .map(|r| SearchHit {
                title: r.title,
                snippet: r.snippet.unwrap_or_default(),
                url: r.url,
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default, alias = "organic_results")]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    title: String,
    snippet: Option<String>,
    #[serde(alias = "link")]
    url: Option<String>,
}
