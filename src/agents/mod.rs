//! Multi-agent travel planning
//!
//! A router agent owns the conversation and fans out to three specialized
//! worker agents (flights, hotels, activities) once the trip request is
//! complete. All model traffic goes through a retrying client wrapper;
//! sessions are persisted to SQLite.

pub mod domain;
pub mod error;
pub mod llm;
pub mod memory;
pub mod router;
pub mod runner;
pub mod tools;
pub mod workers;

use std::sync::Arc;
use std::time::Duration;

use crate::config::Settings;
use error::AgentResult;
use llm::{GeminiClient, LlmClient, Retrying};
use memory::{InMemoryMemoryService, MemoryService, SessionStore, SqliteSessionStore};
use router::RouterAgent;
use runner::Runner;
use tools::{SearchTool, WebSearchTool};
use workers::{ActivitiesAgent, FlightAgent, HotelAgent};

/// Wired application: every service built from settings, behind its trait
pub struct AppContext {
    pub runner: Runner,
    pub memory: Arc<InMemoryMemoryService>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppContext {
    /// Build the full agent stack from settings. Fails fast on missing
    /// credentials or an unreachable session database.
    pub async fn initialize(settings: &Settings) -> AgentResult<Self> {
        let gemini = GeminiClient::new(&settings.llm)?;
        let llm: Arc<dyn LlmClient> = Arc::new(Retrying::new(gemini, settings.retry.policy()));
        tracing::info!(model = %settings.llm.model, "Model client ready");

        let search: Arc<dyn SearchTool> = Arc::new(WebSearchTool::new(&settings.search)?);

        let sessions: Arc<dyn SessionStore> = Arc::new(
            SqliteSessionStore::connect(
                &settings.session.database_url,
                settings.session.max_connections,
                settings.session.connect_timeout_secs,
            )
            .await?,
        );
        tracing::info!(url = %settings.session.database_url, "Session store ready");

        let memory = Arc::new(InMemoryMemoryService::new());
        let memory_service: Arc<dyn MemoryService> = memory.clone();

        let router = Arc::new(RouterAgent::new(
            llm.clone(),
            Arc::new(FlightAgent::new(llm.clone(), search.clone())),
            Arc::new(HotelAgent::new(llm.clone(), search.clone())),
            Arc::new(ActivitiesAgent::new(llm.clone(), search)),
            sessions.clone(),
            memory_service,
        ));

        let runner = Runner::new(
            settings.app_name.clone(),
            router,
            Duration::from_secs(settings.turn_timeout_secs),
        );

        Ok(Self {
            runner,
            memory,
            sessions,
        })
    }
}
