//! Turn runner: the application-facing entry point around the router
//!
//! Wraps each turn in the configured timeout so one stuck upstream call
//! cannot wedge the conversation loop.

use std::sync::Arc;
use std::time::Duration;

use crate::agents::error::{AgentError, AgentResult};
use crate::agents::router::RouterAgent;

pub struct Runner {
    app_name: String,
    router: Arc<RouterAgent>,
    turn_timeout: Duration,
}

impl Runner {
    pub fn new(app_name: impl Into<String>, router: Arc<RouterAgent>, turn_timeout: Duration) -> Self {
        Self {
            app_name: app_name.into(),
            router,
            turn_timeout,
        }
    }

    /// Application name, used for log correlation
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Run one user turn against the router, bounded by the turn timeout
    pub async fn run_turn(&self, session_id: &str, utterance: &str) -> AgentResult<String> {
        tracing::info!(app = %self.app_name, session_id, "Processing turn");

        match tokio::time::timeout(self.turn_timeout, self.router.handle_turn(session_id, utterance))
            .await
        {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(session_id, "Turn timed out");
                Err(AgentError::Timeout(self.turn_timeout.as_secs()))
            }
        }
    }
}
