//! Voyager: a multi-agent travel planning assistant
//!
//! A router agent collects trip parameters across conversation turns,
//! then fans out to flight, hotel and activity worker agents and
//! synthesizes their results into trip packages. Sessions are durable in
//! SQLite; the hosted model is called through a retrying client.

pub mod agents;
pub mod config;
pub mod persistence;

pub use agents::error::{AgentError, AgentResult, LlmError, LlmResult};
pub use agents::AppContext;
pub use config::Settings;
