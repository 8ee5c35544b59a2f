//! Application configuration
//!
//! Settings are assembled from an optional `voyager.toml` file, `VOYAGER_*`
//! environment overrides, and built-in defaults.

use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::agents::llm::RetryPolicy;

/// Top-level application settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Application name used for logging and session attribution
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// Hosted model configuration
    #[serde(default)]
    pub llm: LlmSettings,
    /// Retry policy for outbound model requests
    #[serde(default)]
    pub retry: RetrySettings,
    /// Durable session store configuration
    #[serde(default)]
    pub session: SessionSettings,
    /// Web search tool configuration
    #[serde(default)]
    pub search: SearchSettings,
    /// Hard upper bound on one conversation turn, in seconds
    #[serde(default = "default_turn_timeout")]
    pub turn_timeout_secs: u64,
}

fn default_app_name() -> String {
    "conciergevoyager".to_string()
}

fn default_turn_timeout() -> u64 {
    300
}

/// Hosted model configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmSettings {
    /// Model identifier
    pub model: String,
    /// Environment variable holding the API credential
    pub api_key_env: String,
    /// Custom base URL (for proxied endpoints)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Default temperature for completions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Default max tokens for completions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash-lite".to_string(),
            api_key_env: "GOOGLE_API_KEY".to_string(),
            base_url: None,
            temperature: None,
            max_tokens: None,
        }
    }
}

/// Retry policy configuration for model requests
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrySettings {
    /// Maximum attempts total
    pub attempts: u32,
    /// Exponential backoff base
    pub exp_base: u32,
    /// Delay before the second attempt, in milliseconds
    pub initial_delay_ms: u64,
    /// HTTP status codes considered retryable
    pub retryable_status: Vec<u16>,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            attempts: 5,
            exp_base: 2,
            initial_delay_ms: 1000,
            retryable_status: vec![429, 500, 503, 504],
        }
    }
}

impl RetrySettings {
    /// Build the runtime retry policy
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.attempts,
            exp_base: self.exp_base,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            retryable_status: self.retryable_status.clone(),
        }
    }
}

/// Durable session store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionSettings {
    /// SQLite database URL
    pub database_url: String,
    /// Maximum connections in the pool
    pub max_connections: u32,
    /// Connection acquire timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://agent_sessions.db?mode=rwc".to_string(),
            max_connections: 5,
            connect_timeout_secs: 10,
        }
    }
}

/// Web search tool configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchSettings {
    /// Search endpoint base URL
    pub base_url: String,
    /// Environment variable holding the search API key, if the endpoint
    /// requires one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    /// Maximum hits to feed a worker prompt
    pub max_results: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            base_url: "https://serpapi.com/search".to_string(),
            api_key_env: None,
            max_results: 5,
        }
    }
}

impl Settings {
    /// Load settings from `voyager.toml` plus `VOYAGER_*` env overrides
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::from_file("voyager.toml")
    }

    /// Load settings from a specific config file path
    pub fn from_file(path: &str) -> Result<Self, anyhow::Error> {
        let s = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("VOYAGER").separator("__"))
            .build()?;

        let settings: Settings = s.try_deserialize()?;
        Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            llm: LlmSettings::default(),
            retry: RetrySettings::default(),
            session: SessionSettings::default(),
            search: SearchSettings::default(),
            turn_timeout_secs: default_turn_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_policy() {
        let settings = Settings::default();
        assert_eq!(settings.retry.attempts, 5);
        assert_eq!(settings.retry.exp_base, 2);
        assert_eq!(settings.retry.initial_delay_ms, 1000);
        assert_eq!(settings.retry.retryable_status, vec![429, 500, 503, 504]);
        assert_eq!(settings.llm.model, "gemini-2.5-flash-lite");
        assert_eq!(settings.llm.api_key_env, "GOOGLE_API_KEY");
        assert!(settings.session.database_url.starts_with("sqlite://"));
    }
}
