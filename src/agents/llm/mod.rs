//! LLM client abstraction and implementations
//!
//! A single trait seam over the hosted model so the router and workers can
//! be exercised with test doubles, plus the transparently-retrying wrapper
//! applied to every outbound request.

mod gemini;
mod retry;

pub use gemini::GeminiClient;
pub use retry::{Retrying, RetryPolicy};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::agents::domain::Message;
use crate::agents::error::LlmResult;

/// Trait for LLM clients
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Get the model identifier being used
    fn model(&self) -> &str;

    /// Complete a request (non-streaming)
    async fn complete(&self, request: CompletionRequest) -> LlmResult<CompletionResponse>;
}

/// Request for LLM completion
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CompletionRequest {
    /// Messages in the conversation
    pub messages: Vec<Message>,
    /// Temperature for sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    /// Build a request from a system instruction and a user prompt
    pub fn from_prompts(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system), Message::user(user)],
            ..Default::default()
        }
    }
}

/// Response from LLM completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated message
    pub message: Message,
    /// Token usage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

impl CompletionResponse {
    /// The generated text
    pub fn text(&self) -> &str {
        &self.message.content
    }
}

/// Token usage information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}
