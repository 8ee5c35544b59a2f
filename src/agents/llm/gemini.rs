//! Google Gemini LLM client

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::env;

use super::{CompletionRequest, CompletionResponse, LlmClient, TokenUsage};
use crate::agents::domain::{Message, Role};
use crate::agents::error::{LlmError, LlmResult};
use crate::config::LlmSettings;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini LLM client
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    default_temperature: Option<f32>,
    default_max_tokens: Option<u32>,
}

impl GeminiClient {
    /// Create a new Gemini client from configuration. The API key is read
    /// from the configured environment variable; absence is fatal.
    pub fn new(settings: &LlmSettings) -> LlmResult<Self> {
        let api_key = env::var(&settings.api_key_env).map_err(|_| {
            LlmError::Authentication(format!(
                "Environment variable {} not set",
                settings.api_key_env
            ))
        })?;

        let base_url = settings
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
            model: settings.model.clone(),
            default_temperature: settings.temperature,
            default_max_tokens: settings.max_tokens,
        })
    }

    /// Build the request body for the generateContent endpoint
    fn build_request_body(&self, request: &CompletionRequest) -> Value {
        let mut body = json!({
            "contents": self.convert_messages(&request.messages),
        });

        let mut generation_config = json!({});

        if let Some(temp) = request.temperature.or(self.default_temperature) {
            generation_config["temperature"] = json!(temp);
        }

        if let Some(max_tokens) = request.max_tokens.or(self.default_max_tokens) {
            generation_config["maxOutputTokens"] = json!(max_tokens);
        }

        if generation_config
            .as_object()
            .map_or(false, |o| !o.is_empty())
        {
            body["generationConfig"] = generation_config;
        }

        body
    }

    /// Convert internal messages to Gemini format
    fn convert_messages(&self, messages: &[Message]) -> Vec<Value> {
        let mut contents = Vec::new();
        let mut system_instruction: Option<String> = None;

        for m in messages {
            match m.role {
                Role::System => {
                    // Gemini takes system prompts prepended to the first user
                    // message rather than as a separate role
                    system_instruction = Some(m.content.clone());
                }
                Role::User => {
                    let mut parts = vec![json!({ "text": m.content })];

                    if let Some(sys) = system_instruction.take() {
                        parts.insert(
                            0,
                            json!({ "text": format!("[System Instructions]\n{}\n\n", sys) }),
                        );
                    }

                    contents.push(json!({
                        "role": "user",
                        "parts": parts
                    }));
                }
                Role::Assistant => {
                    if !m.content.is_empty() {
                        contents.push(json!({
                            "role": "model",
                            "parts": [{ "text": m.content }]
                        }));
                    }
                }
            }
        }

        contents
    }

    /// Parse a generateContent response
    fn parse_response(&self, response: &GeminiResponse) -> LlmResult<CompletionResponse> {
        let candidate = response
            .candidates
            .first()
            .ok_or_else(|| LlmError::Parse("No candidates in response".to_string()))?;

        let mut content = String::new();
        if let Some(parts) = &candidate.content.parts {
            for part in parts {
                if let Some(text) = &part.text {
                    content.push_str(text);
                }
            }
        }

        let usage = response.usage_metadata.as_ref().map(|u| TokenUsage {
            prompt_tokens: u.prompt_token_count.unwrap_or(0),
            completion_tokens: u.candidates_token_count.unwrap_or(0),
            total_tokens: u.total_token_count.unwrap_or(0),
        });

        Ok(CompletionResponse {
            message: Message::assistant(content),
            usage,
        })
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> LlmResult<CompletionResponse> {
        let body = self.build_request_body(&request);

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(format!("Failed to parse response: {}", e)))?;

        self.parse_response(&gemini_response)
    }
}

// Gemini API response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: GeminiContent,
    #[allow(dead_code)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiContent {
    parts: Option<Vec<GeminiPart>>,
    #[allow(dead_code)]
    role: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
    total_token_count: Option<u32>,
}
