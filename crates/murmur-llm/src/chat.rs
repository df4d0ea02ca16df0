//! OpenAI-compatible chat completion client.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use murmur_types::{Role, Turn};

use crate::error::LlmError;

/// Default base URL for the completion API.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Timeout for a single completion request.
const COMPLETION_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for one logical completion model.
#[derive(Clone, Deserialize)]
pub struct ModelConfig {
    /// Completion model identifier, e.g. `gpt-4o-mini`.
    pub model: String,

    /// Sampling temperature, 0.0–1.0.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// API base URL. Defaults to the OpenAI endpoint.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Bearer token for the API. Injected from the environment by the
    /// worker, never stored in config files.
    #[serde(default)]
    pub api_key: String,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::new("gpt-4o-mini", default_temperature())
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("api_base", &self.api_base)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl ModelConfig {
    pub fn new(model: impl Into<String>, temperature: f32) -> Self {
        Self {
            model: model.into(),
            temperature,
            api_base: default_api_base(),
            api_key: String::new(),
        }
    }

    /// Sets the bearer token.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }
}

/// A model that turns an ordered list of turns into a reply.
///
/// The session core only sees this trait; tests substitute a scripted
/// implementation.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, turns: &[Turn]) -> Result<String, LlmError>;
}

/// [`ChatModel`] backed by an OpenAI-compatible chat completions endpoint.
pub struct OpenAiChatModel {
    config: ModelConfig,
    client: Client,
}

impl OpenAiChatModel {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Maps a storage role to its chat-completions wire name.
    ///
    /// The memory log says `human`; the API says `user`.
    fn wire_role(role: Role) -> &'static str {
        match role {
            Role::System => "system",
            Role::Human => "user",
            Role::Assistant => "assistant",
        }
    }

    fn request_body(&self, turns: &[Turn]) -> serde_json::Value {
        let messages: Vec<serde_json::Value> = turns
            .iter()
            .map(|t| {
                json!({
                    "role": Self::wire_role(t.role),
                    "content": t.content,
                })
            })
            .collect();

        json!({
            "model": self.config.model,
            "temperature": self.config.temperature,
            "messages": messages,
        })
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn complete(&self, turns: &[Turn]) -> Result<String, LlmError> {
        let url = format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        );

        debug!(
            model = %self.config.model,
            turns = turns.len(),
            "requesting chat completion"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&self.request_body(turns))
            .timeout(COMPLETION_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, body });
        }

        let body: serde_json::Value = response.json().await?;
        let text = body
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                LlmError::MalformedResponse("no choices[0].message.content in response".to_string())
            })?;

        Ok(text.to_string())
    }
}
