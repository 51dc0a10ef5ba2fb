//! Cohere chat backend
//!
//! Implements the Cohere v2 chat API over HTTP. Non-streaming: the callers
//! need the full text to validate it before anything is shown to a user.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use lead_desk_config::LlmSettings;

use crate::backend::{ChatBackend, Message, Role};
use crate::LlmError;

/// Configuration for the Cohere backend
#[derive(Debug, Clone)]
pub struct CohereConfig {
    /// API key
    pub api_key: String,
    /// Model identifier
    pub model: String,
    /// API endpoint (for testing or proxy)
    pub endpoint: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for CohereConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "command-a-03-2025".to_string(),
            endpoint: "https://api.cohere.com".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl CohereConfig {
    /// Create config with API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Set model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build from application settings; `None` when no key is configured.
    pub fn from_settings(settings: &LlmSettings) -> Option<Self> {
        let api_key = settings.api_key.as_deref()?.trim();
        if api_key.is_empty() {
            return None;
        }
        Some(
            Self::new(api_key)
                .with_model(settings.model.clone())
                .with_endpoint(settings.endpoint.clone())
                .with_timeout(Duration::from_secs(settings.timeout_seconds)),
        )
    }
}

/// Cohere v2 chat backend
pub struct CohereBackend {
    config: CohereConfig,
    client: Client,
}

impl CohereBackend {
    pub fn new(config: CohereConfig) -> Result<Self, LlmError> {
        if config.api_key.is_empty() {
            return Err(LlmError::Configuration(
                "Cohere API key not set. Set it via LEAD_DESK_LLM__API_KEY or config.".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Network(e.to_string()))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl ChatBackend for CohereBackend {
    async fn chat(&self, system: &str, messages: &[Message]) -> Result<String, LlmError> {
        let mut wire_messages = Vec::with_capacity(messages.len() + 1);
        wire_messages.push(WireMessage {
            role: "system",
            content: system,
        });
        wire_messages.extend(messages.iter().map(|m| WireMessage {
            role: match m.role {
                Role::System => "system",
                Role::User => "user",
                Role::Assistant => "assistant",
            },
            content: &m.content,
        }));

        let request = ChatRequest {
            model: &self.config.model,
            messages: wire_messages,
        };

        let response = self
            .client
            .post(format!("{}/v2/chat", self.config.endpoint))
            .bearer_auth(&self.config.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, error_text)));
        }

        let response: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let text = response
            .message
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(LlmError::InvalidResponse(
                "empty completion text".to_string(),
            ));
        }

        tracing::debug!(
            model = %self.config.model,
            chars = text.len(),
            "Chat completion received"
        );

        Ok(text)
    }

    fn model_id(&self) -> &str {
        &self.config.model
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}
