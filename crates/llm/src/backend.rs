//! Chat backend trait

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::LlmError;

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message in a model conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A hosted chat-completion backend.
///
/// One call per user action, no retries: callers catch the error and fall
/// back to deterministic behavior.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Run one completion. `messages` excludes the system prompt, which is
    /// passed separately and prepended by the implementation.
    async fn chat(&self, system: &str, messages: &[Message]) -> Result<String, LlmError>;

    /// Model identifier recorded on lead audit fields.
    fn model_id(&self) -> &str;
}
