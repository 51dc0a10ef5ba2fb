//! Hosted language-model integration
//!
//! Features:
//! - `ChatBackend` trait seam for the conversational assistant and the
//!   brief summarization call
//! - Cohere v2 chat backend over HTTP
//! - Prompt builders (sales assistant, structured brief)
//! - Lenient JSON extraction for model output

pub mod backend;
pub mod cohere;
pub mod extract;
pub mod prompt;

pub use backend::{ChatBackend, Message, Role};
pub use cohere::{CohereBackend, CohereConfig};
pub use extract::{extract_json, parse_brief};
pub use prompt::{brief_prompt, build_brief_payload, output_language, sales_system_prompt};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Network(format!("timeout: {}", err))
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for lead_desk_core::Error {
    fn from(err: LlmError) -> Self {
        lead_desk_core::Error::Llm(err.to_string())
    }
}
