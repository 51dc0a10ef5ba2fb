//! Sales assistant orchestration
//!
//! One inbound message triggers at most one model call, whose output the
//! guard validates before anything reaches the user. Any model failure is
//! caught here and handed to the guard as an absent candidate; the final
//! reply is therefore always non-empty and always carries the footer.

use std::sync::Arc;

use lead_desk_config::Catalog;
use lead_desk_core::ChatTurn;
use lead_desk_llm::{sales_system_prompt, ChatBackend, Message};

use crate::guard::ReplyGuard;

/// How much transcript the model sees, in turns.
const HISTORY_WINDOW: usize = 6;

/// The conversational sales assistant.
pub struct SalesAgent {
    guard: ReplyGuard,
    backend: Option<Arc<dyn ChatBackend>>,
    system_prompt: String,
}

impl SalesAgent {
    /// `backend` is `None` when no model is configured; replies then come
    /// from the canned generator only.
    pub fn new(catalog: Arc<Catalog>, backend: Option<Arc<dyn ChatBackend>>) -> Self {
        let system_prompt = sales_system_prompt(&catalog);
        Self {
            guard: ReplyGuard::new(catalog),
            backend,
            system_prompt,
        }
    }

    /// Compute the reply for one user message given the session history.
    pub async fn reply(&self, user_text: &str, history: &[ChatTurn]) -> String {
        let candidate = match &self.backend {
            Some(backend) => {
                let messages = build_messages(history, user_text);
                match backend.chat(&self.system_prompt, &messages).await {
                    Ok(text) => Some(text),
                    Err(e) => {
                        tracing::warn!(error = %e, "Model call failed, falling back to canned reply");
                        None
                    }
                }
            }
            None => None,
        };

        self.guard.review(user_text, candidate)
    }

    pub fn guard(&self) -> &ReplyGuard {
        &self.guard
    }
}

/// Last few turns plus the new message, oldest first.
fn build_messages(history: &[ChatTurn], user_text: &str) -> Vec<Message> {
    let tail_start = history.len().saturating_sub(HISTORY_WINDOW);
    let mut messages = Vec::with_capacity((history.len() - tail_start) * 2 + 1);
    for turn in &history[tail_start..] {
        messages.push(Message::user(&turn.user));
        messages.push(Message::assistant(&turn.assistant));
    }
    messages.push(Message::user(user_text));
    messages
}
