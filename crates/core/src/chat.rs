//! Chat transcript turns

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel session key used when the caller supplies none.
pub const UNKNOWN_SESSION: &str = "unknown";

/// One exchange in a chat session: the user message and the assistant reply.
///
/// Transcripts are append-only and strictly ordered by arrival; a turn is
/// never edited or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub timestamp: DateTime<Utc>,
    pub user: String,
    pub assistant: String,
}

impl ChatTurn {
    pub fn new(user: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            user: user.into(),
            assistant: assistant.into(),
        }
    }
}

/// Normalize a caller-supplied session id; blank or missing falls back to
/// the sentinel.
pub fn normalize_session_id(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => UNKNOWN_SESSION.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_fallback() {
        assert_eq!(normalize_session_id(None), UNKNOWN_SESSION);
        assert_eq!(normalize_session_id(Some("   ")), UNKNOWN_SESSION);
        assert_eq!(normalize_session_id(Some(" visitor-12 ")), "visitor-12");
    }

    #[test]
    fn test_turn_creation() {
        let turn = ChatTurn::new("bonjour", "Bonjour !");
        assert_eq!(turn.user, "bonjour");
        assert_eq!(turn.assistant, "Bonjour !");
    }
}
