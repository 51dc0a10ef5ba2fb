//! Chat transcript persistence
//!
//! Transcripts are append-only: one clustered row per turn, keyed by a
//! monotonic per-session index so reads return arrival order. The insert
//! itself creates the partition on first write, which synthesizes
//! append-with-create semantics.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use lead_desk_core::ChatTurn;

use crate::{PersistenceError, ScyllaClient};

/// Chat transcript store trait
#[async_trait]
pub trait ChatLogStore: Send + Sync {
    /// Append one turn to a session transcript, preserving arrival order.
    async fn append(&self, session_id: &str, turn: &ChatTurn) -> Result<(), PersistenceError>;

    /// Full transcript of a session, oldest first.
    async fn history(&self, session_id: &str) -> Result<Vec<ChatTurn>, PersistenceError>;
}

/// ScyllaDB implementation of the chat log
#[derive(Clone)]
pub struct ScyllaChatLog {
    client: ScyllaClient,
}

impl ScyllaChatLog {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }

    async fn next_turn_index(&self, session_id: &str) -> Result<i64, PersistenceError> {
        let query = format!(
            "SELECT turn_index FROM {}.chat_turns WHERE session_id = ? ORDER BY turn_index DESC LIMIT 1",
            self.client.keyspace()
        );

        let result = self
            .client
            .session()
            .query_unpaged(query, (session_id,))
            .await?;

        if let Some(rows) = result.rows {
            if let Some(row) = rows.into_iter().next() {
                let (last,): (i64,) = row
                    .into_typed()
                    .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;
                return Ok(last + 1);
            }
        }

        Ok(0)
    }
}

#[async_trait]
impl ChatLogStore for ScyllaChatLog {
    async fn append(&self, session_id: &str, turn: &ChatTurn) -> Result<(), PersistenceError> {
        let turn_index = self.next_turn_index(session_id).await?;

        let query = format!(
            "INSERT INTO {}.chat_turns (session_id, turn_index, created_at, user_text, assistant_text)
             VALUES (?, ?, ?, ?, ?)",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    session_id,
                    turn_index,
                    turn.timestamp.timestamp_millis(),
                    &turn.user,
                    &turn.assistant,
                ),
            )
            .await?;

        tracing::debug!(
            session_id = %session_id,
            turn_index,
            "Chat turn appended to ScyllaDB"
        );

        Ok(())
    }

    async fn history(&self, session_id: &str) -> Result<Vec<ChatTurn>, PersistenceError> {
        let query = format!(
            "SELECT created_at, user_text, assistant_text
             FROM {}.chat_turns WHERE session_id = ? ORDER BY turn_index ASC",
            self.client.keyspace()
        );

        let result = self
            .client
            .session()
            .query_unpaged(query, (session_id,))
            .await?;

        let mut turns = Vec::new();
        if let Some(rows) = result.rows {
            for row in rows {
                let (created_at, user_text, assistant_text): (i64, String, String) = row
                    .into_typed()
                    .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;
                turns.push(ChatTurn {
                    timestamp: DateTime::from_timestamp_millis(created_at)
                        .unwrap_or_else(Utc::now),
                    user: user_text,
                    assistant: assistant_text,
                });
            }
        }

        Ok(turns)
    }
}

/// In-memory chat log for development and tests
#[derive(Default)]
pub struct InMemoryChatLog {
    sessions: DashMap<String, Vec<ChatTurn>>,
}

impl InMemoryChatLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatLogStore for InMemoryChatLog {
    async fn append(&self, session_id: &str, turn: &ChatTurn) -> Result<(), PersistenceError> {
        self.sessions
            .entry(session_id.to_string())
            .or_default()
            .push(turn.clone());
        Ok(())
    }

    async fn history(&self, session_id: &str) -> Result<Vec<ChatTurn>, PersistenceError> {
        Ok(self
            .sessions
            .get(session_id)
            .map(|turns| turns.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_preserves_arrival_order() {
        let log = InMemoryChatLog::new();
        let t1 = ChatTurn::new("quels sont vos prix", "Portfolio 29 900 CFA (~$49.83) ...");
        let t2 = ChatTurn::new("et les delais", "Livraison rapide + ajustements ...");

        log.append("visitor-1", &t1).await.unwrap();
        log.append("visitor-1", &t2).await.unwrap();

        let history = log.history("visitor-1").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], t1);
        assert_eq!(history[1], t2);
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let log = InMemoryChatLog::new();
        log.append("a", &ChatTurn::new("bonjour", "Bonjour !"))
            .await
            .unwrap();

        assert_eq!(log.history("a").await.unwrap().len(), 1);
        assert!(log.history("b").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_appends_stay_ordered() {
        let log = InMemoryChatLog::new();
        for i in 0..10 {
            log.append("s", &ChatTurn::new(format!("q{}", i), format!("a{}", i)))
                .await
                .unwrap();
        }
        let history = log.history("s").await.unwrap();
        let users: Vec<&str> = history.iter().map(|t| t.user.as_str()).collect();
        assert_eq!(users, ["q0", "q1", "q2", "q3", "q4", "q5", "q6", "q7", "q8", "q9"]);
    }
}
