//! ScyllaDB persistence layer for the lead-desk backend
//!
//! Provides persistent storage for:
//! - Lead submissions (upsert by identifier, never deleted)
//! - Chat transcripts (append-only, arrival-ordered)
//!
//! In-memory implementations back development and tests when persistence
//! is disabled.

pub mod chats;
pub mod client;
pub mod error;
pub mod leads;
pub mod schema;

pub use chats::{ChatLogStore, InMemoryChatLog, ScyllaChatLog};
pub use client::{ScyllaClient, ScyllaConfig};
pub use error::PersistenceError;
pub use leads::{InMemoryLeadStore, LeadStore, ScyllaLeadStore};

/// Initialize the persistence layer with ScyllaDB
pub async fn init(config: ScyllaConfig) -> Result<PersistenceLayer, PersistenceError> {
    let client = ScyllaClient::connect(config).await?;
    client.ensure_schema().await?;

    Ok(PersistenceLayer {
        leads: ScyllaLeadStore::new(client.clone()),
        chats: ScyllaChatLog::new(client),
    })
}

/// Combined persistence layer with all stores
pub struct PersistenceLayer {
    pub leads: ScyllaLeadStore,
    pub chats: ScyllaChatLog,
}
